use crate::state::AppState;
use axum::Router;

pub(crate) mod dto;
pub mod handlers;
pub mod jwt;
#[cfg(test)]
pub mod memory_repo;
mod pages;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod service;
mod tokens;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
