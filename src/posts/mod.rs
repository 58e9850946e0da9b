mod dto;
pub mod handlers;
#[cfg(test)]
pub mod memory_repo;
pub mod repo;
pub mod repo_types;
pub mod services;
mod slug;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
