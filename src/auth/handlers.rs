use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;
use validator::Validate;

use crate::{
    auth::{
        dto::{
            normalize_email, AuthResponse, AuthenticateRequest, MessageResponse, ProfileResponse,
            RegisterRequest, ResetPasswordNowRequest, ResetPasswordRequest,
        },
        jwt::AuthUser,
        pages,
        service::Registration,
    },
    error::AppResult,
    extract::AppJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/verify-now/:code", get(verify_now))
        .route("/api/authenticate", post(authenticate).get(profile))
        .route("/api/reset-password", put(reset_password))
        .route("/reset-password-now/:token", get(reset_password_form))
        .route("/api/reset-password-now", post(reset_password_now))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<RegisterRequest>,
) -> AppResult<Json<MessageResponse>> {
    payload.email = normalize_email(&payload.email);
    payload.username = payload.username.trim().to_string();
    payload.name = payload.name.trim().to_string();
    payload.validate()?;

    state
        .auth
        .register(Registration {
            username: payload.username,
            email: payload.email,
            name: payload.name,
            password: payload.password,
        })
        .await?;

    Ok(Json(MessageResponse::ok(
        "Hurray, your account is created! Please verify your email address",
    )))
}

#[instrument(skip(state, code))]
pub async fn verify_now(State(state): State<AppState>, Path(code): Path<String>) -> Response {
    match state.auth.verify_by_code(&code).await {
        Ok(_) => pages::verification_success().into_response(),
        Err(e) => pages::error_page(e),
    }
}

#[instrument(skip(state, payload))]
pub async fn authenticate(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<AuthenticateRequest>,
) -> AppResult<Json<AuthResponse>> {
    payload.username = payload.username.trim().to_string();
    payload.validate()?;

    let session = state
        .auth
        .authenticate(&payload.username, &payload.password)
        .await?;

    Ok(Json(AuthResponse {
        success: true,
        token: format!("Bearer {}", session.token),
        user: session.user,
        message: "Hurray, you are now logged in".into(),
    }))
}

#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<ProfileResponse>> {
    let user = state.auth.profile(user_id).await?;
    Ok(Json(ProfileResponse { user }))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    payload.email = normalize_email(&payload.email);
    payload.validate()?;

    state.auth.initiate_reset(&payload.email).await?;

    Ok(Json(MessageResponse::ok(
        "Password reset link has been sent to your email",
    )))
}

#[instrument(skip(state, token))]
pub async fn reset_password_form(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Response {
    match state.auth.check_reset_token(&token).await {
        Ok(_) => pages::reset_form(&token).into_response(),
        Err(e) => pages::error_page(e),
    }
}

#[instrument(skip(state, payload))]
pub async fn reset_password_now(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ResetPasswordNowRequest>,
) -> AppResult<Json<MessageResponse>> {
    payload.validate()?;

    state
        .auth
        .complete_reset(&payload.token, &payload.password)
        .await?;

    Ok(Json(MessageResponse::ok(
        "Your password has been reset successfully",
    )))
}
