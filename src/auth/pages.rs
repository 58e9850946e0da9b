use axum::response::{Html, IntoResponse, Response};

use crate::{error::AppError, mail::templates::escape_html};

const VERIFICATION_SUCCESS: &str = include_str!("../../templates/verification-success.html");
const ERROR_PAGE: &str = include_str!("../../templates/errors.html");
const RESET_FORM: &str = include_str!("../../templates/reset-password.html");

pub fn verification_success() -> Html<&'static str> {
    Html(VERIFICATION_SUCCESS)
}

pub fn reset_form(token: &str) -> Html<String> {
    Html(RESET_FORM.replace("{{token}}", &escape_html(token)))
}

/// Renders an `AppError` as an HTML page for endpoints opened from email links.
pub fn error_page(err: AppError) -> Response {
    let status = err.status();
    let message = match &err {
        AppError::Internal(e) => {
            tracing::error!(error = ?e, "internal error on html endpoint");
            "An unexpected error occurred".to_string()
        }
        other => other.to_string(),
    };
    let body = ERROR_PAGE.replace("{{message}}", &escape_html(&message));
    (status, Html(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn reset_form_embeds_token() {
        let Html(body) = reset_form("abc123");
        assert!(body.contains(r#"value="abc123""#));
        assert!(!body.contains("{{token}}"));
    }

    #[test]
    fn error_page_keeps_status() {
        let resp = error_page(AppError::unauthorized("Invalid code"));
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
