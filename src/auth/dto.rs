use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{password::MIN_PASSWORD_LEN, repo_types::PublicUser};

/// Request body for user registration.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(email(message = "Please provide a valid Email"))]
    pub email: String,
    #[validate(length(min = MIN_PASSWORD_LEN, message = "Password is required of minimum length of 6"))]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct AuthenticateRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Please provide a valid Email"))]
    pub email: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ResetPasswordNowRequest {
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub token: String,
    #[validate(length(min = MIN_PASSWORD_LEN, message = "Password is required of minimum length of 6"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    /// Ready-to-use header value: `Bearer <jwt>`.
    pub token: String,
    pub user: PublicUser,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: PublicUser,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_validation_reports_each_field() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email":"nope","password":"123"}"#).unwrap();
        let errs = req.validate().unwrap_err();
        let fields = errs.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn valid_register_request_passes() {
        let req = RegisterRequest {
            name: "Alice".into(),
            username: "alice".into(),
            email: "a@x.com".into(),
            password: "secret1".into(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
    }
}
