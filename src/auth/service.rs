//! Account lifecycle: registration, email verification, login and password reset.
//!
//! An account starts unverified with a single-use verification code. A pending
//! reset is tracked by a token plus expiry on the same record, orthogonal to
//! the verified flag. Verification does not gate login.

use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo::UserRepo,
    repo_types::{NewUser, PublicUser, User},
    tokens,
};
use crate::{
    error::{AppError, AppResult, StoreError},
    mail::{templates, MailQueue},
};

const USERNAME_TAKEN: &str = "Username is already taken.";
const EMAIL_TAKEN: &str =
    "Email is already registered. Did you forget the password. Try resetting it.";
const INVALID_VERIFICATION_CODE: &str = "Unauthorized access. Invalid verification code";
const USERNAME_NOT_FOUND: &str = "Username not found";
const INCORRECT_PASSWORD: &str = "Incorrect password";
const EMAIL_NOT_FOUND: &str = "Unable to find a user with that email";
const INVALID_RESET_TOKEN: &str = "Password reset token is invalid or has expired";

#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Base URL for links in emails, without trailing slash.
    pub public_domain: String,
    pub reset_token_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: PublicUser,
}

pub struct AuthService {
    users: Arc<dyn UserRepo>,
    keys: JwtKeys,
    mail: MailQueue,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepo>,
        keys: JwtKeys,
        mail: MailQueue,
        settings: AuthSettings,
    ) -> Self {
        Self {
            users,
            keys,
            mail,
            settings,
        }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub async fn register(&self, reg: Registration) -> AppResult<PublicUser> {
        if self.users.find_by_username(&reg.username).await?.is_some() {
            warn!(username = %reg.username, "username already taken");
            return Err(AppError::conflict(USERNAME_TAKEN));
        }
        if self.users.find_by_email(&reg.email).await?.is_some() {
            warn!(email = %reg.email, "email already registered");
            return Err(AppError::conflict(EMAIL_TAKEN));
        }

        let password_hash = hash_password(&reg.password)?;
        let new_user = NewUser {
            username: reg.username,
            email: reg.email,
            name: reg.name,
            password_hash,
            verification_code: tokens::verification_code(),
        };

        // The store's unique constraints are authoritative; the lookups above
        // only pick the friendlier message.
        let user = self.users.create(new_user).await.map_err(|e| match e {
            StoreError::Duplicate("username") => AppError::conflict(USERNAME_TAKEN),
            StoreError::Duplicate("email") => AppError::conflict(EMAIL_TAKEN),
            other => other.into(),
        })?;

        if let Some(code) = &user.verification_code {
            let link = format!("{}/users/verify-now/{}", self.settings.public_domain, code);
            self.mail
                .enqueue(templates::verification(&user.email, &user.username, &link));
        }

        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user.to_public())
    }

    pub async fn verify_by_code(&self, code: &str) -> AppResult<PublicUser> {
        let user = self
            .users
            .consume_verification_code(code)
            .await?
            .ok_or_else(|| AppError::unauthorized(INVALID_VERIFICATION_CODE))?;

        info!(user_id = %user.id, "account verified");
        Ok(user.to_public())
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<Session> {
        let user = match self.users.find_by_username(username).await? {
            Some(u) => u,
            None => {
                warn!(%username, "login unknown username");
                return Err(AppError::not_found(USERNAME_NOT_FOUND));
            }
        };

        if !verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AppError::not_found(INCORRECT_PASSWORD));
        }

        let token = self.keys.sign(&user)?;
        info!(user_id = %user.id, verified = user.verified, "user logged in");
        Ok(Session {
            token,
            user: user.to_public(),
        })
    }

    pub async fn profile(&self, user_id: Uuid) -> AppResult<PublicUser> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|u| u.to_public())
            .ok_or_else(|| AppError::unauthorized("User not found"))
    }

    pub async fn initiate_reset(&self, email: &str) -> AppResult<()> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found(EMAIL_NOT_FOUND))?;

        let reset = tokens::reset_token(OffsetDateTime::now_utc(), self.settings.reset_token_ttl);
        let user = self
            .users
            .set_reset_token(user.id, &reset.token, reset.expires_at)
            .await?
            .ok_or_else(|| AppError::not_found(EMAIL_NOT_FOUND))?;

        let link = format!(
            "{}/users/reset-password-now/{}",
            self.settings.public_domain, reset.token
        );
        self.mail
            .enqueue(templates::password_reset(&user.email, &user.username, &link));

        info!(user_id = %user.id, "password reset requested");
        Ok(())
    }

    /// Looks up the account owning a live reset token.
    pub async fn check_reset_token(&self, token: &str) -> AppResult<User> {
        self.users
            .find_by_reset_token(token, OffsetDateTime::now_utc())
            .await?
            .ok_or_else(|| AppError::unauthorized(INVALID_RESET_TOKEN))
    }

    pub async fn complete_reset(&self, token: &str, new_password: &str) -> AppResult<()> {
        self.check_reset_token(token).await?;

        // The token is re-checked by the conditional write; a concurrent reset
        // that got there first leaves nothing to consume.
        let password_hash = hash_password(new_password)?;
        let user = self
            .users
            .consume_reset_token(token, &password_hash, OffsetDateTime::now_utc())
            .await?
            .ok_or_else(|| AppError::unauthorized(INVALID_RESET_TOKEN))?;

        self.mail
            .enqueue(templates::password_changed(&user.email, &user.username));

        info!(user_id = %user.id, "password reset completed");
        Ok(())
    }
}
