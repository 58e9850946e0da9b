use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo::UserRepo;
use super::repo_types::{NewUser, User};
use crate::error::{StoreError, StoreResult};

/// Process-local user store. Uniqueness checks and inserts happen under one
/// write lock, mirroring the unique indexes of the PostgreSQL schema.
#[derive(Default)]
pub struct MemoryUserRepo {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    async fn find_where(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
        self.users.read().await.values().find(|u| pred(u)).cloned()
    }
}

fn duplicate_field(
    users: &HashMap<Uuid, User>,
    id: Uuid,
    username: &str,
    email: &str,
) -> Option<&'static str> {
    let others = || users.values().filter(move |u| u.id != id);
    if others().any(|u| u.username == username) {
        Some("username")
    } else if others().any(|u| u.email == email) {
        Some("email")
    } else {
        None
    }
}

fn live_reset_token(user: &User, token: &str, now: OffsetDateTime) -> bool {
    user.reset_password_token.as_deref() == Some(token) && user.reset_pending(now)
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self.find_where(|u| u.username == username).await)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.find_where(|u| u.email == email).await)
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> StoreResult<Option<User>> {
        Ok(self
            .find_where(|u| live_reset_token(u, token, now))
            .await)
    }

    async fn create(&self, new_user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        let id = Uuid::new_v4();
        if let Some(field) = duplicate_field(&users, id, &new_user.username, &new_user.email) {
            return Err(StoreError::Duplicate(field));
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id,
            username: new_user.username,
            email: new_user.email,
            name: new_user.name,
            password_hash: new_user.password_hash,
            verified: false,
            verification_code: Some(new_user.verification_code),
            reset_password_token: None,
            reset_password_expires_in: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(id, user.clone());
        Ok(user)
    }

    async fn consume_verification_code(&self, code: &str) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        let Some(user) = users
            .values_mut()
            .find(|u| u.verification_code.as_deref() == Some(code))
        else {
            return Ok(None);
        };
        user.verified = true;
        user.verification_code = None;
        user.updated_at = OffsetDateTime::now_utc();
        Ok(Some(user.clone()))
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };
        user.reset_password_token = Some(token.to_string());
        user.reset_password_expires_in = Some(expires_at);
        user.updated_at = OffsetDateTime::now_utc();
        Ok(Some(user.clone()))
    }

    async fn consume_reset_token(
        &self,
        token: &str,
        password_hash: &str,
        now: OffsetDateTime,
    ) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        let Some(user) = users.values_mut().find(|u| live_reset_token(u, token, now)) else {
            return Ok(None);
        };
        user.password_hash = password_hash.to_string();
        user.reset_password_token = None;
        user.reset_password_expires_in = None;
        user.updated_at = now;
        Ok(Some(user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: email.into(),
            name: "Test".into(),
            password_hash: "hash".into(),
            verification_code: format!("code-{username}"),
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_username_and_email() {
        let repo = MemoryUserRepo::new();
        repo.create(new_user("alice", "a@x.com")).await.unwrap();

        let err = repo.create(new_user("alice", "other@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("username")));

        let err = repo.create(new_user("bob", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("email")));
    }

    #[tokio::test]
    async fn reset_token_lookup_filters_expired() {
        let repo = MemoryUserRepo::new();
        let user = repo.create(new_user("carol", "c@x.com")).await.unwrap();
        let now = OffsetDateTime::now_utc();
        repo.set_reset_token(user.id, "tok", now - Duration::minutes(1))
            .await
            .unwrap();

        assert!(repo.find_by_reset_token("tok", now).await.unwrap().is_none());
        assert!(repo.consume_reset_token("tok", "new", now).await.unwrap().is_none());

        repo.set_reset_token(user.id, "tok", now + Duration::minutes(5))
            .await
            .unwrap();
        let found = repo.find_by_reset_token("tok", now).await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn reset_token_is_consumed_once() {
        let repo = MemoryUserRepo::new();
        let user = repo.create(new_user("erin", "e@x.com")).await.unwrap();
        let now = OffsetDateTime::now_utc();
        repo.set_reset_token(user.id, "tok", now + Duration::minutes(5))
            .await
            .unwrap();

        let changed = repo.consume_reset_token("tok", "new-hash", now).await.unwrap().unwrap();
        assert_eq!(changed.password_hash, "new-hash");
        assert!(changed.reset_password_token.is_none());
        assert!(!changed.reset_pending(now));
        assert!(repo.consume_reset_token("tok", "other", now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn transitions_leave_other_columns_alone() {
        let repo = MemoryUserRepo::new();
        let user = repo.create(new_user("frank", "f@x.com")).await.unwrap();
        let now = OffsetDateTime::now_utc();
        repo.set_reset_token(user.id, "tok", now + Duration::minutes(5))
            .await
            .unwrap();

        let verified = repo.consume_verification_code("code-frank").await.unwrap().unwrap();
        assert!(verified.verified);
        assert!(verified.reset_pending(now));

        let reset = repo.consume_reset_token("tok", "new", now).await.unwrap().unwrap();
        assert!(reset.verified);
        assert!(reset.verification_code.is_none());
        assert!(repo.consume_verification_code("code-frank").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_registrations_admit_exactly_one() {
        let repo = std::sync::Arc::new(MemoryUserRepo::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.create(new_user("dave", &format!("d{i}@x.com"))).await
                })
            })
            .collect();

        let mut ok = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
    }
}
