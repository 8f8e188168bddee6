//! Maps already-authenticated external identities to internal users.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_database::{DriveStore, UnitOfWork, UserStore, finish};
use drive_entity::user::AppUser;

use crate::context::RequestContext;

/// The caller as seen by Drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Me {
    /// Internal user ID.
    pub user_id: Uuid,
    /// External identity.
    pub external_identity_id: String,
}

/// Resolves external identities to internal users, creating them lazily.
#[derive(Debug, Clone)]
pub struct IdentityService {
    store: Arc<dyn DriveStore>,
}

impl IdentityService {
    /// Creates a new identity service.
    pub fn new(store: Arc<dyn DriveStore>) -> Self {
        Self { store }
    }

    /// Returns the user for `external_identity`, creating it on first sight.
    pub async fn resolve_user(&self, external_identity: &str) -> AppResult<AppUser> {
        if external_identity.trim().is_empty() {
            return Err(AppError::bad_request("External identity is required"));
        }

        let mut tx = self.store.begin().await?;
        let result = find_or_create(tx.as_mut(), external_identity).await;
        let (user, created) = finish(tx, result).await?;
        if created {
            info!(user_id = %user.id, external_identity, "User created");
        }
        Ok(user)
    }

    /// Builds the request context for `external_identity`.
    pub async fn context_for(&self, external_identity: &str) -> AppResult<RequestContext> {
        let user = self.resolve_user(external_identity).await?;
        Ok(RequestContext::new(user.id, user.external_identity_id))
    }

    /// Describes the caller.
    pub async fn me(&self, external_identity: &str) -> AppResult<Me> {
        let user = self.resolve_user(external_identity).await?;
        Ok(Me {
            user_id: user.id,
            external_identity_id: user.external_identity_id,
        })
    }
}

async fn find_or_create(tx: &mut dyn UnitOfWork, external_identity: &str) -> AppResult<(AppUser, bool)> {
    if let Some(user) = tx.find_user_by_external_id(external_identity).await? {
        return Ok((user, false));
    }
    let candidate = AppUser::new(external_identity);
    let stored = tx.upsert_user(&candidate).await?;
    let created = stored.id == candidate.id;
    Ok((stored, created))
}

#[cfg(test)]
mod tests {
    use super::*;
    use drive_core::ErrorKind;
    use drive_database::MemoryStore;

    #[tokio::test]
    async fn test_resolve_user_is_stable() {
        let identity = IdentityService::new(Arc::new(MemoryStore::new()));
        let first = identity.resolve_user("user_a").await.unwrap();
        let second = identity.resolve_user("user_a").await.unwrap();
        assert_eq!(first.id, second.id);

        let other = identity.resolve_user("user_b").await.unwrap();
        assert_ne!(first.id, other.id);
    }

    #[tokio::test]
    async fn test_blank_identity_is_bad_request() {
        let identity = IdentityService::new(Arc::new(MemoryStore::new()));
        let err = identity.resolve_user("  ").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn test_context_and_me_agree() {
        let identity = IdentityService::new(Arc::new(MemoryStore::new()));
        let ctx = identity.context_for("user_a").await.unwrap();
        let me = identity.me("user_a").await.unwrap();
        assert_eq!(ctx.user_id, me.user_id);
        assert_eq!(me.external_identity_id, "user_a");
    }
}
