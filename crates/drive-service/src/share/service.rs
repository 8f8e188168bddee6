//! Share management: granting roles on roots and listing shared roots.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_database::{DriveStore, ItemStore, ShareStore, UnitOfWork, UserStore, finish};
use drive_entity::item::{Item, ItemSummary};
use drive_entity::share::{ItemShare, ShareRole};
use drive_entity::user::AppUser;

use crate::context::RequestContext;

/// Grants roles on roots and lists the roots shared with a user.
#[derive(Debug, Clone)]
pub struct ShareService {
    store: Arc<dyn DriveStore>,
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(store: Arc<dyn DriveStore>) -> Self {
        Self { store }
    }

    /// Shares a root the caller owns with the user behind `target_identity`.
    ///
    /// The target user is created if unknown. Sharing the same root with the
    /// same user again overwrites the role.
    pub async fn share_root(
        &self,
        ctx: &RequestContext,
        item_id: Uuid,
        target_identity: &str,
        role: Option<ShareRole>,
    ) -> AppResult<ItemShare> {
        if target_identity.trim().is_empty() {
            return Err(AppError::bad_request("Share target is required"));
        }
        let role = role.unwrap_or_default();

        let mut tx = self.store.begin().await?;
        let result = self
            .grant(tx.as_mut(), ctx.user_id, item_id, target_identity, role)
            .await;
        let share = finish(tx, result).await?;

        info!(
            %item_id,
            owner_id = %ctx.user_id,
            target_user_id = %share.target_user_id,
            role = %share.role,
            "Root shared"
        );
        Ok(share)
    }

    async fn grant(
        &self,
        tx: &mut dyn UnitOfWork,
        owner_id: Uuid,
        item_id: Uuid,
        target_identity: &str,
        role: ShareRole,
    ) -> AppResult<ItemShare> {
        let item = tx
            .find_item(item_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Item {item_id} not found")))?;
        if item.owner_id != owner_id {
            return Err(AppError::forbidden("Only the owner can share an item"));
        }
        if !item.is_root() {
            return Err(AppError::bad_request("Only root items can be shared"));
        }

        let target = match tx.find_user_by_external_id(target_identity).await? {
            Some(user) => user,
            None => tx.upsert_user(&AppUser::new(target_identity)).await?,
        };

        tx.upsert_share(&ItemShare::new(item_id, target.id, role))
            .await
    }

    /// Lists the roots shared with the caller, in listing order.
    ///
    /// Shares whose item has disappeared or is no longer a root are skipped.
    pub async fn list_shared_roots(&self, ctx: &RequestContext) -> AppResult<Vec<ItemSummary>> {
        let mut tx = self.store.begin().await?;
        let result = shared_roots(tx.as_mut(), ctx.user_id).await;
        let mut roots = finish(tx, result).await?;
        roots.sort_by(Item::listing_cmp);
        Ok(roots.into_iter().map(ItemSummary::from).collect())
    }
}

async fn shared_roots(tx: &mut dyn UnitOfWork, user_id: Uuid) -> AppResult<Vec<Item>> {
    let mut roots = Vec::new();
    for share in tx.list_shares_for_user(user_id).await? {
        match tx.find_item(share.item_id).await? {
            Some(item) if item.is_root() => roots.push(item),
            _ => {}
        }
    }
    Ok(roots)
}
