//! Root sharing commands.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use drive_core::result::AppResult;
use drive_entity::share::{ItemShare, ShareRole};

use super::Session;
use crate::output::{self, OutputFormat};

/// Arguments for `share`
#[derive(Debug, Args)]
pub struct ShareArgs {
    /// Root item ID
    pub id: Uuid,
    /// External identity of the user to share with
    pub target: String,
    /// Role to grant: viewer or editor
    #[arg(short, long)]
    pub role: Option<ShareRole>,
}

/// Share display row
#[derive(Debug, Serialize, Tabled)]
struct ShareRow {
    /// Shared root
    item_id: String,
    /// Target user
    target_user_id: String,
    /// Granted role
    role: String,
    /// First shared at
    created_at: String,
}

impl From<&ItemShare> for ShareRow {
    fn from(share: &ItemShare) -> Self {
        Self {
            item_id: share.item_id.to_string(),
            target_user_id: share.target_user_id.to_string(),
            role: share.role.to_string(),
            created_at: share.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Grant a role on an owned root
pub async fn share(args: &ShareArgs, session: &Session, format: OutputFormat) -> AppResult<()> {
    let share = session
        .drive
        .shares
        .share_root(&session.ctx, args.id, &args.target, args.role)
        .await?;
    output::print_item(&ShareRow::from(&share), format);
    Ok(())
}

/// List roots shared with the caller
pub async fn shared(session: &Session, format: OutputFormat) -> AppResult<()> {
    let roots = session.drive.shares.list_shared_roots(&session.ctx).await?;
    output::print_items(&roots, format);
    Ok(())
}
