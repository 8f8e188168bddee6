//! Item browsing and tree mutation commands.

use clap::Args;
use uuid::Uuid;

use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_service::ItemPatch;

use super::Session;
use crate::output::{self, OutputFormat};

/// Arguments for `ls`
#[derive(Debug, Args)]
pub struct LsArgs {
    /// Folder to list (omit for own roots)
    pub folder: Option<Uuid>,
}

/// Arguments for `mkdir`
#[derive(Debug, Args)]
pub struct MkdirArgs {
    /// Folder name
    pub name: String,
    /// Parent folder ID (omit for a new root)
    #[arg(short, long)]
    pub parent: Option<Uuid>,
}

/// Arguments for `mv`
#[derive(Debug, Args)]
pub struct MvArgs {
    /// Item ID
    pub id: Uuid,
    /// New name
    #[arg(short, long)]
    pub name: Option<String>,
    /// New parent folder ID
    #[arg(short, long)]
    pub parent: Option<Uuid>,
}

/// Arguments for `rm`
#[derive(Debug, Args)]
pub struct RmArgs {
    /// Item ID
    pub id: Uuid,
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for `search`
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Case-insensitive name fragment
    pub query: String,
    /// Maximum number of results (1 to 50)
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}

/// List own roots or a folder's children
pub async fn ls(args: &LsArgs, session: &Session, format: OutputFormat) -> AppResult<()> {
    let items = match args.folder {
        Some(folder_id) => {
            session
                .drive
                .items
                .list_children(&session.ctx, folder_id)
                .await?
        }
        None => session.drive.items.list_root(&session.ctx).await?,
    };
    output::print_items(&items, format);
    Ok(())
}

/// Create a folder
pub async fn mkdir(args: &MkdirArgs, session: &Session, format: OutputFormat) -> AppResult<()> {
    let folder = session
        .drive
        .items
        .create_folder(&session.ctx, args.parent, &args.name)
        .await?;
    output::print_items(std::slice::from_ref(&folder), format);
    Ok(())
}

/// Rename and/or move an item
pub async fn mv(args: &MvArgs, session: &Session, format: OutputFormat) -> AppResult<()> {
    if args.name.is_none() && args.parent.is_none() {
        return Err(AppError::bad_request("Nothing to change: pass --name and/or --parent"));
    }

    let patch = ItemPatch {
        name: args.name.clone(),
        parent_id: args.parent,
    };
    let item = session
        .drive
        .items
        .patch_item(&session.ctx, args.id, patch)
        .await?;
    output::print_items(std::slice::from_ref(&item), format);
    Ok(())
}

/// Delete an item and its subtree
pub async fn rm(args: &RmArgs, session: &Session) -> AppResult<()> {
    if !args.yes {
        let confirm = dialoguer::Confirm::new()
            .with_prompt(format!(
                "Delete item {} and everything below it? This cannot be undone.",
                args.id
            ))
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

        if !confirm {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let report = session.drive.items.delete_item(&session.ctx, args.id).await?;
    if report.items_deleted == 0 {
        output::print_success("Nothing to delete.");
        return Ok(());
    }

    output::print_success(&format!(
        "Deleted {} item(s) and {} blob(s).",
        report.items_deleted, report.blobs_deleted
    ));
    if report.blob_failures > 0 {
        output::print_warning(&format!(
            "{} blob(s) could not be removed and were left behind.",
            report.blob_failures
        ));
    }
    Ok(())
}

/// Search readable items by name
pub async fn search(args: &SearchArgs, session: &Session, format: OutputFormat) -> AppResult<()> {
    let items = session
        .drive
        .items
        .search_by_name(&session.ctx, &args.query, args.limit)
        .await?;
    output::print_items(&items, format);
    Ok(())
}
