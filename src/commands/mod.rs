//! CLI command definitions and dispatch.

pub mod items;
pub mod migrate;
pub mod share;
pub mod transfer;
pub mod whoami;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use drive_core::config::AppConfig;
use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_database::DatabasePool;
use drive_service::{DriveServices, RequestContext};

use crate::output::OutputFormat;

/// Drive: hierarchical file storage with owner-rooted sharing
#[derive(Debug, Parser)]
#[command(name = "drive", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// External identity to act as
    #[arg(long = "as", value_name = "IDENTITY", env = "DRIVE_AS")]
    pub identity: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Show the caller's internal user
    Whoami,
    /// List own roots, or the children of a folder
    Ls(items::LsArgs),
    /// List roots shared with the caller
    Shared,
    /// Create a folder
    Mkdir(items::MkdirArgs),
    /// Upload a local file
    Upload(transfer::UploadArgs),
    /// Download a file
    Download(transfer::DownloadArgs),
    /// Rename and/or move an item
    Mv(items::MvArgs),
    /// Delete an item and everything below it
    Rm(items::RmArgs),
    /// Share a root with another identity
    Share(share::ShareArgs),
    /// Search readable items by name
    Search(items::SearchArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let format = self.format;
        match &self.command {
            Commands::Migrate => migrate::execute(config).await,
            Commands::Whoami => whoami::execute(&self.session(config).await?, format).await,
            Commands::Ls(args) => items::ls(args, &self.session(config).await?, format).await,
            Commands::Shared => share::shared(&self.session(config).await?, format).await,
            Commands::Mkdir(args) => items::mkdir(args, &self.session(config).await?, format).await,
            Commands::Upload(args) => {
                transfer::upload(args, &self.session(config).await?, format).await
            }
            Commands::Download(args) => transfer::download(args, &self.session(config).await?).await,
            Commands::Mv(args) => items::mv(args, &self.session(config).await?, format).await,
            Commands::Rm(args) => items::rm(args, &self.session(config).await?).await,
            Commands::Share(args) => share::share(args, &self.session(config).await?, format).await,
            Commands::Search(args) => {
                items::search(args, &self.session(config).await?, format).await
            }
        }
    }

    async fn session(&self, config: &AppConfig) -> AppResult<Session> {
        Session::open(config, self.identity.as_deref()).await
    }
}

/// Wired services plus the caller every command acts as.
#[derive(Debug)]
pub struct Session {
    /// Drive services over PostgreSQL and the configured blob store.
    pub drive: DriveServices,
    /// The resolved caller.
    pub ctx: RequestContext,
}

impl Session {
    /// Connect to the backends and resolve the caller.
    async fn open(config: &AppConfig, identity: Option<&str>) -> AppResult<Self> {
        let identity = identity
            .filter(|i| !i.trim().is_empty())
            .ok_or_else(|| AppError::bad_request("A caller is required: pass --as <identity>"))?;

        let drive = connect(config).await?;
        let ctx = drive.identity.context_for(identity).await?;
        Ok(Self { drive, ctx })
    }
}

/// Helper: wire the services from configuration
pub async fn connect(config: &AppConfig) -> AppResult<DriveServices> {
    let pool = DatabasePool::connect(&config.database).await?;
    let blobs = drive_storage::build_blob_store(&config.storage).await?;
    Ok(DriveServices::new(Arc::new(pool.store()), blobs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use drive_entity::share::ShareRole;
    use items::LsArgs;

    #[test]
    fn test_parse_share_with_role() {
        let cli = Cli::try_parse_from([
            "drive",
            "--as",
            "alice",
            "share",
            "0191d3f0-0000-7000-8000-000000000001",
            "bob",
            "--role",
            "editor",
        ])
        .unwrap();
        assert_eq!(cli.identity.as_deref(), Some("alice"));
        match cli.command {
            Commands::Share(args) => {
                assert_eq!(args.target, "bob");
                assert_eq!(args.role, Some(ShareRole::Editor));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_role() {
        let result = Cli::try_parse_from([
            "drive",
            "share",
            "0191d3f0-0000-7000-8000-000000000001",
            "bob",
            "--role",
            "owner",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_search_limit_defaults_to_twenty() {
        let cli = Cli::try_parse_from(["drive", "-f", "json", "search", "report"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.query, "report");
                assert_eq!(args.limit, 20);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_ls_folder_is_optional() {
        let cli = Cli::try_parse_from(["drive", "ls"]).unwrap();
        assert!(matches!(cli.command, Commands::Ls(LsArgs { folder: None })));
    }

    #[tokio::test]
    async fn test_missing_caller_is_bad_request() {
        let raw = r#"{ "database": { "url": "postgres://localhost/drive" } }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        let err = Session::open(&config, Some("  ")).await.unwrap_err();
        assert_eq!(err.kind, drive_core::ErrorKind::BadRequest);
    }
}
