//! File upload and download commands.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use clap::Args;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use drive_core::error::{AppError, ErrorKind};
use drive_core::result::AppResult;
use drive_service::FileUpload;

use super::Session;
use crate::output::{self, OutputFormat};

/// Arguments for `upload`
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Local file to upload
    pub path: PathBuf,
    /// Target folder ID (omit to upload as a new root)
    #[arg(short, long)]
    pub parent: Option<Uuid>,
    /// Name to store the file under (defaults to the local file name)
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Arguments for `download`
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// File ID
    pub id: Uuid,
    /// Output path (defaults to the stored file name)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Upload a local file into a folder
pub async fn upload(args: &UploadArgs, session: &Session, format: OutputFormat) -> AppResult<()> {
    let content = tokio::fs::read(&args.path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::BadRequest,
            format!("Cannot read {}", args.path.display()),
            e,
        )
    })?;

    let filename = args
        .name
        .clone()
        .or_else(|| local_file_name(&args.path))
        .unwrap_or_default();
    let content_type = mime_guess::from_path(&args.path)
        .first_or_octet_stream()
        .to_string();

    let upload = FileUpload::new(filename, Some(content_type), Bytes::from(content));
    let file = session
        .drive
        .items
        .upload_file(&session.ctx, args.parent, upload)
        .await?;
    output::print_items(std::slice::from_ref(&file), format);
    Ok(())
}

/// Stream a file to disk
pub async fn download(args: &DownloadArgs, session: &Session) -> AppResult<()> {
    let mut file = session.drive.items.download_file(&session.ctx, args.id).await?;
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| default_output_path(&file.filename));

    let mut sink = tokio::fs::File::create(&out).await?;
    let mut written: u64 = 0;
    while let Some(chunk) = file.stream.next().await {
        let chunk = chunk?;
        sink.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    sink.flush().await?;

    output::print_success(&format!(
        "Saved {} ({}, {written} bytes) to {}",
        file.filename,
        file.mime_type,
        out.display()
    ));
    Ok(())
}

fn local_file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Where a download lands without `--out`: the last component of the stored
/// name, inside the working directory.
fn default_output_path(filename: &str) -> PathBuf {
    Path::new(filename)
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(FALLBACK_FILENAME))
}

const FALLBACK_FILENAME: &str = "file";
