//! Caller identity command.

use drive_core::result::AppResult;

use super::Session;
use crate::output::{self, OutputFormat};

/// Print the caller's internal user
pub async fn execute(session: &Session, format: OutputFormat) -> AppResult<()> {
    let me = session.drive.identity.me(&session.ctx.external_identity_id).await?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&me)?);
        }
        OutputFormat::Table => {
            output::print_kv("User ID", &me.user_id.to_string());
            output::print_kv("External identity", &me.external_identity_id);
        }
    }
    Ok(())
}
