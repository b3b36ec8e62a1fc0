use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::{CliContext, OutputFormat};

#[derive(Subcommand)]
pub enum RevocationCommands {
    #[command(about = "Delete revocations whose token has expired")]
    Purge,
}

pub async fn handle(cmd: RevocationCommands, context: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        RevocationCommands::Purge => {
            let purged = context.revocation_store().await?.purge_expired(Utc::now()).await?;
            output_success(
                output_format,
                &format!("Purged {} expired revocations", purged),
                Some(json!({ "purged": purged })),
            )
        }
    }
}
