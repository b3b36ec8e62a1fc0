use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_details, output_success};
use crate::cli::{CliContext, OutputFormat};
use crate::company::{Company, CompanyProfile};
use crate::services::CompanyService;

#[derive(Subcommand)]
pub enum CompanyCommands {
    #[command(about = "Create or replace a company profile from a JSON file")]
    Put {
        #[arg(help = "Company id")]
        company_id: String,

        #[arg(help = "JSON file with the camelCase profile fields")]
        file: PathBuf,
    },

    #[command(about = "Show a company profile and its sign-in state")]
    Show {
        #[arg(help = "Company id")]
        company_id: String,
    },
}

pub async fn handle(cmd: CompanyCommands, context: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    let service = CompanyService::new(context.company_store().await?);
    match cmd {
        CompanyCommands::Put { company_id, file } => {
            let profile = read_profile(&file).await?;
            let company = service.save_profile(&company_id, &profile).await?;
            output_company(output_format, "Company profile saved", &company)
        }
        CompanyCommands::Show { company_id } => {
            let company = service.profile(&company_id).await?;
            output_company(output_format, &company.profile.name, &company)
        }
    }
}

async fn read_profile(file: &Path) -> anyhow::Result<CompanyProfile> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a valid company profile", file.display()))
}

fn output_company(output_format: OutputFormat, message: &str, company: &Company) -> anyhow::Result<()> {
    output_success(output_format, message, Some(json!({ "company": company })))?;
    output_details(
        output_format,
        &[
            ("company", company.company_id.clone()),
            ("industry", company.profile.industry.clone()),
            ("stage", company.profile.stage.clone()),
            ("active", company.is_active.to_string()),
            (
                "last login",
                company.last_login.map(|t| t.to_rfc3339()).unwrap_or_else(|| "never".into()),
            ),
        ],
    );
    Ok(())
}
