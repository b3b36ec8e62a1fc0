pub mod commands;
pub mod utils;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::auth::{RevocationStore, TokenAuthority};
use crate::company::CompanyStore;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgCompanyStore, PgKpiStore, PgRevocationStore};
use crate::kpi::KpiStore;

#[derive(Parser)]
#[command(name = "kpi-admin")]
#[command(about = "Administrative CLI for the KPI Dashboard API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Manage company profiles")]
    Company {
        #[command(subcommand)]
        cmd: commands::company::CompanyCommands,
    },

    #[command(about = "Sign companies in with a bearer token, or revoke one")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },

    #[command(about = "Maintain the token revocation list")]
    Revocations {
        #[command(subcommand)]
        cmd: commands::revocations::RevocationCommands,
    },

    #[command(about = "Load a KPI CSV file into a company's department document")]
    Ingest(commands::ingest::IngestArgs),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Everything a command may need, built lazily from [`AppConfig`].
pub struct CliContext {
    pub config: AppConfig,
}

impl CliContext {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn tokens(&self) -> anyhow::Result<TokenAuthority> {
        TokenAuthority::new(self.config.security.jwt_secret.clone(), self.config.security.jwt_expiry_hours)
            .context("JWT_SECRET must be set and SECURITY_JWT_EXPIRY_HOURS at most 87600")
    }

    async fn database(&self) -> anyhow::Result<DatabaseManager> {
        let db = DatabaseManager::connect(&self.config.database)
            .await
            .context("DATABASE_URL must point at the KPI database")?;
        db.bootstrap_schema().await?;
        Ok(db)
    }

    pub async fn company_store(&self) -> anyhow::Result<Arc<dyn CompanyStore>> {
        Ok(Arc::new(PgCompanyStore::new(self.database().await?.pool().clone())))
    }

    pub async fn kpi_store(&self) -> anyhow::Result<Arc<dyn KpiStore>> {
        Ok(Arc::new(PgKpiStore::new(self.database().await?.pool().clone())))
    }

    pub async fn revocation_store(&self) -> anyhow::Result<Arc<dyn RevocationStore>> {
        Ok(Arc::new(PgRevocationStore::new(self.database().await?.pool().clone())))
    }
}

pub async fn run(cli: Cli, context: CliContext) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Company { cmd } => commands::company::handle(cmd, &context, output_format).await,
        Commands::Token { cmd } => commands::token::handle(cmd, &context, output_format).await,
        Commands::Revocations { cmd } => commands::revocations::handle(cmd, &context, output_format).await,
        Commands::Ingest(args) => commands::ingest::handle(args, &context, output_format).await,
    }
}
