use clap::Subcommand;
use serde_json::json;

use crate::auth::RevokedToken;
use crate::cli::utils::{output_details, output_success};
use crate::cli::{CliContext, OutputFormat};
use crate::services::CompanyService;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign a company in and issue a bearer token scoped to it")]
    Issue {
        #[arg(help = "Company id the token is valid for")]
        company_id: String,
    },

    #[command(about = "Revoke a token until it expires")]
    Revoke {
        #[arg(help = "The bearer token to revoke")]
        token: String,
    },
}

pub async fn handle(cmd: TokenCommands, context: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Issue { company_id } => {
            let tokens = context.tokens()?;
            let issued = CompanyService::new(context.company_store().await?)
                .sign_in(&tokens, &company_id)
                .await?;

            output_success(output_format, "Token issued", Some(json!({ "token": issued })))?;
            output_details(
                output_format,
                &[
                    ("company", issued.company_id.clone()),
                    ("token id", issued.token_id.to_string()),
                    ("expires", issued.expires_at.to_rfc3339()),
                    ("token", issued.token.clone()),
                ],
            );
            Ok(())
        }
        TokenCommands::Revoke { token } => {
            let claims = context.tokens()?.verify(&token)?;
            let revoked = RevokedToken {
                token_id: claims.jti,
                company_id: claims.sub.clone(),
                expires_at: claims.expires_at(),
            };
            context.revocation_store().await?.revoke(&revoked).await?;

            output_success(output_format, "Token revoked", Some(json!({ "revoked": revoked })))?;
            output_details(
                output_format,
                &[
                    ("company", revoked.company_id.clone()),
                    ("token id", revoked.token_id.to_string()),
                    ("remembered until", revoked.expires_at.to_rfc3339()),
                ],
            );
            Ok(())
        }
    }
}
