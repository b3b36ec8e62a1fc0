use std::path::PathBuf;

use clap::{ArgGroup, Args};
use serde_json::json;

use crate::cli::utils::{output_details, output_success};
use crate::cli::{CliContext, OutputFormat};
use crate::kpi::{parse_csv_file, Department, MergeMode};
use crate::services::KpiService;

#[derive(Args)]
#[command(group(ArgGroup::new("mode").required(true).args(["replace", "append"])))]
pub struct IngestArgs {
    #[arg(help = "CSV file with a date column (DD-MM-YY) and one column per metric")]
    pub file: PathBuf,

    #[arg(long, help = "Company id")]
    pub company: String,

    #[arg(long, help = "Department slug, e.g. finance or customer-growth")]
    pub department: String,

    #[arg(long, help = "Replace the stored series and selected KPIs")]
    pub replace: bool,

    #[arg(long, help = "Append to the stored series")]
    pub append: bool,
}

impl IngestArgs {
    pub fn mode(&self) -> MergeMode {
        if self.append {
            MergeMode::Append
        } else {
            MergeMode::Replace
        }
    }
}

pub async fn handle(args: IngestArgs, context: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    let department: Department = args.department.parse()?;
    let mode = args.mode();

    let entries = parse_csv_file(&args.file).await?;
    let summary = KpiService::new(context.kpi_store().await?)
        .ingest(&args.company, department, entries, mode)
        .await?;

    output_success(
        output_format,
        &format!("Loaded {} rows from {}", summary.rows, args.file.display()),
        Some(json!({ "summary": summary })),
    )?;
    output_details(
        output_format,
        &[
            ("company", summary.company_id.clone()),
            ("department", department.display_name().to_string()),
            ("mode", summary.mode.to_string()),
            ("stored records", summary.total_records.to_string()),
            ("selected KPIs", summary.selected_kpis.join(", ")),
        ],
    );
    Ok(())
}
