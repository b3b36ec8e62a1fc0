use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format.
///
/// In JSON mode the fields of `data` (when it is an object) are merged into
/// the top-level response.
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(fields)), Some(target)) = (data, response.as_object_mut()) {
                target.extend(fields);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output key/value details in text mode; no-op for JSON (already included
/// by [`output_success`]).
pub fn output_details(output_format: OutputFormat, details: &[(&str, String)]) {
    if let OutputFormat::Text = output_format {
        let width = details.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in details {
            println!("  {:width$}  {}", key, value, width = width);
        }
    }
}
