use crate::OutputFormat;
use anyhow::{Context, Result};
use cpia_core::report::{build_sections, format_results, parse_items, read_payload};
use serde_json::json;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Format a saved analysis payload without contacting the service
pub fn execute(file: Option<&Path>, format: OutputFormat) -> Result<()> {
    let payload = match file {
        Some(path) if path != Path::new("-") => {
            tracing::info!("Formatting results from: {}", path.display());
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            read_payload(BufReader::new(file))?
        }
        _ => {
            tracing::info!("Formatting results from stdin");
            read_payload(io::stdin().lock())?
        }
    };

    match format {
        OutputFormat::Json => {
            let document = match payload.as_ref().map(parse_items) {
                Some(Ok(items)) => json!({ "sections": build_sections(&items) }),
                Some(Err(e)) => json!({ "error": e.to_string() }),
                None => json!({ "sections": [] }),
            };
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        OutputFormat::Pretty | OutputFormat::Table => {
            print!("{}", format_results(payload.as_ref()));
            if payload.is_none() {
                println!();
            }
        }
    }

    Ok(())
}
