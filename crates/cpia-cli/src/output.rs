//! Shared rendering for command output.

use crate::OutputFormat;
use anyhow::Result;
use console::style;
use cpia_core::models::{AnalysisState, AnalysisStatus, Diagnostics};
use cpia_core::report::format_results;
use serde_json::{Value, json};

/// Render a diagnostic value without JSON quoting for plain strings
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

/// Format an elapsed duration as `1h 02m 03s`, `2m 05s` or `4.2s`
pub fn format_elapsed(elapsed: chrono::Duration) -> String {
    let millis = elapsed.num_milliseconds().max(0);
    let total_secs = millis / 1000;

    if total_secs >= 3600 {
        format!(
            "{}h {:02}m {:02}s",
            total_secs / 3600,
            (total_secs % 3600) / 60,
            total_secs % 60
        )
    } else if total_secs >= 60 {
        format!("{}m {:02}s", total_secs / 60, total_secs % 60)
    } else {
        format!("{:.1}s", millis as f64 / 1000.0)
    }
}

pub fn print_diagnostics(title: &str, entries: &Diagnostics) {
    println!("\n{}", style(format!("{}:", title)).bold());
    if entries.is_empty() {
        println!("  {}", style("(none reported)").dim());
        return;
    }

    let width = entries.keys().map(|k| k.len()).max().unwrap_or(0);
    for (name, value) in entries {
        println!("  {:<width$}  {}", name, display_value(value), width = width);
    }
}

fn status_label(status: AnalysisStatus) -> String {
    match status {
        AnalysisStatus::Completed => style("✓ completed").green().to_string(),
        AnalysisStatus::Failed => style("✗ failed").red().to_string(),
        AnalysisStatus::InProgress => style("… in progress").yellow().to_string(),
        AnalysisStatus::NotStarted => style("not started").dim().to_string(),
    }
}

/// Print the final state of an analysis, including the formatted report
pub fn print_state(state: &AnalysisState, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let document = json!({
                "state": state,
                "report": state.results.as_ref().map(|r| format_results(Some(r))),
            });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        OutputFormat::Table => {
            println!("Field,Value");
            println!("Session,{}", state.session_id.as_deref().unwrap_or("-"));
            println!("Status,{}", state.status);
            if let Some(elapsed) = state.elapsed() {
                println!("Duration,{}", format_elapsed(elapsed));
            }
            if let Some(message) = &state.error_message {
                println!("Error,\"{}\"", message.replace('"', "\"\""));
            }
        }
        OutputFormat::Pretty => {
            println!("\n{}", style("Analysis Report").bold().cyan());
            println!("{}", style("===============").cyan());
            println!(
                "  Session:  {}",
                state.session_id.as_deref().unwrap_or("-")
            );
            println!("  Status:   {}", status_label(state.status));
            if let Some(elapsed) = state.elapsed() {
                println!("  Duration: {}", format_elapsed(elapsed));
            }
            if let Some(message) = &state.error_message {
                println!("  Error:    {}", style(message).red());
            }

            if state.status == AnalysisStatus::Completed {
                println!();
                println!("{}", format_results(state.results.as_ref()));
            }
            println!();
        }
    }

    Ok(())
}
