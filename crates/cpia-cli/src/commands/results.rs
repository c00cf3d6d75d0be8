use crate::OutputFormat;
use crate::output::print_state;
use anyhow::{Result, bail};
use console::style;
use cpia_client::ApiSettings;
use cpia_core::models::{AnalysisStatus, ResultsResponse};
use cpia_core::report::format_results;
use cpia_core::status::RemoteStatus;

pub fn execute(
    settings: &ApiSettings,
    session_id: &str,
    wait: bool,
    format: OutputFormat,
) -> Result<()> {
    tracing::info!("Fetching results for session {}", session_id);

    let client = super::build_client(settings)?;
    let runtime = tokio::runtime::Runtime::new()?;

    if wait {
        let options = settings.poll_options();
        let state = runtime.block_on(super::analyze::wait_for_completion(
            &client,
            session_id,
            &options,
            format == OutputFormat::Pretty,
        ))?;

        print_state(&state, format)?;
        if state.status == AnalysisStatus::Failed {
            bail!(
                "Analysis {} failed: {}",
                session_id,
                state.error_message.as_deref().unwrap_or("unknown error")
            );
        }
        return Ok(());
    }

    let response = runtime.block_on(client.get_results(session_id))?;
    output_response(&response, format)?;

    match RemoteStatus::parse(&response.status) {
        RemoteStatus::Failed | RemoteStatus::Error => bail!(
            "Analysis {} failed: {}",
            session_id,
            response.error_message.as_deref().unwrap_or("Analysis failed")
        ),
        _ => Ok(()),
    }
}

fn output_response(response: &ResultsResponse, format: OutputFormat) -> Result<()> {
    let status = RemoteStatus::parse(&response.status);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(response)?),
        OutputFormat::Table => {
            println!("Field,Value");
            println!("Session,{}", response.session_id);
            println!("Status,{}", response.status);
            if let Some(message) = &response.error_message {
                println!("Error,\"{}\"", message.replace('"', "\"\""));
            }
        }
        OutputFormat::Pretty => {
            println!("\n{}", style("Analysis Results").bold().cyan());
            println!("{}", style("================").cyan());
            println!("  Session: {}", response.session_id);
            println!("  Status:  {}", response.status);

            match status {
                RemoteStatus::Completed => {
                    println!();
                    println!("{}", format_results(response.analysis_result.as_ref()));
                }
                RemoteStatus::Failed | RemoteStatus::Error => {
                    println!(
                        "  Error:   {}",
                        style(response.error_message.as_deref().unwrap_or("Analysis failed"))
                            .red()
                    );
                }
                _ => {
                    println!();
                    println!(
                        "Analysis is still running. Use --wait to poll until it finishes."
                    );
                }
            }
            println!();
        }
    }

    Ok(())
}
