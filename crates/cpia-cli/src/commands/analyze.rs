use crate::OutputFormat;
use crate::output::print_state;
use anyhow::{Result, bail};
use console::style;
use cpia_client::{ApiClient, ApiSettings, PollOptions, poll_with_progress};
use cpia_core::models::{AnalysisRequest, AnalysisResponse, AnalysisState, AnalysisStatus};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Options for the analyze command
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub primary_repo: String,
    pub query: String,
    pub compare: Vec<String>,
    pub no_wait: bool,
    pub max_attempts: Option<u32>,
    pub delay_secs: Option<u64>,
}

/// Build the request sent to the service
pub fn build_request(options: &AnalyzeOptions) -> Result<AnalysisRequest> {
    let request = AnalysisRequest::new(options.primary_repo.trim(), options.query.trim())
        .with_comparison_repos(options.compare.iter().map(|r| r.trim().to_string()));
    request.validate()?;
    Ok(request)
}

/// Poll options from settings, with command-line overrides
pub fn poll_options(
    settings: &ApiSettings,
    max_attempts: Option<u32>,
    delay_secs: Option<u64>,
) -> PollOptions {
    let mut options = settings.poll_options();
    if let Some(max_attempts) = max_attempts {
        options.max_attempts = max_attempts;
    }
    if let Some(delay_secs) = delay_secs {
        options.delay = Duration::from_secs(delay_secs);
    }
    options
}

pub fn execute(settings: &ApiSettings, options: AnalyzeOptions, format: OutputFormat) -> Result<()> {
    let request = build_request(&options)?;
    tracing::info!("Submitting analysis for {}", request.primary_repo);

    let client = super::build_client(settings)?;
    let runtime = tokio::runtime::Runtime::new()?;

    let accepted = runtime.block_on(client.start_analysis(&request))?;
    tracing::info!("Analysis accepted with session {}", accepted.session_id);

    if options.no_wait {
        output_accepted(&accepted, format)?;
        return Ok(());
    }

    if format == OutputFormat::Pretty {
        println!(
            "🚀 Analysis started (session {})",
            style(&accepted.session_id).bold()
        );
    }

    let poll = poll_options(settings, options.max_attempts, options.delay_secs);
    let state = runtime.block_on(wait_for_completion(
        &client,
        &accepted.session_id,
        &poll,
        format == OutputFormat::Pretty,
    ))?;

    print_state(&state, format)?;

    if state.status == AnalysisStatus::Failed {
        bail!(
            "Analysis {} failed: {}",
            accepted.session_id,
            state.error_message.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

/// Run the poll loop behind a spinner
pub async fn wait_for_completion(
    client: &ApiClient,
    session_id: &str,
    options: &PollOptions,
    show_progress: bool,
) -> Result<AnalysisState> {
    let spinner = if show_progress {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner.set_message("Waiting for analysis results...");
        spinner
    } else {
        ProgressBar::hidden()
    };

    let state = poll_with_progress(client, session_id, options, |progress| {
        spinner.set_message(format!(
            "Waiting for analysis results... status: {} (attempt {}/{})",
            progress.status, progress.attempt, progress.max_attempts
        ));
    })
    .await;

    spinner.finish_and_clear();
    Ok(state)
}

fn output_accepted(accepted: &AnalysisResponse, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(accepted)?),
        OutputFormat::Table => {
            println!("Field,Value");
            println!("Session,{}", accepted.session_id);
            println!("Status,{}", accepted.status);
            println!("Message,\"{}\"", accepted.message.replace('"', "\"\""));
        }
        OutputFormat::Pretty => {
            println!("🚀 Analysis started");
            println!("  Session: {}", style(&accepted.session_id).bold());
            println!("  Status:  {}", accepted.status);
            if !accepted.message.is_empty() {
                println!("  Message: {}", accepted.message);
            }
            println!();
            println!(
                "Check progress with: cpia results {} --wait",
                accepted.session_id
            );
        }
    }
    Ok(())
}
