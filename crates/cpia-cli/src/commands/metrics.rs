use crate::OutputFormat;
use crate::output::{display_value, print_diagnostics};
use anyhow::Result;
use console::style;
use cpia_client::ApiSettings;
use cpia_core::models::MonitoringMetricsResponse;

pub fn execute(settings: &ApiSettings, format: OutputFormat) -> Result<()> {
    tracing::info!("Fetching service metrics from {}", settings.base_url);

    let client = super::build_client(settings)?;
    let runtime = tokio::runtime::Runtime::new()?;
    let metrics = runtime.block_on(client.get_monitoring_metrics())?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&metrics)?),
        OutputFormat::Table => output_table(&metrics),
        OutputFormat::Pretty => output_pretty(&metrics),
    }

    Ok(())
}

fn output_pretty(metrics: &MonitoringMetricsResponse) {
    println!("\n{}", style("Service Metrics").bold().cyan());
    println!("{}", style("===============").cyan());
    if let Some(ts) = metrics.timestamp {
        println!("  Snapshot: {}", ts.to_rfc3339());
    }

    for (title, entries) in metrics.groups() {
        print_diagnostics(title, entries);
    }

    println!();
}

fn output_table(metrics: &MonitoringMetricsResponse) {
    println!("Group,Metric,Value");
    for (title, entries) in metrics.groups() {
        for (name, value) in entries {
            println!("{},{},{}", title, name, display_value(value));
        }
    }
}
