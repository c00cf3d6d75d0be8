use crate::OutputFormat;
use crate::output::{display_value, print_diagnostics};
use anyhow::{Result, bail};
use console::style;
use cpia_client::ApiSettings;
use cpia_core::models::{HealthResponse, MonitoringHealthResponse};
use serde_json::json;

pub fn execute(settings: &ApiSettings, detailed: bool, format: OutputFormat) -> Result<()> {
    tracing::info!("Checking service health at {}", settings.base_url);

    let client = super::build_client(settings)?;
    let runtime = tokio::runtime::Runtime::new()?;

    let health = runtime.block_on(client.check_health())?;
    let monitoring = if detailed {
        Some(runtime.block_on(client.get_monitoring_health())?)
    } else {
        None
    };

    match format {
        OutputFormat::Json => output_json(&health, monitoring.as_ref())?,
        OutputFormat::Table => output_table(&health, monitoring.as_ref()),
        OutputFormat::Pretty => output_pretty(&health, monitoring.as_ref()),
    }

    if !health.is_healthy() {
        bail!("Service reported status '{}'", health.status);
    }
    Ok(())
}

fn output_pretty(health: &HealthResponse, monitoring: Option<&MonitoringHealthResponse>) {
    let marker = if health.is_healthy() {
        style("✓").green()
    } else {
        style("✗").red()
    };

    println!("\n{}", style("Service Health").bold().cyan());
    println!("{}", style("==============").cyan());
    println!("  Status:    {} {}", marker, health.status);
    if !health.version.is_empty() {
        println!("  Version:   {}", health.version);
    }
    if let Some(ts) = health.timestamp {
        println!("  Timestamp: {}", ts.to_rfc3339());
    }
    if !health.dependencies.is_empty() {
        print_diagnostics("Dependencies", &health.dependencies);
    }

    if let Some(monitoring) = monitoring {
        println!("\n{}", style("Detailed Health").bold().cyan());
        println!("{}", style("===============").cyan());
        println!("  Status:    {}", monitoring.status);
        println!("  Uptime:    {:.0}s", monitoring.uptime_seconds);
        print_diagnostics("Health Checks", &monitoring.health_checks);
        print_diagnostics("System Metrics", &monitoring.system_metrics);
    }

    println!();
}

fn output_json(
    health: &HealthResponse,
    monitoring: Option<&MonitoringHealthResponse>,
) -> Result<()> {
    let document = json!({
        "health": health,
        "monitoring": monitoring,
    });
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

fn output_table(health: &HealthResponse, monitoring: Option<&MonitoringHealthResponse>) {
    println!("Check,Value");
    println!("status,{}", health.status);
    println!("version,{}", health.version);
    for (name, value) in &health.dependencies {
        println!("dependency.{},{}", name, display_value(value));
    }

    if let Some(monitoring) = monitoring {
        println!("monitoring.status,{}", monitoring.status);
        println!("monitoring.uptime_seconds,{:.0}", monitoring.uptime_seconds);
        for (name, value) in &monitoring.health_checks {
            println!("check.{},{}", name, display_value(value));
        }
        for (name, value) in &monitoring.system_metrics {
            println!("system.{},{}", name, display_value(value));
        }
    }
}
