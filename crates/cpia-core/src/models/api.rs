use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Free-form diagnostic map (health checks, metrics)
pub type Diagnostics = BTreeMap<String, Value>;

/// Request body for starting a new analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub primary_repo: String,
    pub user_query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison_repos: Option<Vec<String>>,
}

impl AnalysisRequest {
    pub fn new(primary_repo: impl Into<String>, user_query: impl Into<String>) -> Self {
        Self {
            primary_repo: primary_repo.into(),
            user_query: user_query.into(),
            comparison_repos: None,
        }
    }

    /// Attach comparison repositories; an empty list leaves the field unset
    pub fn with_comparison_repos<I, S>(mut self, repos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let repos: Vec<String> = repos.into_iter().map(Into::into).collect();
        self.comparison_repos = if repos.is_empty() { None } else { Some(repos) };
        self
    }

    /// Check the request before it is sent
    pub fn validate(&self) -> Result<()> {
        if self.primary_repo.trim().is_empty() {
            return Err(Error::InvalidRequest(
                "primary repository must not be empty".to_string(),
            ));
        }
        if self.user_query.trim().is_empty() {
            return Err(Error::InvalidRequest(
                "user query must not be empty".to_string(),
            ));
        }
        if let Some(repos) = &self.comparison_repos
            && let Some(idx) = repos.iter().position(|r| r.trim().is_empty())
        {
            return Err(Error::InvalidRequest(format!(
                "comparison repository {} is empty",
                idx
            )));
        }
        Ok(())
    }
}

/// Response returned when an analysis is accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub session_id: String,
    #[serde(default, deserialize_with = "super::nullable::deserialize")]
    pub status: String,
    #[serde(default, deserialize_with = "super::nullable::deserialize")]
    pub message: String,
}

/// Results for an analysis session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub session_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Liveness snapshot from `GET /health/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default, deserialize_with = "super::nullable::deserialize")]
    pub version: String,
    #[serde(default, deserialize_with = "super::nullable::deserialize")]
    pub dependencies: Diagnostics,
    #[serde(
        default,
        with = "super::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        is_healthy_status(&self.status)
    }
}

/// Detailed health snapshot from `GET /monitoring/health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringHealthResponse {
    pub status: String,
    #[serde(
        default,
        with = "super::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::nullable::deserialize")]
    pub version: String,
    #[serde(default, deserialize_with = "super::nullable::deserialize")]
    pub health_checks: Diagnostics,
    #[serde(default, deserialize_with = "super::nullable::deserialize")]
    pub system_metrics: Diagnostics,
    #[serde(default, deserialize_with = "super::nullable::deserialize")]
    pub uptime_seconds: f64,
}

impl MonitoringHealthResponse {
    pub fn is_healthy(&self) -> bool {
        is_healthy_status(&self.status)
    }
}

/// Metrics snapshot from `GET /monitoring/metrics`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringMetricsResponse {
    #[serde(
        default,
        with = "super::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::nullable::deserialize")]
    pub memory_usage: Diagnostics,
    #[serde(default, deserialize_with = "super::nullable::deserialize")]
    pub operation_counts: Diagnostics,
    #[serde(default, deserialize_with = "super::nullable::deserialize")]
    pub response_times: Diagnostics,
    #[serde(default, deserialize_with = "super::nullable::deserialize")]
    pub error_rates: Diagnostics,
}

impl MonitoringMetricsResponse {
    /// Named metric groups in display order
    pub fn groups(&self) -> [(&'static str, &Diagnostics); 4] {
        [
            ("Memory Usage", &self.memory_usage),
            ("Operation Counts", &self.operation_counts),
            ("Response Times", &self.response_times),
            ("Error Rates", &self.error_rates),
        ]
    }
}

/// One entry of a completed analysis payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResultItem {
    #[serde(default, alias = "comparison_repo")]
    pub comparison_repo: Option<String>,
    #[serde(default, alias = "analysis_result")]
    pub analysis_result: Option<String>,
    #[serde(default, alias = "fact_check_result")]
    pub fact_check_result: Option<String>,
    #[serde(default, alias = "aggregate_query_result")]
    pub aggregate_query_result: Option<String>,
    #[serde(default, alias = "final_summary")]
    pub final_summary: Option<String>,
}

fn is_healthy_status(status: &str) -> bool {
    matches!(
        status.to_lowercase().as_str(),
        "healthy" | "ok" | "up" | "pass"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_snake_case() {
        let request = AnalysisRequest::new("org/primary", "How is testing done?")
            .with_comparison_repos(["org/other"]);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "primary_repo": "org/primary",
                "user_query": "How is testing done?",
                "comparison_repos": ["org/other"]
            })
        );

        let decoded: AnalysisRequest = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_request_omits_missing_comparison_repos() {
        let request = AnalysisRequest::new("org/primary", "query")
            .with_comparison_repos(Vec::<String>::new());

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("comparison_repos").is_none());
        assert!(value.get("primaryRepo").is_none());
    }

    #[test]
    fn test_request_validation() {
        assert!(AnalysisRequest::new("org/a", "q").validate().is_ok());
        assert!(AnalysisRequest::new("  ", "q").validate().is_err());
        assert!(AnalysisRequest::new("org/a", "").validate().is_err());
        assert!(
            AnalysisRequest::new("org/a", "q")
                .with_comparison_repos(["org/b", ""])
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_results_response_from_snake_case() {
        let response: ResultsResponse = serde_json::from_value(json!({
            "session_id": "abc-123",
            "status": "completed",
            "analysis_result": [{"finalSummary": "done"}],
            "error_message": null
        }))
        .unwrap();

        assert_eq!(response.session_id, "abc-123");
        assert_eq!(response.status, "completed");
        assert!(response.analysis_result.is_some());
        assert!(response.error_message.is_none());
    }

    #[test]
    fn test_results_response_ignores_camel_case_keys() {
        let result = serde_json::from_value::<ResultsResponse>(json!({
            "sessionId": "abc-123",
            "status": "completed"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_health_response_defaults_missing_maps() {
        let health: HealthResponse = serde_json::from_value(json!({
            "status": "healthy",
            "timestamp": "2024-05-01T10:00:00.5"
        }))
        .unwrap();

        assert!(health.is_healthy());
        assert!(health.dependencies.is_empty());
        assert!(health.version.is_empty());
        assert!(health.timestamp.is_some());
    }

    #[test]
    fn test_monitoring_health_response() {
        let health: MonitoringHealthResponse = serde_json::from_value(json!({
            "status": "degraded",
            "timestamp": "2024-05-01T10:00:00Z",
            "version": "1.2.0",
            "health_checks": {"database": "ok", "llm": {"latency_ms": 120}},
            "system_metrics": {"cpu_percent": 12.5},
            "uptime_seconds": 3600.0
        }))
        .unwrap();

        assert!(!health.is_healthy());
        assert_eq!(health.health_checks.len(), 2);
        assert_eq!(health.health_checks["database"], json!("ok"));
        assert_eq!(health.uptime_seconds, 3600.0);
    }

    #[test]
    fn test_metrics_groups_keep_order() {
        let metrics: MonitoringMetricsResponse = serde_json::from_value(json!({
            "timestamp": "2024-05-01T10:00:00",
            "memory_usage": {"rss_mb": 210},
            "error_rates": {"run_analysis": 0.01}
        }))
        .unwrap();

        let names: Vec<&str> = metrics.groups().iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec!["Memory Usage", "Operation Counts", "Response Times", "Error Rates"]
        );
        assert!(metrics.operation_counts.is_empty());
    }

    #[test]
    fn test_result_item_accepts_both_key_styles() {
        let items: Vec<AnalysisResultItem> = serde_json::from_value(json!([
            {"comparisonRepo": "org/a", "finalSummary": "one"},
            {"comparison_repo": "org/b", "fact_check_result": "two"}
        ]))
        .unwrap();

        assert_eq!(items[0].comparison_repo.as_deref(), Some("org/a"));
        assert_eq!(items[0].final_summary.as_deref(), Some("one"));
        assert_eq!(items[1].comparison_repo.as_deref(), Some("org/b"));
        assert_eq!(items[1].fact_check_result.as_deref(), Some("two"));
    }

    #[test]
    fn test_analysis_response_tolerates_null_message() {
        let response: AnalysisResponse = serde_json::from_value(json!({
            "session_id": "3f2b9c",
            "status": null,
            "message": null
        }))
        .unwrap();

        assert_eq!(response.session_id, "3f2b9c");
        assert!(response.status.is_empty());
        assert!(response.message.is_empty());
    }

    #[test]
    fn test_health_response_tolerates_null_fields() {
        let health: HealthResponse = serde_json::from_value(json!({
            "status": "healthy",
            "version": null,
            "dependencies": null,
            "timestamp": "2024-05-01T10:00:00"
        }))
        .unwrap();

        assert!(health.is_healthy());
        assert!(health.version.is_empty());
        assert!(health.dependencies.is_empty());
    }

    #[test]
    fn test_monitoring_health_tolerates_null_fields() {
        let health: MonitoringHealthResponse = serde_json::from_value(json!({
            "status": "healthy",
            "timestamp": null,
            "version": null,
            "health_checks": null,
            "system_metrics": null,
            "uptime_seconds": null
        }))
        .unwrap();

        assert!(health.timestamp.is_none());
        assert!(health.health_checks.is_empty());
        assert!(health.system_metrics.is_empty());
        assert_eq!(health.uptime_seconds, 0.0);
    }

    #[test]
    fn test_metrics_tolerate_null_groups() {
        let metrics: MonitoringMetricsResponse = serde_json::from_value(json!({
            "memory_usage": null,
            "operation_counts": {"run_analysis": 3},
            "response_times": null,
            "error_rates": null
        }))
        .unwrap();

        assert!(metrics.memory_usage.is_empty());
        assert_eq!(metrics.operation_counts["run_analysis"], json!(3));
        assert!(metrics.response_times.is_empty());
        assert!(metrics.error_rates.is_empty());
    }
}
