use crate::poll::{self, PollOptions};
use crate::{ApiSettings, Error, Result};
use cpia_core::models::{
    AnalysisRequest, AnalysisResponse, AnalysisState, HealthResponse, MonitoringHealthResponse,
    MonitoringMetricsResponse, ResultsResponse,
};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

const USER_AGENT: &str = concat!("cpia/", env!("CARGO_PKG_VERSION"));

/// Longest response body kept in a status error
const MAX_ERROR_BODY: usize = 512;

/// Typed client for the analysis service.
///
/// Every call is a single round trip over one shared connection pool. Failures
/// are logged here and returned to the caller with their [`ErrorKind`](crate::ErrorKind).
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        settings.validate()?;
        let base_url = settings.parsed_base_url()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(settings.timeout())
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        tracing::debug!(
            "API client targeting {} (timeout {}s)",
            base_url,
            settings.timeout_secs
        );

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /health/`
    pub async fn check_health(&self) -> Result<HealthResponse> {
        self.get(self.endpoint("health/"), "GET /health/")
            .await
            .inspect_err(|e| tracing::warn!("Health check failed: {}", e))
    }

    /// `POST /run-analysis/`
    pub async fn start_analysis(&self, request: &AnalysisRequest) -> Result<AnalysisResponse> {
        self.submit(request)
            .await
            .inspect_err(|e| tracing::warn!("Start analysis failed: {}", e))
    }

    /// `GET /results/{session_id}`
    pub async fn get_results(&self, session_id: &str) -> Result<ResultsResponse> {
        self.get(self.results_url(session_id), "GET /results/{session_id}")
            .await
            .inspect_err(|e| tracing::warn!("Get results failed: {}", e))
    }

    /// `GET /monitoring/health`
    pub async fn get_monitoring_health(&self) -> Result<MonitoringHealthResponse> {
        self.get(self.endpoint("monitoring/health"), "GET /monitoring/health")
            .await
            .inspect_err(|e| tracing::warn!("Monitoring health check failed: {}", e))
    }

    /// `GET /monitoring/metrics`
    pub async fn get_monitoring_metrics(&self) -> Result<MonitoringMetricsResponse> {
        self.get(self.endpoint("monitoring/metrics"), "GET /monitoring/metrics")
            .await
            .inspect_err(|e| tracing::warn!("Get monitoring metrics failed: {}", e))
    }

    /// Poll `session_id` until it reaches a terminal status
    pub async fn poll_for_completion(
        &self,
        session_id: &str,
        options: &PollOptions,
    ) -> AnalysisState {
        poll::poll_for_completion(self, session_id, options).await
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::Config(format!("Invalid endpoint '{}': {}", path, e)))
    }

    fn results_url(&self, session_id: &str) -> Result<Url> {
        if session_id.trim().is_empty() {
            return Err(Error::InvalidInput(
                "session identifier must not be empty".to_string(),
            ));
        }

        let mut url = self.endpoint("results/")?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Base URL cannot hold paths: {}", self.base_url)))?
            .pop_if_empty()
            .push(session_id);

        Ok(url)
    }

    async fn submit(&self, request: &AnalysisRequest) -> Result<AnalysisResponse> {
        request.validate()?;

        tracing::info!(
            "Starting analysis of {} ({} comparison repos)",
            request.primary_repo,
            request.comparison_repos.as_ref().map_or(0, Vec::len)
        );

        let url = self.endpoint("run-analysis/")?;
        self.send(self.http.post(url).json(request), "POST /run-analysis/")
            .await
    }

    async fn get<T: DeserializeOwned>(&self, url: Result<Url>, endpoint: &str) -> Result<T> {
        self.send(self.http.get(url?), endpoint).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, endpoint: &str) -> Result<T> {
        tracing::debug!("Sending {}", endpoint);

        let response = request.send().await.map_err(|source| Error::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| Error::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(Error::Status {
                endpoint: endpoint.to_string(),
                status,
                body: truncate(body, MAX_ERROR_BODY),
            });
        }

        tracing::debug!("{} -> {} ({} bytes)", endpoint, status, body.len());

        serde_json::from_str(&body).map_err(|source| Error::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

fn truncate(mut text: String, max: usize) -> String {
    if text.len() > max {
        let mut cut = max;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push('…');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(&ApiSettings {
            base_url: base_url.to_string(),
            ..ApiSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoints_join_under_base_path() {
        let client = client("http://localhost:8000/api");
        assert_eq!(
            client.endpoint("/health/").unwrap().as_str(),
            "http://localhost:8000/api/health/"
        );
        assert_eq!(
            client.endpoint("monitoring/metrics").unwrap().as_str(),
            "http://localhost:8000/api/monitoring/metrics"
        );
    }

    #[test]
    fn test_results_url_encodes_session_id() {
        let client = client("http://localhost:8000");
        assert_eq!(
            client.results_url("abc-123").unwrap().as_str(),
            "http://localhost:8000/results/abc-123"
        );
        assert_eq!(
            client.results_url("a b/c").unwrap().as_str(),
            "http://localhost:8000/results/a%20b%2Fc"
        );
    }

    #[test]
    fn test_results_url_rejects_empty_session() {
        let client = client("http://localhost:8000");
        let err = client.results_url("  ").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let result = ApiClient::new(&ApiSettings {
            base_url: "localhost".to_string(),
            ..ApiSettings::default()
        });
        assert!(result.is_err());
    }

    /// Log sink shared between the subscriber and the test
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture_warnings() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }

    #[tokio::test]
    async fn test_empty_session_failure_is_logged() {
        let (logs, _guard) = capture_warnings();

        let err = client("http://localhost:8000").get_results("").await.unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
        assert!(logs.contents().contains("Get results failed"));
    }

    #[tokio::test]
    async fn test_invalid_request_failure_is_logged() {
        let (logs, _guard) = capture_warnings();

        let err = client("http://localhost:8000")
            .start_analysis(&AnalysisRequest::new("org/a", " "))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
        assert!(logs.contents().contains("Start analysis failed"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short".to_string(), 10), "short");
        assert_eq!(truncate("ééé".to_string(), 3), "é…");
    }
}
