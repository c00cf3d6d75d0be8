use crate::{ApiClient, Result};
use async_trait::async_trait;
use cpia_core::models::{AnalysisState, ResultsResponse};
use cpia_core::status::{PollOutcome, classify};
use std::time::Duration;

/// Failure message when a results fetch itself fails
pub const FETCH_FAILED_MESSAGE: &str = "Failed to get results from API";

/// Failure message when the attempt budget runs out
pub const TIMED_OUT_MESSAGE: &str = "Analysis timed out";

/// Anything that can fetch the current results of a session
#[async_trait]
pub trait ResultsSource: Send + Sync {
    async fn fetch_results(&self, session_id: &str) -> Result<ResultsResponse>;
}

#[async_trait]
impl ResultsSource for ApiClient {
    async fn fetch_results(&self, session_id: &str) -> Result<ResultsResponse> {
        self.get_results(session_id).await
    }
}

/// Attempt budget and spacing for the poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            delay: Duration::from_secs(5),
        }
    }
}

/// Reported after every successful fetch
#[derive(Debug, Clone, Copy)]
pub struct PollProgress<'a> {
    /// 1-based attempt number
    pub attempt: u32,
    pub max_attempts: u32,
    /// Status string as sent by the service
    pub status: &'a str,
}

/// Poll until the session completes, fails, or the attempt budget is spent
pub async fn poll_for_completion<S>(
    source: &S,
    session_id: &str,
    options: &PollOptions,
) -> AnalysisState
where
    S: ResultsSource + ?Sized,
{
    poll_with_progress(source, session_id, options, |_| {}).await
}

/// Same as [`poll_for_completion`], reporting progress after each fetch.
///
/// A failed fetch is terminal and is not retried. The loop sleeps between
/// attempts but not after the last one.
pub async fn poll_with_progress<S, F>(
    source: &S,
    session_id: &str,
    options: &PollOptions,
    mut on_progress: F,
) -> AnalysisState
where
    S: ResultsSource + ?Sized,
    F: FnMut(PollProgress<'_>),
{
    let mut state = AnalysisState::begin(session_id);

    for attempt in 0..options.max_attempts {
        let response = match source.fetch_results(session_id).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    "Polling {} stopped on attempt {}: {}",
                    session_id,
                    attempt + 1,
                    e
                );
                state.fail(FETCH_FAILED_MESSAGE);
                return state;
            }
        };

        on_progress(PollProgress {
            attempt: attempt + 1,
            max_attempts: options.max_attempts,
            status: &response.status,
        });

        match classify(&response) {
            PollOutcome::Completed(results) => {
                tracing::info!("Analysis {} completed after {} attempts", session_id, attempt + 1);
                state.complete(results);
                return state;
            }
            PollOutcome::Failed(reason) => {
                tracing::info!("Analysis {} failed: {}", session_id, reason);
                state.fail(reason);
                return state;
            }
            PollOutcome::StillRunning => {
                tracing::debug!(
                    "Analysis {} still running ({}), attempt {}/{}",
                    session_id,
                    response.status,
                    attempt + 1,
                    options.max_attempts
                );
            }
        }

        if attempt + 1 < options.max_attempts {
            tokio::time::sleep(options.delay).await;
        }
    }

    tracing::warn!(
        "Analysis {} did not finish within {} attempts",
        session_id,
        options.max_attempts
    );
    state.fail(TIMED_OUT_MESSAGE);
    state
}
