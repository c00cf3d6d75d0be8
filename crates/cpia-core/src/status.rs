use crate::models::ResultsResponse;
use serde_json::Value;

/// Message used when the service reports a failure without details
pub const DEFAULT_FAILURE_MESSAGE: &str = "Analysis failed";

/// Status string reported by the service for a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    Completed,
    Failed,
    Error,
    Processing,
    InProgress,
    Other(String),
}

impl RemoteStatus {
    /// Case-insensitive parse; unknown values are kept verbatim
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "completed" => RemoteStatus::Completed,
            "failed" => RemoteStatus::Failed,
            "error" => RemoteStatus::Error,
            "processing" => RemoteStatus::Processing,
            "in_progress" => RemoteStatus::InProgress,
            _ => RemoteStatus::Other(raw.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RemoteStatus::Completed | RemoteStatus::Failed | RemoteStatus::Error
        )
    }
}

/// What one results fetch means for the poll loop
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Completed(Option<Value>),
    Failed(String),
    StillRunning,
}

/// Map a results response onto the poll state machine.
///
/// Anything that is not a terminal status keeps the loop running.
pub fn classify(response: &ResultsResponse) -> PollOutcome {
    match RemoteStatus::parse(&response.status) {
        RemoteStatus::Completed => PollOutcome::Completed(response.analysis_result.clone()),
        RemoteStatus::Failed | RemoteStatus::Error => PollOutcome::Failed(
            response
                .error_message
                .clone()
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
        ),
        RemoteStatus::Processing | RemoteStatus::InProgress => PollOutcome::StillRunning,
        RemoteStatus::Other(status) => {
            tracing::debug!("Unrecognized analysis status '{}', still polling", status);
            PollOutcome::StillRunning
        }
    }
}
