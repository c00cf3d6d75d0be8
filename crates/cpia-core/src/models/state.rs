use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Lifecycle of an analysis as seen by the client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::NotStarted => "not_started",
            AnalysisStatus::InProgress => "in_progress",
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalysisStatus::Completed | AnalysisStatus::Failed)
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-side record of one analysis session.
///
/// Owned by whoever drives the poll loop. A new analysis starts from a fresh
/// (or [`reset`](AnalysisState::reset)) state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisState {
    pub session_id: Option<String>,
    pub status: AnalysisStatus,
    pub error_message: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub results: Option<Value>,
}

impl AnalysisState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a session: InProgress, stamped with the current time
    pub fn begin(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            status: AnalysisStatus::InProgress,
            start_time: Some(Utc::now()),
            ..Self::default()
        }
    }

    pub fn complete(&mut self, results: Option<Value>) {
        self.status = AnalysisStatus::Completed;
        self.results = results;
        self.error_message = None;
        self.end_time = Some(Utc::now());
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = AnalysisStatus::Failed;
        self.error_message = Some(message.into());
        self.end_time = Some(Utc::now());
    }

    /// Drop everything from the previous session
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Time between start and end, or start and now while still running
    pub fn elapsed(&self) -> Option<Duration> {
        let start = self.start_time?;
        let end = self.end_time.unwrap_or_else(Utc::now);
        Some(end - start)
    }
}
