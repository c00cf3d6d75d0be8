// Client side of the CPIA analysis service

pub mod client;
pub mod error;
pub mod poll;
pub mod settings;

pub use client::ApiClient;
pub use error::{Error, ErrorKind, Result};
pub use poll::{PollOptions, PollProgress, ResultsSource, poll_for_completion, poll_with_progress};
pub use settings::{ApiSettings, PollSettings};
