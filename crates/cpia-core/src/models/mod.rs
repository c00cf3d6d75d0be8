mod api;
mod nullable;
mod state;
pub mod timestamp;

pub use api::*;
pub use state::{AnalysisState, AnalysisStatus};
