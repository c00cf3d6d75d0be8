pub mod error;
pub mod models;
pub mod report;
pub mod status;

pub use error::{Error, Result};
