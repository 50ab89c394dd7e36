//! Signal analysis engine: descriptive statistics, spike, stall and
//! oscillation detection, median filtering and spectral transforms over a
//! single uniformly sampled series.

pub mod config;
pub mod data;
pub mod error;
pub mod processing;
pub mod report;
pub mod state;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
pub use report::AnalysisReport;
pub use state::dataset::Dataset;
pub use state::series::Series;
