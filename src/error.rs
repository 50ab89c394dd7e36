use thiserror::Error;

/// Errors raised by the analysis engine and its loader.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Window of {window} samples does not fit a series of {count} samples")]
    WindowTooLarge { window: usize, count: usize },

    #[error("Load error: {0}")]
    Load(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Report error: {0}")]
    Report(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        AnalysisError::InvalidInput(msg.into())
    }
}
