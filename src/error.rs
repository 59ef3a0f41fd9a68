//! Error types for the site analyzer.
//!
//! Only a failed page fetch or a missing stored analysis surfaces as an
//! [`AppError`]; every other failure ends up inside the affected report
//! section. [`AnalysisFailure`] is the `{error, details}` value printed in
//! place of a report.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort an operation as a whole.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid or malformed URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The page itself could not be retrieved
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Analysis record not found
    #[error("Analysis not found: {0}")]
    AnalysisNotFound(i64),
}

impl AppError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::NetworkError(msg.into())
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;

// ============================================================================
// REPORT-LEVEL FAILURE
// ============================================================================

/// Failure value returned in place of a report when the page could not be
/// fetched at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisFailure {
    pub error: String,
    pub details: String,
}

impl AnalysisFailure {
    pub const MESSAGE: &'static str = "Fehler bei der Website-Analyse";
}

impl From<AppError> for AnalysisFailure {
    fn from(error: AppError) -> Self {
        Self {
            error: Self::MESSAGE.to_string(),
            details: format!("{:#}", anyhow::Error::from(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_carries_fixed_message_and_details() {
        let failure = AnalysisFailure::from(AppError::network("connection refused"));
        assert_eq!(failure.error, "Fehler bei der Website-Analyse");
        assert_eq!(failure.details, "Network error: connection refused");
    }

    #[test]
    fn invalid_url_names_the_input() {
        let failure = AnalysisFailure::from(AppError::InvalidUrl("mailto:me@example.com".into()));
        assert_eq!(failure.details, "Invalid URL: mailto:me@example.com");
        assert_eq!(
            AppError::AnalysisNotFound(7).to_string(),
            "Analysis not found: 7"
        );
    }
}
