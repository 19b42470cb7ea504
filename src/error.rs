// src/error.rs
// =============================================================================
// Request-level failures of a page analysis.
//
// All of these are terminal for the current request and end up as the
// `error` field of an AnalysisResult. Individual link probe failures are
// NOT errors: they are only counted as unreachable links.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The target is not an absolute http(s) URL
    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Network error or non-200 status while fetching the page
    #[error("{0}")]
    FetchFailure(String),

    /// The document could not be parsed
    #[error("Failed to parse HTML: {0}")]
    ParseFailure(String),

    /// The page budget ran out (or the run was cancelled) before completion
    #[error("Analysis timed out after {elapsed_ms}ms")]
    AnalysisTimeout { elapsed_ms: u128 },
}

impl From<reqwest::Error> for AnalysisError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            AnalysisError::FetchFailure("Request timed out".to_string())
        } else {
            AnalysisError::FetchFailure(error.to_string())
        }
    }
}

pub type AnalysisOutcome<T> = std::result::Result<T, AnalysisError>;
