/// Error types for the Epidata library
use thiserror::Error;

/// Main error type for Epidata operations
#[derive(Error, Debug)]
pub enum EpidataError {
    /// The API could not be reached, or answered with an unusable HTTP response
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The response body was not a valid Epidata envelope
    #[error("Failed to parse API response: {0}")]
    ResponseParse(#[from] serde_json::Error),

    /// The API answered but signaled failure
    #[error("Epidata API error (result {result}): {message}")]
    Api { result: i64, message: String },

    /// The API found no rows for the query
    #[error("No results for query: {0}")]
    NoResults(String),

    /// A required query parameter was missing or empty
    #[error("Missing required parameter `{0}`")]
    MissingParameter(&'static str),

    /// Season identifier is not of the form "YYYY-YYYY" with consecutive years
    #[error("Invalid season identifier: {0}")]
    InvalidSeason(String),

    /// Epiweek does not encode a week in 1..=53
    #[error("Invalid epiweek: {0}")]
    InvalidEpiWeek(String),

    /// Failed to parse the region fixture
    #[error("Failed to parse region CSV: {0}")]
    RegionCsv(#[from] csv::Error),
}

impl EpidataError {
    /// Network or decoding failure, as opposed to a well-formed API refusal.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::ResponseParse(_))
    }
}

/// Type alias for Results using EpidataError
pub type Result<T> = std::result::Result<T, EpidataError>;
