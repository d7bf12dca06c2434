use crate::error::{EpidataError, Result};
use crate::observation::{FluviewRow, Observation};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Rows were found.
pub const RESULT_SUCCESS: i64 = 1;
/// Rows were found but the server row limit cut the answer short.
pub const RESULT_TRUNCATED: i64 = 2;
/// The query matched nothing.
pub const RESULT_NO_RESULTS: i64 = -2;

/// The `{result, message, epidata}` envelope wrapping every API answer.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub result: Option<i64>,
    #[serde(default)]
    pub message: String,
    pub epidata: Option<Vec<T>>,
}

impl<T> Envelope<T> {
    /// Unwrap the rows, turning non-success result codes into errors.
    pub fn into_rows(self) -> Result<Vec<T>> {
        match (self.result, self.epidata) {
            (Some(RESULT_SUCCESS), Some(rows)) => Ok(rows),
            (Some(RESULT_TRUNCATED), Some(rows)) => {
                warn!(
                    "Epidata response truncated at {} rows: {}",
                    rows.len(),
                    self.message
                );
                Ok(rows)
            }
            (Some(RESULT_NO_RESULTS), _) => Err(EpidataError::NoResults(self.message)),
            (Some(result), _) => Err(EpidataError::Api {
                result,
                message: self.message,
            }),
            (None, _) => Err(EpidataError::Api {
                result: 0,
                message: "unknown error".to_string(),
            }),
        }
    }
}

/// Decode an envelope of arbitrary rows from a response body.
pub fn parse_rows<T: DeserializeOwned>(body: &str) -> Result<Vec<T>> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    envelope.into_rows()
}

/// Decode a `fluview` response body into observations.
pub fn parse_fluview(body: &str, requested_lag: Option<u32>) -> Result<Vec<Observation>> {
    let rows: Vec<FluviewRow> = parse_rows(body)?;
    let total = rows.len();
    let observations: Vec<Observation> = rows
        .into_iter()
        .filter_map(|row| row.into_observation(requested_lag))
        .collect();
    if observations.len() < total {
        debug!(
            "Dropped {} fluview rows without wili or lag",
            total - observations.len()
        );
    }
    Ok(observations)
}
