use flu_epidata::epiweek::EpiWeek;
use flu_epidata::EpidataError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while caching, assembling or writing season data
#[derive(Error, Debug)]
pub enum DataError {
    /// An observation with no matching region, season or week slot
    #[error("Malformed observation for {region} at {epiweek}: {reason}")]
    MalformedObservation {
        region: String,
        epiweek: EpiWeek,
        reason: &'static str,
    },

    /// The cache file exists but could not be read
    #[error("Failed to read cache file {}: {source}", path.display())]
    CacheRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache file is not a valid cache blob
    #[error("Cache file {} is corrupt: {source}", path.display())]
    CacheCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize data for writing
    #[error("Failed to serialize {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to write a file
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Nothing to assemble
    #[error("No seasons requested")]
    NoSeasons,

    /// Remote data client failure
    #[error(transparent)]
    Epidata(#[from] EpidataError),
}

/// Type alias for Results using DataError
pub type Result<T> = std::result::Result<T, DataError>;
