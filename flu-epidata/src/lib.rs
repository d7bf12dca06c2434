//! Core types and Delphi Epidata API client for FluSight data.
//!
//! - `epiweek` / `season`: MMWR week and flu season identifiers
//! - `observation` / `region`: normalized records and region metadata
//! - `query` / `response`: wire encoding of requests and answers
//! - `client` (feature `api`): the HTTP client implementing [`source::EpidataSource`]

#[cfg(feature = "api")]
pub mod client;
pub mod epiweek;
pub mod error;
pub mod observation;
pub mod query;
pub mod region;
pub mod response;
pub mod season;
pub mod source;

pub use error::{EpidataError, Result};
