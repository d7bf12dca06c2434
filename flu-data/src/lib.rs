//! Lag cache, season assembly and derived views for FluSight observations.
//!
//! Observations fetched by `flu-epidata` are swept lag by lag into a
//! [`table::RegionSeasonTable`], cached on disk in a [`cache::LagCache`] and
//! turned into the single-valued series the dashboard artifacts carry.

pub mod artifact;
pub mod cache;
pub mod derived;
pub mod error;
pub mod sweep;
pub mod table;

pub use cache::LagCache;
pub use error::{DataError, Result};
pub use sweep::{sweep, SweepReport, MAX_LAG};
pub use table::RegionSeasonTable;
