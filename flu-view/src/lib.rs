//! Read-only dashboard views over assembled FluSight data.
//!
//! - `state`: dashboard data model and selection state with its transitions
//! - `getters`: projections keyed by the selection (choropleth, time chart, listings)
//! - `stats`: model forecast scores

pub mod getters;
pub mod state;
pub mod stats;
