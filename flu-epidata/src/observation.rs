use crate::epiweek::EpiWeek;
use serde::{Deserialize, Serialize};

/// A single weighted ILI observation for a region and epiweek, as reported
/// `lag` weeks after the fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub region: String,
    pub epiweek: EpiWeek,
    pub lag: u32,
    pub value: f64,
}

/// A raw `fluview` row as returned by the Epidata API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluviewRow {
    pub region: String,
    pub epiweek: u32,
    #[serde(default)]
    pub lag: Option<u32>,
    #[serde(default)]
    pub issue: Option<u32>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub num_ili: Option<u64>,
    #[serde(default)]
    pub num_patients: Option<u64>,
    #[serde(default)]
    pub num_providers: Option<u64>,
    #[serde(default)]
    pub wili: Option<f64>,
    #[serde(default)]
    pub ili: Option<f64>,
}

impl FluviewRow {
    /// Normalize to an observation valued by weighted ILI. `requested_lag`
    /// wins over the row's own lag when the query pinned one.
    pub fn into_observation(self, requested_lag: Option<u32>) -> Option<Observation> {
        let value = self.wili?;
        let lag = requested_lag.or(self.lag)?;
        Some(Observation {
            region: self.region,
            epiweek: EpiWeek::from_raw(self.epiweek),
            lag,
            value,
        })
    }
}
