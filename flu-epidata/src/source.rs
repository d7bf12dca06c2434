use crate::epiweek::EpiRange;
use crate::error::Result;
use crate::observation::Observation;

/// Anything that can answer a `fluview` query for a set of regions over an
/// epiweek range, optionally pinned to one lag.
///
/// `None` asks for the latest issue; each observation then carries its own lag.
#[allow(async_fn_in_trait)]
pub trait EpidataSource {
    async fn fetch(
        &self,
        regions: &[String],
        range: EpiRange,
        lag: Option<u32>,
    ) -> Result<Vec<Observation>>;
}
