//! The lag sweep: assemble seasons from every lag between `max_lag` and 0.
//!
//! Lags are processed strictly one after another, highest first, with at
//! most one request in flight. A cached batch is used as is; a miss is
//! fetched and, when the API had rows for it, put into the cache. The
//! caller flushes the cache once the sweep has succeeded.

use crate::cache::LagCache;
use crate::error::{DataError, Result};
use crate::table::{IngestSummary, RegionSeasonTable};
use flu_epidata::error::EpidataError;
use flu_epidata::season::{request_window, SeasonId};
use flu_epidata::source::EpidataSource;
use log::{debug, info, warn};

/// Highest lag fetched by default: a report made 51 weeks after the fact.
pub const MAX_LAG: u32 = 51;

/// Where the batches of a sweep came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub lags_from_cache: usize,
    pub lags_fetched: usize,
    /// Lags for which the API had no rows
    pub empty_lags: usize,
    pub accepted: usize,
    pub dropped: usize,
}

/// Build the season table for `regions` × `seasons` from lags `max_lag` down to 0.
///
/// A lag the API reports as having no results contributes nothing and is
/// left out of the cache, so a later run asks for it again. Any other
/// client error aborts the sweep and is returned; in that case nothing
/// should be flushed.
pub async fn sweep<S: EpidataSource>(
    source: &S,
    cache: &mut LagCache,
    regions: &[String],
    seasons: &[SeasonId],
    max_lag: u32,
) -> Result<(RegionSeasonTable, SweepReport)> {
    let window = request_window(seasons).ok_or(DataError::NoSeasons)?;
    let range_key = window.range_key();
    let mut table = RegionSeasonTable::build_empty(seasons, regions);
    let mut report = SweepReport::default();

    info!(
        "Sweeping lags {}..=0 for {} regions over {}",
        max_lag,
        regions.len(),
        range_key
    );

    for lag in (0..=max_lag).rev() {
        let summary = if let Some(batch) = cache.get(&range_key, lag) {
            debug!("Lag {}: {} cached observations", lag, batch.len());
            report.lags_from_cache += 1;
            table.ingest_batch(batch, lag)
        } else {
            report.lags_fetched += 1;
            match source.fetch(regions, window, Some(lag)).await {
                Ok(batch) => {
                    let summary = table.ingest_batch(&batch, lag);
                    cache.put(range_key.as_str(), lag, batch);
                    summary
                }
                Err(EpidataError::NoResults(message)) => {
                    warn!("Lag {}: no results ({}), not cached", lag, message);
                    report.empty_lags += 1;
                    IngestSummary::default()
                }
                Err(e) => return Err(e.into()),
            }
        };
        report.accepted += summary.accepted;
        report.dropped += summary.dropped;
        info!(
            "Lag {:>2}: {} observations ingested, {} dropped ({} of {} lag values)",
            lag,
            summary.accepted,
            summary.dropped,
            max_lag - lag + 1,
            max_lag + 1
        );
    }

    Ok((table, report))
}
