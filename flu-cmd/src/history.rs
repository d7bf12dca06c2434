//! `history`: finalized single-valued series of past seasons, written to
//! `history.json`.

use anyhow::Context;
use flu_data::artifact::write_json;
use flu_data::derived::{finalized_history, HistoryEntry};
use flu_data::table::RegionSeasonTable;
use flu_epidata::client::{EpidataClient, EpidataConfig};
use flu_epidata::region::Region;
use flu_epidata::season::SeasonId;
use flu_epidata::source::EpidataSource;
use flu_epidata::EpidataError;
use log::{info, warn};
use std::collections::BTreeMap;
use std::path::Path;

pub async fn run_history(
    config: EpidataConfig,
    seasons: &[SeasonId],
    out: &Path,
) -> anyhow::Result<()> {
    let client = EpidataClient::new(config)?;
    let regions = Region::identifiers(&Region::get_region_vector()?);
    let history = build_history(&client, &regions, seasons).await?;
    write_json(out, &history)?;
    Ok(())
}

/// Latest issue of every season, one request per season. Seasons the API
/// has nothing for are skipped; incomplete seasons are left out of the result.
pub async fn build_history<S: EpidataSource>(
    source: &S,
    regions: &[String],
    seasons: &[SeasonId],
) -> anyhow::Result<BTreeMap<String, HistoryEntry>> {
    let mut table = RegionSeasonTable::build_empty(seasons, regions);
    for season in seasons {
        info!("Fetching history for {}", season);
        let batch = match source.fetch(regions, season.range(), None).await {
            Ok(batch) => batch,
            Err(EpidataError::NoResults(message)) => {
                warn!("No history for {}: {}", season, message);
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to fetch history for {season}"))
            }
        };
        let summary = table.ingest_own_lags(&batch);
        info!(
            "{}: {} observations, {} dropped",
            season, summary.accepted, summary.dropped
        );
    }
    Ok(finalized_history(&table))
}
