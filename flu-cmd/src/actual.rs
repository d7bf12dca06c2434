//! `actual`: sweep every lag of the selected seasons and write one
//! `<season>-actual.json` per season.

use anyhow::Context;
use flu_data::artifact::write_json_set;
use flu_data::cache::LagCache;
use flu_data::sweep::sweep;
use flu_epidata::client::{EpidataClient, EpidataConfig};
use flu_epidata::region::Region;
use flu_epidata::season::SeasonId;
use flu_epidata::source::EpidataSource;
use log::info;
use std::path::{Path, PathBuf};

/// File name of a season's lagged observations.
pub fn actual_file_name(season: SeasonId) -> String {
    format!("{season}-actual.json")
}

pub async fn run_actual(
    config: EpidataConfig,
    seasons: &[SeasonId],
    cache_path: &Path,
    out_dir: &Path,
    max_lag: u32,
) -> anyhow::Result<()> {
    let client = EpidataClient::new(config)?;
    let regions = Region::identifiers(&Region::get_region_vector()?);
    let written = write_actual(&client, &regions, seasons, cache_path, out_dir, max_lag).await?;
    info!("Actual data complete. Wrote {} files", written.len());
    Ok(())
}

/// Sweep, persist the cache, then write the season files as one set.
/// Nothing is written when the sweep fails.
pub async fn write_actual<S: EpidataSource>(
    source: &S,
    regions: &[String],
    seasons: &[SeasonId],
    cache_path: &Path,
    out_dir: &Path,
    max_lag: u32,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut cache = LagCache::open(cache_path)
        .with_context(|| format!("Failed to load lag cache {}", cache_path.display()))?;
    info!(
        "Loaded {} cached batches from {}",
        cache.len(),
        cache.path().display()
    );

    let (table, report) = sweep(source, &mut cache, regions, seasons, max_lag)
        .await
        .context("Lag sweep failed")?;
    info!(
        "Sweep done: {} lags from cache, {} fetched ({} empty), {} observations dropped",
        report.lags_from_cache, report.lags_fetched, report.empty_lags, report.dropped
    );
    cache.flush().context("Failed to save lag cache")?;

    let files: Vec<_> = table
        .into_season_slots()
        .into_iter()
        .map(|(season, slots)| (out_dir.join(actual_file_name(season)), slots))
        .collect();
    write_json_set(&files)?;
    Ok(files.into_iter().map(|(path, _)| path).collect())
}
