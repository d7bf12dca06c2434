//! Which seasons a command works on.

use anyhow::Context;
use chrono::Utc;
use flu_epidata::season::SeasonId;
use log::debug;
use std::fs;
use std::path::Path;

/// Seasons named by the data directory's subdirectories ("2016-2017/"),
/// sorted. Entries that are not season ids are ignored.
pub fn discover_seasons(data_dir: &Path) -> anyhow::Result<Vec<SeasonId>> {
    let entries = fs::read_dir(data_dir)
        .with_context(|| format!("Failed to list data directory {}", data_dir.display()))?;
    let mut seasons = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        match name.parse::<SeasonId>() {
            Ok(season) => seasons.push(season),
            Err(_) => debug!("Ignoring {} in {}", name, data_dir.display()),
        }
    }
    seasons.sort();
    Ok(seasons)
}

/// Explicit seasons win, then the data directory, then the season of today.
pub fn resolve_seasons(
    seasons: &[SeasonId],
    data_dir: Option<&Path>,
) -> anyhow::Result<Vec<SeasonId>> {
    if !seasons.is_empty() {
        let mut seasons = seasons.to_vec();
        seasons.sort();
        seasons.dedup();
        return Ok(seasons);
    }
    if let Some(dir) = data_dir {
        let found = discover_seasons(dir)?;
        anyhow::ensure!(!found.is_empty(), "No season directories in {}", dir.display());
        return Ok(found);
    }
    let today = Utc::now().date_naive();
    let current = SeasonId::containing(today)
        .with_context(|| format!("No MMWR season contains {}", today))?;
    Ok(vec![current])
}
