//! `metadata`: region metadata, available seasons and the generation time.

use crate::seasons::discover_seasons;
use chrono::{DateTime, Utc};
use flu_data::artifact::write_json;
use flu_epidata::region::Region;
use flu_epidata::season::SeasonId;
use flu_utils::format::update_time;
use log::warn;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub region_data: Vec<Region>,
    pub season_ids: Vec<SeasonId>,
    pub update_time: String,
}

impl Metadata {
    pub fn new(region_data: Vec<Region>, season_ids: Vec<SeasonId>, at: &DateTime<Utc>) -> Self {
        Metadata {
            region_data,
            season_ids,
            update_time: update_time(at),
        }
    }
}

pub fn run_metadata(data_dir: &Path, out: &Path) -> anyhow::Result<()> {
    let seasons = discover_seasons(data_dir)?;
    if seasons.is_empty() {
        warn!("No season directories found in {}", data_dir.display());
    }
    let metadata = Metadata::new(Region::get_region_vector()?, seasons, &Utc::now());
    write_json(out, &metadata)?;
    Ok(())
}
