//! Dashboard data and the selection state the projections are keyed by.
//!
//! `DashboardData` is what the front end loads: one entry per region, in the
//! order of the region fixture (national first), each with its seasons in
//! chronological order. `Selection` holds indices into it.

use flu_data::derived::HistoryEntry;
use flu_data::table::{RegionSeasonTable, SeasonWeekSlot};
use flu_epidata::epiweek::EpiWeek;
use flu_epidata::region::Region;
use flu_epidata::season::SeasonId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Baseline wILI value per region id and season.
pub type Baselines = BTreeMap<String, BTreeMap<SeasonId, f64>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub regions: Vec<RegionData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionData {
    pub id: String,
    pub sub_id: String,
    pub states: Vec<String>,
    pub seasons: Vec<SeasonData>,
    pub history: HistoryEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonData {
    pub id: SeasonId,
    /// Lagged observations of every week of the season
    pub actual: Vec<SeasonWeekSlot>,
    pub baseline: Option<f64>,
    pub models: Vec<ModelData>,
}

/// Who made a forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    pub name: String,
    pub description: String,
    pub url: String,
}

/// Point forecasts issued in one week: 1, 2, 3 and 4 weeks ahead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekPrediction {
    pub week: EpiWeek,
    pub point: [Option<f64>; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelData {
    pub id: String,
    pub meta: ModelMeta,
    pub predictions: Vec<WeekPrediction>,
}

impl DashboardData {
    /// Join region metadata, assembled seasons, finalized history and
    /// baselines. Regions absent from the table are left out; models are
    /// attached separately.
    pub fn assemble(
        regions: &[Region],
        table: &RegionSeasonTable,
        history: &BTreeMap<String, HistoryEntry>,
        baselines: &Baselines,
    ) -> Self {
        let regions = regions
            .iter()
            .filter_map(|region| {
                let seasons = table
                    .region_seasons(&region.id)?
                    .iter()
                    .map(|(season, slots)| SeasonData {
                        id: *season,
                        actual: slots.clone(),
                        baseline: baselines
                            .get(&region.id)
                            .and_then(|by_season| by_season.get(season))
                            .copied(),
                        models: Vec::new(),
                    })
                    .collect();
                Some(RegionData {
                    id: region.id.clone(),
                    sub_id: region.sub_id.clone(),
                    states: region.states.clone(),
                    seasons,
                    history: history.get(&region.id).cloned().unwrap_or_default(),
                })
            })
            .collect();
        DashboardData { regions }
    }

    pub fn region(&self, idx: usize) -> Option<&RegionData> {
        self.regions.get(idx)
    }

    pub fn season(&self, region: usize, season: usize) -> Option<&SeasonData> {
        self.region(region)?.seasons.get(season)
    }

    /// Attach a model's forecasts to a region's season. False when either is unknown.
    pub fn add_model(&mut self, region_id: &str, season: SeasonId, model: ModelData) -> bool {
        let target = self
            .regions
            .iter_mut()
            .find(|r| r.id == region_id)
            .and_then(|r| r.seasons.iter_mut().find(|s| s.id == season));
        match target {
            Some(season) => {
                season.models.push(model);
                true
            }
            None => false,
        }
    }
}

/// The one detail panel on display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    #[default]
    None,
    TimeChart,
    DistributionChart,
    ScoresPanel,
}

/// Week under the cursor of the time chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSelection {
    pub idx: usize,
    pub name: Option<String>,
}

/// Current selection, as indices into [`DashboardData`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub region: usize,
    pub season: usize,
    pub score: usize,
    pub choropleth_relative: bool,
    pub panel: Panel,
    pub week: WeekSelection,
}

impl Selection {
    /// Select a region; selecting the current one again falls back to region 0.
    pub fn update_selected_region(&mut self, region: usize) {
        self.region = if self.region == region { 0 } else { region };
    }

    pub fn update_selected_season(&mut self, season: usize) {
        self.season = season;
    }

    pub fn update_selected_score(&mut self, score: usize) {
        self.score = score;
    }

    pub fn toggle_relative(&mut self) {
        self.choropleth_relative = !self.choropleth_relative;
    }

    pub fn display(&mut self, panel: Panel) {
        self.panel = panel;
    }

    pub fn show_time_chart(&self) -> bool {
        self.panel == Panel::TimeChart
    }

    pub fn show_distribution_chart(&self) -> bool {
        self.panel == Panel::DistributionChart
    }

    pub fn show_scores_panel(&self) -> bool {
        self.panel == Panel::ScoresPanel
    }

    pub fn update_selected_week(&mut self, idx: usize, name: impl Into<String>) {
        self.week = WeekSelection {
            idx,
            name: Some(name.into()),
        };
    }

    pub fn selected_week_name(&self) -> &str {
        self.week.name.as_deref().unwrap_or("NA")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flu_epidata::observation::Observation;

    pub(crate) fn sample_regions() -> Vec<Region> {
        Region::get_region_vector().unwrap()[..3].to_vec()
    }

    /// nat, hhs1 and hhs2 over 2014-2015 and 2015-2016, every week reported
    /// at lag 0 as `region index + 1 + week index / 100`.
    pub(crate) fn sample_data() -> DashboardData {
        let regions = sample_regions();
        let seasons = [SeasonId::new(2014), SeasonId::new(2015)];
        let ids = Region::identifiers(&regions);
        let mut table = RegionSeasonTable::build_empty(&seasons, &ids);
        for (r, id) in ids.iter().enumerate() {
            for season in &seasons {
                let batch: Vec<Observation> = season
                    .weeks()
                    .into_iter()
                    .enumerate()
                    .map(|(w, epiweek)| Observation {
                        region: id.clone(),
                        epiweek,
                        lag: 0,
                        value: r as f64 + 1.0 + w as f64 / 100.0,
                    })
                    .collect();
                table.ingest_batch(&batch, 0);
            }
        }
        let mut baselines = Baselines::new();
        for id in &ids {
            baselines
                .entry(id.clone())
                .or_default()
                .insert(seasons[0], 2.0);
        }
        DashboardData::assemble(&regions, &table, &BTreeMap::new(), &baselines)
    }

    #[test]
    fn test_assemble_orders_regions_like_fixture() {
        let data = sample_data();
        let ids: Vec<&str> = data.regions.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["nat", "hhs1", "hhs2"]);
        let nat = &data.regions[0];
        assert!(nat.states.is_empty());
        assert_eq!(nat.seasons.len(), 2);
        assert_eq!(nat.seasons[0].id, SeasonId::new(2014));
        assert_eq!(nat.seasons[0].actual.len(), 53);
        assert_eq!(nat.seasons[0].baseline, Some(2.0));
        assert_eq!(nat.seasons[1].baseline, None);
        assert!(data.regions[1].states.contains(&"MA".to_string()));
    }

    #[test]
    fn test_add_model() {
        let mut data = sample_data();
        let model = ModelData {
            id: "delphi-stat".to_string(),
            meta: ModelMeta::default(),
            predictions: Vec::new(),
        };
        assert!(data.add_model("hhs1", SeasonId::new(2015), model.clone()));
        assert!(!data.add_model("hhs9", SeasonId::new(2015), model.clone()));
        assert!(!data.add_model("hhs1", SeasonId::new(2010), model));
        assert_eq!(data.season(1, 1).unwrap().models.len(), 1);
    }

    #[test]
    fn test_region_reselection_deselects() {
        let mut selection = Selection::default();
        selection.update_selected_region(3);
        assert_eq!(selection.region, 3);
        selection.update_selected_region(3);
        assert_eq!(selection.region, 0);
        selection.update_selected_region(2);
        selection.update_selected_region(5);
        assert_eq!(selection.region, 5);
    }

    #[test]
    fn test_panels_are_exclusive() {
        let mut selection = Selection::default();
        assert!(!selection.show_time_chart());
        selection.display(Panel::TimeChart);
        assert!(selection.show_time_chart());
        selection.display(Panel::ScoresPanel);
        assert!(!selection.show_time_chart());
        assert!(!selection.show_distribution_chart());
        assert!(selection.show_scores_panel());
    }

    #[test]
    fn test_simple_setters() {
        let mut selection = Selection::default();
        selection.update_selected_season(1);
        selection.update_selected_score(1);
        selection.toggle_relative();
        assert_eq!((selection.season, selection.score), (1, 1));
        assert!(selection.choropleth_relative);
        selection.toggle_relative();
        assert!(!selection.choropleth_relative);
    }

    #[test]
    fn test_week_name() {
        let mut selection = Selection::default();
        assert_eq!(selection.selected_week_name(), "NA");
        selection.update_selected_week(4, "201434");
        assert_eq!(selection.selected_week_name(), "201434");
        assert_eq!(selection.week.idx, 4);
    }
}
