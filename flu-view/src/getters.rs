//! Read-only projections of the dashboard data for the current selection.

use crate::state::{DashboardData, ModelData, Selection};
use flu_data::derived::{
    baseline_scale, choropleth_range, max_lag_series, trim_history, ValueRange, WeekValue,
};
use flu_data::table::SeasonWeekSlot;
use flu_epidata::region::NATIONAL_ID;
use flu_epidata::season::SeasonId;
use serde::Serialize;

/// Names of the choropleths built from observed data.
pub const ACTUAL_CHOROPLETHS: [&str; 2] = ["Actual Weighted ILI (%)", "Relative Weighted ILI (%)"];

/// Color scale of a choropleth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    Sequential,
    Diverging,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethRegion {
    pub region: String,
    pub states: Vec<String>,
    pub value: Vec<WeekValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethData {
    pub data: Vec<ChoroplethRegion>,
    #[serde(rename = "type")]
    pub scale: ScaleType,
    /// Appended to every displayed value
    pub suffix: &'static str,
    pub range: Option<ValueRange>,
}

/// An earlier season overlaid on the time chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySeries {
    pub id: SeasonId,
    pub actual: Vec<WeekValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeChartData {
    pub region: String,
    pub observed: Vec<SeasonWeekSlot>,
    pub actual: Vec<WeekValue>,
    pub baseline: Option<f64>,
    pub models: Vec<ModelData>,
    pub history: Vec<HistorySeries>,
}

/// Season ids of the selected region.
pub fn seasons(data: &DashboardData, selection: &Selection) -> Vec<SeasonId> {
    data.region(selection.region)
        .map(|r| r.seasons.iter().map(|s| s.id).collect())
        .unwrap_or_default()
}

/// Submission ids of every region.
pub fn regions(data: &DashboardData) -> Vec<&str> {
    data.regions.iter().map(|r| r.sub_id.as_str()).collect()
}

/// Model ids of the selected region and season.
pub fn models<'a>(data: &'a DashboardData, selection: &Selection) -> Vec<&'a str> {
    data.season(selection.region, selection.season)
        .map(|s| s.models.iter().map(|m| m.id.as_str()).collect())
        .unwrap_or_default()
}

pub fn choropleths() -> [&'static str; 2] {
    ACTUAL_CHOROPLETHS
}

/// Latest estimates of the selected season for every non-national region,
/// with the color range over all regions and seasons.
pub fn choropleth_data(data: &DashboardData, selection: &Selection) -> ChoroplethData {
    let relative = selection.choropleth_relative;
    let regions = data
        .regions
        .iter()
        .filter(|r| r.id != NATIONAL_ID)
        .filter_map(|r| {
            let season = r.seasons.get(selection.season)?;
            let mut value = max_lag_series(&season.actual);
            if relative {
                value = baseline_scale(&value, season.baseline);
            }
            Some(ChoroplethRegion {
                region: r.sub_id.clone(),
                states: r.states.clone(),
                value,
            })
        })
        .collect();

    let range = choropleth_range(
        data.regions
            .iter()
            .flat_map(|r| r.seasons.iter())
            .map(|s| (s.actual.as_slice(), s.baseline)),
        relative,
    );

    ChoroplethData {
        data: regions,
        scale: if relative {
            ScaleType::Diverging
        } else {
            ScaleType::Sequential
        },
        suffix: if relative { " % (baseline)" } else { " %" },
        range,
    }
}

/// Everything the time chart shows for the selected region and season.
///
/// History holds the finalized seasons followed by every earlier season of
/// the data, each aligned to the selected season's week count.
pub fn time_chart_data(data: &DashboardData, selection: &Selection) -> Option<TimeChartData> {
    let region = data.region(selection.region)?;
    let season = region.seasons.get(selection.season)?;
    let week_count = season.actual.len();

    let finalized = region.history.iter().map(|(id, series)| HistorySeries {
        id: *id,
        actual: trim_history(series, week_count),
    });
    let earlier = region.seasons[..selection.season]
        .iter()
        .map(|s| HistorySeries {
            id: s.id,
            actual: trim_history(&max_lag_series(&s.actual), week_count),
        });

    Some(TimeChartData {
        region: region.sub_id.clone(),
        observed: season.actual.clone(),
        actual: max_lag_series(&season.actual),
        baseline: season.baseline,
        models: season.models.clone(),
        history: finalized.chain(earlier).collect(),
    })
}
