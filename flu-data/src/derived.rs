//! Views derived from assembled seasons: the latest-estimate series,
//! baseline-relative scaling, 52/53-week alignment and color scale ranges.

use crate::table::{RegionSeasonTable, SeasonWeekSlot};
use flu_epidata::epiweek::EpiWeek;
use flu_epidata::season::SeasonId;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel for a week without a usable value.
pub const MISSING: f64 = -1.0;

/// Offset of week 53 in a season starting at week 30 (weeks 30..=52 come first).
pub const WEEK_53_INDEX: usize = 23;

/// A single value per week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekValue {
    pub week: EpiWeek,
    pub data: f64,
}

impl WeekValue {
    pub fn is_missing(&self) -> bool {
        self.data == MISSING
    }
}

/// Finalized single-valued series per season.
pub type HistoryEntry = BTreeMap<SeasonId, Vec<WeekValue>>;

/// Inclusive value range for a color scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

/// Most current estimate of every week; [`MISSING`] for weeks without reports.
///
/// Lags are ingested from the highest down to 0, so the most current estimate
/// is the report with the smallest lag rather than the first one pushed.
pub fn max_lag_series(slots: &[SeasonWeekSlot]) -> Vec<WeekValue> {
    slots
        .iter()
        .map(|slot| WeekValue {
            week: slot.week,
            data: slot.latest().map_or(MISSING, |v| v.value),
        })
        .collect()
}

/// A baseline values can be scaled by: present, finite and non-zero.
pub fn usable_baseline(baseline: Option<f64>) -> Option<f64> {
    baseline.filter(|b| *b != 0.0 && b.is_finite())
}

/// Percent deviation from `baseline`; [`MISSING`] everywhere when there is no
/// usable baseline.
pub fn baseline_scale(series: &[WeekValue], baseline: Option<f64>) -> Vec<WeekValue> {
    let baseline = usable_baseline(baseline);
    series
        .iter()
        .map(|d| WeekValue {
            week: d.week,
            data: baseline.map_or(MISSING, |b| ((d.data / b) - 1.0) * 100.0),
        })
        .collect()
}

/// Align a season to `target_week_count` weeks for overlaying.
///
/// A 52-week target drops any week 53. A 53-week target expands a 52-week
/// series with a synthetic week 53 (year 1000) averaging its neighbours.
pub fn trim_history(series: &[WeekValue], target_week_count: usize) -> Vec<WeekValue> {
    if target_week_count == 52 {
        return series.iter().filter(|d| d.week.week() != 53).copied().collect();
    }
    let mut trimmed = series.to_vec();
    if trimmed.len() == 52 {
        let before = trimmed[WEEK_53_INDEX - 1].data;
        let after = trimmed[WEEK_53_INDEX].data;
        trimmed.insert(
            WEEK_53_INDEX,
            WeekValue {
                week: EpiWeek::synthetic_week_53(),
                data: (before + after) / 2.0,
            },
        );
    }
    trimmed
}

/// Global min and max over every season's latest estimates, optionally in
/// percent of the season baseline. `None` when no season has any data.
pub fn choropleth_range<'a, I>(seasons: I, relative: bool) -> Option<ValueRange>
where
    I: IntoIterator<Item = (&'a [SeasonWeekSlot], Option<f64>)>,
{
    let mut range: Option<ValueRange> = None;
    for (slots, baseline) in seasons {
        let actual: Vec<WeekValue> = max_lag_series(slots)
            .into_iter()
            .filter(|d| !d.is_missing())
            .collect();
        let values = if relative {
            if usable_baseline(baseline).is_none() {
                continue;
            }
            baseline_scale(&actual, baseline)
        } else {
            actual
        };
        for value in values.iter().map(|d| d.data) {
            range = Some(match range {
                Some(r) => ValueRange {
                    min: r.min.min(value),
                    max: r.max.max(value),
                },
                None => ValueRange {
                    min: value,
                    max: value,
                },
            });
        }
    }
    range
}

/// Finalized history of every region: seasons where each week has a value,
/// as their latest-estimate series. Incomplete seasons are skipped.
pub fn finalized_history(table: &RegionSeasonTable) -> BTreeMap<String, HistoryEntry> {
    let mut history = BTreeMap::new();
    for region in table.regions() {
        let Some(seasons) = table.region_seasons(region) else {
            continue;
        };
        let mut entry = HistoryEntry::new();
        for (season, slots) in seasons {
            let series = max_lag_series(slots);
            let missing = series.iter().filter(|d| d.is_missing()).count();
            if missing > 0 {
                info!(
                    "Skipping {} {} from history: {} weeks without data",
                    region, season, missing
                );
                continue;
            }
            entry.insert(*season, series);
        }
        history.insert(region.to_string(), entry);
    }
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::LaggedValue;
    use flu_epidata::observation::Observation;

    fn wv(week: u32, data: f64) -> WeekValue {
        WeekValue {
            week: EpiWeek::from_raw(week),
            data,
        }
    }

    fn series(season: SeasonId, f: impl Fn(usize) -> f64) -> Vec<WeekValue> {
        season
            .weeks()
            .into_iter()
            .enumerate()
            .map(|(i, week)| WeekValue { week, data: f(i) })
            .collect()
    }

    #[test]
    fn test_max_lag_picks_lowest_lag() {
        let slots = vec![
            SeasonWeekSlot {
                week: EpiWeek::from_raw(201430),
                data: vec![
                    LaggedValue { lag: 51, value: 1.0 },
                    LaggedValue { lag: 1, value: 1.4 },
                    LaggedValue { lag: 0, value: 1.5 },
                ],
            },
            SeasonWeekSlot::empty(EpiWeek::from_raw(201431)),
            SeasonWeekSlot {
                week: EpiWeek::from_raw(201432),
                data: vec![LaggedValue { lag: 7, value: 2.0 }],
            },
        ];
        assert_eq!(
            max_lag_series(&slots),
            vec![wv(201430, 1.5), wv(201431, MISSING), wv(201432, 2.0)]
        );
    }

    #[test]
    fn test_baseline_scale() {
        let scaled = baseline_scale(&[wv(1, 120.0)], Some(100.0));
        assert_eq!(scaled.len(), 1);
        assert_eq!(scaled[0].week, EpiWeek::from_raw(1));
        assert!((scaled[0].data - 20.0).abs() < 1e-9);
        assert_eq!(baseline_scale(&[wv(1, 120.0)], Some(0.0)), vec![wv(1, MISSING)]);
        assert_eq!(baseline_scale(&[wv(1, 120.0)], None), vec![wv(1, MISSING)]);
        assert_eq!(
            baseline_scale(&[wv(1, 120.0)], Some(f64::NAN)),
            vec![wv(1, MISSING)]
        );
    }

    #[test]
    fn test_trim_history_to_52() {
        let long = series(SeasonId::new(2014), |i| i as f64);
        assert_eq!(long.len(), 53);
        let trimmed = trim_history(&long, 52);
        assert_eq!(trimmed.len(), 52);
        assert!(trimmed.iter().all(|d| d.week.week() != 53));

        let short = series(SeasonId::new(2015), |i| i as f64);
        assert_eq!(trim_history(&short, 52), short);
    }

    #[test]
    fn test_trim_history_to_53() {
        let short = series(SeasonId::new(2015), |i| i as f64 * 2.0);
        let expanded = trim_history(&short, 53);
        assert_eq!(expanded.len(), 53);
        assert_eq!(expanded[WEEK_53_INDEX].week.raw(), 100053);
        assert!(expanded[WEEK_53_INDEX].week.is_synthetic());
        assert_eq!(
            expanded[WEEK_53_INDEX].data,
            (short[22].data + short[23].data) / 2.0
        );
        assert_eq!(expanded[22], short[22]);
        assert_eq!(expanded[24], short[23]);
        // the synthetic week sits between week 52 and week 1
        assert_eq!(expanded[22].week.week(), 52);
        assert_eq!(expanded[24].week.week(), 1);

        let long = series(SeasonId::new(2014), |i| i as f64);
        assert_eq!(trim_history(&long, 53), long);
    }

    fn season_slots(values: &[Option<f64>]) -> Vec<SeasonWeekSlot> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| SeasonWeekSlot {
                week: EpiWeek::from_raw(201430 + i as u32),
                data: v
                    .map(|value| vec![LaggedValue { lag: 0, value }])
                    .unwrap_or_default(),
            })
            .collect()
    }

    #[test]
    fn test_choropleth_range() {
        let a = season_slots(&[Some(1.0), None, Some(4.0)]);
        let b = season_slots(&[Some(2.0), Some(6.0)]);
        let range = choropleth_range([(a.as_slice(), Some(2.0)), (b.as_slice(), Some(4.0))], false);
        assert_eq!(range, Some(ValueRange { min: 1.0, max: 6.0 }));

        let range = choropleth_range([(a.as_slice(), Some(2.0)), (b.as_slice(), Some(4.0))], true);
        assert_eq!(range, Some(ValueRange { min: -50.0, max: 100.0 }));
    }

    #[test]
    fn test_choropleth_range_all_missing() {
        let a = season_slots(&[None, None]);
        let b = season_slots(&[]);
        assert_eq!(choropleth_range([(a.as_slice(), Some(1.0)), (b.as_slice(), None)], false), None);
        let c = season_slots(&[Some(3.0)]);
        assert_eq!(choropleth_range([(c.as_slice(), None)], true), None);
    }

    #[test]
    fn test_choropleth_range_skips_unusable_baselines() {
        let a = season_slots(&[Some(1.0), Some(4.0)]);
        let b = season_slots(&[Some(9.0)]);
        let seasons = [
            (a.as_slice(), Some(2.0)),
            (b.as_slice(), Some(f64::INFINITY)),
            (b.as_slice(), Some(f64::NAN)),
            (b.as_slice(), Some(0.0)),
        ];
        assert_eq!(
            choropleth_range(seasons, true),
            Some(ValueRange { min: -50.0, max: 100.0 })
        );
        assert_eq!(
            choropleth_range([(b.as_slice(), Some(f64::INFINITY))], true),
            None
        );
    }

    #[test]
    fn test_finalized_history_skips_incomplete() {
        let seasons = [SeasonId::new(2014), SeasonId::new(2015)];
        let mut table = RegionSeasonTable::build_empty(&seasons, &["nat"]);
        let batch: Vec<Observation> = seasons[1]
            .weeks()
            .into_iter()
            .map(|epiweek| Observation {
                region: "nat".to_string(),
                epiweek,
                lag: 2,
                value: 1.25,
            })
            .collect();
        table.ingest_own_lags(&batch);
        table.ingest_own_lags(&batch[..3]);
        let history = finalized_history(&table);
        let nat = &history["nat"];
        assert_eq!(nat.len(), 1);
        assert_eq!(nat[&seasons[1]].len(), 52);
        assert!(nat[&seasons[1]].iter().all(|d| d.data == 1.25));
    }
}
