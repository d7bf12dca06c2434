//! Season assembly: a flat stream of lagged observations reshaped into
//! region → season → week → lag.

use crate::error::{DataError, Result};
use flu_epidata::epiweek::EpiWeek;
use flu_epidata::observation::Observation;
use flu_epidata::season::SeasonId;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One reported value of a week, `lag` weeks after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaggedValue {
    pub lag: u32,
    pub value: f64,
}

/// Every report received for one epiweek, in ingestion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonWeekSlot {
    pub week: EpiWeek,
    pub data: Vec<LaggedValue>,
}

impl SeasonWeekSlot {
    pub fn empty(week: EpiWeek) -> Self {
        SeasonWeekSlot {
            week,
            data: Vec::new(),
        }
    }

    /// The most current report: the one with the smallest lag.
    pub fn latest(&self) -> Option<&LaggedValue> {
        self.data.iter().min_by_key(|v| v.lag)
    }

    /// The report made exactly `lag` weeks after the fact, if any.
    pub fn at_lag(&self, lag: u32) -> Option<f64> {
        self.data.iter().find(|v| v.lag == lag).map(|v| v.value)
    }
}

/// Week slots of one season for every region.
pub type SeasonSlots = BTreeMap<String, Vec<SeasonWeekSlot>>;

/// How a batch went into the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub accepted: usize,
    pub dropped: usize,
}

/// Region → season → chronologically ordered week slots.
///
/// Built with every expected week already present, so ingestion only ever
/// appends to existing slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionSeasonTable(BTreeMap<String, BTreeMap<SeasonId, Vec<SeasonWeekSlot>>>);

impl RegionSeasonTable {
    /// Pre-populate empty slots for every region and season.
    pub fn build_empty<R: AsRef<str>>(seasons: &[SeasonId], regions: &[R]) -> Self {
        let table = regions
            .iter()
            .map(|region| {
                let by_season = seasons
                    .iter()
                    .map(|season| {
                        let slots = season.weeks().into_iter().map(SeasonWeekSlot::empty).collect();
                        (*season, slots)
                    })
                    .collect();
                (region.as_ref().to_string(), by_season)
            })
            .collect();
        RegionSeasonTable(table)
    }

    /// Append `observation.value` at `lag` to the slot of its region and week.
    pub fn ingest(&mut self, observation: &Observation, lag: u32) -> Result<()> {
        let malformed = |reason| DataError::MalformedObservation {
            region: observation.region.clone(),
            epiweek: observation.epiweek,
            reason,
        };
        if !observation.epiweek.is_valid() {
            return Err(malformed("week number out of range"));
        }
        let seasons = self
            .0
            .get_mut(&observation.region)
            .ok_or_else(|| malformed("unknown region"))?;
        let slots = seasons
            .get_mut(&SeasonId::from_week(observation.epiweek))
            .ok_or_else(|| malformed("season not assembled"))?;
        let slot = slots
            .iter_mut()
            .find(|slot| slot.week == observation.epiweek)
            .ok_or_else(|| malformed("week not in season"))?;
        slot.data.push(LaggedValue {
            lag,
            value: observation.value,
        });
        Ok(())
    }

    /// Ingest a whole batch at one lag. Malformed observations are logged
    /// and dropped; the rest of the batch still goes in.
    pub fn ingest_batch(&mut self, batch: &[Observation], lag: u32) -> IngestSummary {
        self.ingest_each(batch, |_| lag)
    }

    /// Ingest observations that each carry their own lag.
    pub fn ingest_own_lags(&mut self, batch: &[Observation]) -> IngestSummary {
        self.ingest_each(batch, |observation| observation.lag)
    }

    fn ingest_each(
        &mut self,
        batch: &[Observation],
        lag_of: impl Fn(&Observation) -> u32,
    ) -> IngestSummary {
        let mut summary = IngestSummary::default();
        for observation in batch {
            match self.ingest(observation, lag_of(observation)) {
                Ok(()) => summary.accepted += 1,
                Err(e) => {
                    debug!("Dropping observation: {}", e);
                    summary.dropped += 1;
                }
            }
        }
        summary
    }

    pub fn season(&self, region: &str, season: SeasonId) -> Option<&[SeasonWeekSlot]> {
        self.0.get(region)?.get(&season).map(Vec::as_slice)
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Every region's seasons, keyed by season.
    pub fn region_seasons(&self, region: &str) -> Option<&BTreeMap<SeasonId, Vec<SeasonWeekSlot>>> {
        self.0.get(region)
    }

    /// Regroup by season, the layout of the per-season artifact files.
    pub fn into_season_slots(self) -> BTreeMap<SeasonId, SeasonSlots> {
        let mut by_season: BTreeMap<SeasonId, SeasonSlots> = BTreeMap::new();
        for (region, seasons) in self.0 {
            for (season, slots) in seasons {
                by_season.entry(season).or_default().insert(region.clone(), slots);
            }
        }
        by_season
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flu_utils::mmwr::weeks_in_year;

    fn obs(region: &str, epiweek: u32, value: f64) -> Observation {
        Observation {
            region: region.to_string(),
            epiweek: EpiWeek::from_raw(epiweek),
            lag: 0,
            value,
        }
    }

    fn seasons() -> Vec<SeasonId> {
        vec![SeasonId::new(2014), SeasonId::new(2015)]
    }

    #[test]
    fn test_build_empty_table() {
        let table = RegionSeasonTable::build_empty(&seasons(), &["nat", "hhs1"]);
        assert_eq!(table.regions().collect::<Vec<_>>(), vec!["hhs1", "nat"]);
        for season in seasons() {
            let slots = table.season("nat", season).unwrap();
            let expected = (weeks_in_year(season.first_year()) - 30 + 1 + 29) as usize;
            assert_eq!(slots.len(), expected);
            assert!(slots.windows(2).all(|w| w[0].week < w[1].week));
            assert!(slots.iter().all(|s| s.data.is_empty()));
            assert!(slots.iter().all(|s| SeasonId::from_week(s.week) == season));
        }
        assert_eq!(table.season("nat", SeasonId::new(2014)).unwrap().len(), 53);
        assert_eq!(table.season("nat", SeasonId::new(2015)).unwrap().len(), 52);
    }

    #[test]
    fn test_ingest_routes_to_season() {
        let mut table = RegionSeasonTable::build_empty(&seasons(), &["nat"]);
        table.ingest(&obs("nat", 201505, 2.5), 3).unwrap();
        table.ingest(&obs("nat", 201535, 1.5), 3).unwrap();

        let first = table.season("nat", SeasonId::new(2014)).unwrap();
        let slot = first.iter().find(|s| s.week.raw() == 201505).unwrap();
        assert_eq!(slot.data, vec![LaggedValue { lag: 3, value: 2.5 }]);

        let second = table.season("nat", SeasonId::new(2015)).unwrap();
        let slot = second.iter().find(|s| s.week.raw() == 201535).unwrap();
        assert_eq!(slot.at_lag(3), Some(1.5));
    }

    #[test]
    fn test_ingest_malformed_is_dropped() {
        let mut table = RegionSeasonTable::build_empty(&seasons(), &["nat"]);
        let batch = vec![
            obs("nat", 201505, 2.5),
            obs("hhs9", 201505, 2.5),
            obs("nat", 201330, 2.5),
            obs("nat", 201553, 2.5),
            obs("nat", 201560, 2.5),
            obs("nat", 201506, 2.7),
        ];
        let summary = table.ingest_batch(&batch, 0);
        assert_eq!(summary, IngestSummary { accepted: 2, dropped: 4 });
        assert!(matches!(
            table.ingest(&obs("hhs9", 201505, 1.0), 0),
            Err(DataError::MalformedObservation { reason: "unknown region", .. })
        ));
    }

    #[test]
    fn test_ingest_own_lags() {
        let mut table = RegionSeasonTable::build_empty(&seasons(), &["nat"]);
        let mut late = obs("nat", 201505, 2.0);
        late.lag = 4;
        let batch = vec![late, obs("nat", 201505, 2.2), obs("hhs1", 201505, 1.0)];
        let summary = table.ingest_own_lags(&batch);
        assert_eq!(summary, IngestSummary { accepted: 2, dropped: 1 });
        let slot = table.season("nat", SeasonId::new(2014)).unwrap()[28].clone();
        assert_eq!(slot.week.raw(), 201505);
        assert_eq!(slot.latest(), Some(&LaggedValue { lag: 0, value: 2.2 }));
        assert_eq!(slot.at_lag(4), Some(2.0));
    }

    #[test]
    fn test_into_season_slots() {
        let mut table = RegionSeasonTable::build_empty(&seasons(), &["nat", "hhs1"]);
        table.ingest(&obs("hhs1", 201431, 0.9), 0).unwrap();
        let by_season = table.into_season_slots();
        assert_eq!(by_season.len(), 2);
        let first = &by_season[&SeasonId::new(2014)];
        assert_eq!(first.len(), 2);
        assert_eq!(first["hhs1"][1].data[0].value, 0.9);
    }
}
