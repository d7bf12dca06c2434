use crate::epiweek::{EpiRange, EpiWeek};
use crate::error::{EpidataError, Result};
use chrono::NaiveDate;
use flu_utils::mmwr::{epiweek_for_date, weeks_in_year};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// First MMWR week of a flu season, in the season's first year.
pub const SEASON_START_WEEK: u32 = 30;

/// Last MMWR week of a flu season, in the season's second year.
pub const SEASON_END_WEEK: u32 = 29;

/// A flu season runs from MMWR week 30 of one year through week 29 of the
/// next and is written "2014-2015".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeasonId {
    first_year: u32,
}

impl SeasonId {
    pub const fn new(first_year: u32) -> Self {
        SeasonId { first_year }
    }

    pub const fn first_year(&self) -> u32 {
        self.first_year
    }

    pub const fn second_year(&self) -> u32 {
        self.first_year + 1
    }

    /// Season an epiweek belongs to: weeks after 29 open a season, the rest close one.
    pub fn from_week(week: EpiWeek) -> Self {
        let year = week.year();
        if week.week() > SEASON_END_WEEK {
            SeasonId::new(year)
        } else {
            SeasonId::new(year.saturating_sub(1))
        }
    }

    /// Season containing a calendar date.
    pub fn containing(date: NaiveDate) -> Option<Self> {
        let (year, week) = epiweek_for_date(date)?;
        Some(SeasonId::from_week(EpiWeek::from_raw(year * 100 + week)))
    }

    /// Highest week number of the first year: 52 or 53.
    pub fn first_year_max_week(&self) -> u32 {
        weeks_in_year(self.first_year)
    }

    /// Every week of the season in chronological order.
    pub fn weeks(&self) -> Vec<EpiWeek> {
        let first = (SEASON_START_WEEK..=self.first_year_max_week())
            .map(|week| EpiWeek::from_raw(self.first_year * 100 + week));
        let second = (1..=SEASON_END_WEEK)
            .map(|week| EpiWeek::from_raw(self.second_year() * 100 + week));
        first.chain(second).collect()
    }

    pub fn week_count(&self) -> usize {
        (self.first_year_max_week() - SEASON_START_WEEK + 1 + SEASON_END_WEEK) as usize
    }

    pub fn start(&self) -> EpiWeek {
        EpiWeek::from_raw(self.first_year * 100 + SEASON_START_WEEK)
    }

    pub fn end(&self) -> EpiWeek {
        EpiWeek::from_raw(self.second_year() * 100 + SEASON_END_WEEK)
    }

    pub fn range(&self) -> EpiRange {
        EpiRange::new(self.start(), self.end())
    }

    pub fn contains(&self, week: EpiWeek) -> bool {
        week.is_valid() && SeasonId::from_week(week) == *self && self.range().contains(week)
    }
}

/// Smallest epiweek range covering every season: first year's week 30
/// through last year's week 29. `None` for an empty list.
pub fn request_window(seasons: &[SeasonId]) -> Option<EpiRange> {
    let first_year = seasons.iter().map(SeasonId::first_year).min()?;
    let last_year = seasons.iter().map(SeasonId::second_year).max()?;
    Some(EpiRange::new(
        EpiWeek::from_raw(first_year * 100 + SEASON_START_WEEK),
        EpiWeek::from_raw(last_year * 100 + SEASON_END_WEEK),
    ))
}

impl fmt::Display for SeasonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first_year, self.second_year())
    }
}

impl FromStr for SeasonId {
    type Err = EpidataError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || EpidataError::InvalidSeason(s.to_string());
        let (first, second) = s.trim().split_once('-').ok_or_else(invalid)?;
        if first.len() != 4 || second.len() != 4 {
            return Err(invalid());
        }
        let first: u32 = first.parse().map_err(|_| invalid())?;
        let second: u32 = second.parse().map_err(|_| invalid())?;
        if second != first + 1 {
            return Err(invalid());
        }
        Ok(SeasonId::new(first))
    }
}

impl Serialize for SeasonId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SeasonId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
