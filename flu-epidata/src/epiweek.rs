use crate::error::{EpidataError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Year marking weeks that were synthesized rather than observed.
pub const SYNTHETIC_YEAR: u32 = 1000;

/// An MMWR epidemiological week encoded as `year * 100 + week`, e.g. `201505`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpiWeek(u32);

impl EpiWeek {
    /// Build an epiweek, rejecting week numbers outside 1..=53.
    pub fn new(year: u32, week: u32) -> Result<Self> {
        if !(1..=53).contains(&week) {
            return Err(EpidataError::InvalidEpiWeek(format!("{year}w{week}")));
        }
        Ok(EpiWeek(year * 100 + week))
    }

    /// Wrap an already encoded value without validation.
    pub const fn from_raw(raw: u32) -> Self {
        EpiWeek(raw)
    }

    /// Placeholder week 53 inserted when aligning a 52-week season with a 53-week one.
    pub const fn synthetic_week_53() -> Self {
        EpiWeek(SYNTHETIC_YEAR * 100 + 53)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn year(self) -> u32 {
        self.0 / 100
    }

    pub const fn week(self) -> u32 {
        self.0 % 100
    }

    pub const fn is_synthetic(self) -> bool {
        self.year() == SYNTHETIC_YEAR
    }

    /// True when the week component is a possible MMWR week number.
    pub fn is_valid(self) -> bool {
        (1..=53).contains(&self.week())
    }
}

impl fmt::Display for EpiWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EpiWeek {
    type Err = EpidataError;

    fn from_str(s: &str) -> Result<Self> {
        let raw: u32 = s
            .trim()
            .parse()
            .map_err(|_| EpidataError::InvalidEpiWeek(s.to_string()))?;
        let week = EpiWeek(raw);
        if week.is_valid() {
            Ok(week)
        } else {
            Err(EpidataError::InvalidEpiWeek(s.to_string()))
        }
    }
}

/// An inclusive epiweek range. Construction orders the bounds so `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EpiRange {
    from: EpiWeek,
    to: EpiWeek,
}

impl EpiRange {
    pub fn new(from: EpiWeek, to: EpiWeek) -> Self {
        if to < from {
            EpiRange { from: to, to: from }
        } else {
            EpiRange { from, to }
        }
    }

    pub fn from(&self) -> EpiWeek {
        self.from
    }

    pub fn to(&self) -> EpiWeek {
        self.to
    }

    pub fn contains(&self, week: EpiWeek) -> bool {
        self.from <= week && week <= self.to
    }

    /// Key used to index cached batches, identical to the wire form: "201430-201529".
    pub fn range_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EpiRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// One item of an epiweek list parameter: a single week or a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EpiweekSpec {
    Single(EpiWeek),
    Range(EpiRange),
}

impl fmt::Display for EpiweekSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpiweekSpec::Single(week) => write!(f, "{week}"),
            EpiweekSpec::Range(range) => write!(f, "{range}"),
        }
    }
}

impl From<EpiWeek> for EpiweekSpec {
    fn from(value: EpiWeek) -> Self {
        EpiweekSpec::Single(value)
    }
}

impl From<EpiRange> for EpiweekSpec {
    fn from(value: EpiRange) -> Self {
        EpiweekSpec::Range(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epiweek_components() {
        let week = EpiWeek::new(2015, 5).unwrap();
        assert_eq!(week.raw(), 201505);
        assert_eq!(week.year(), 2015);
        assert_eq!(week.week(), 5);
        assert!(!week.is_synthetic());
        assert!(EpiWeek::new(2015, 54).is_err());
        assert!(EpiWeek::new(2015, 0).is_err());
    }

    #[test]
    fn test_synthetic_week() {
        let week = EpiWeek::synthetic_week_53();
        assert_eq!(week.raw(), 100053);
        assert_eq!(week.week(), 53);
        assert!(week.is_synthetic());
    }

    #[test]
    fn test_parse_epiweek() {
        assert_eq!("201430".parse::<EpiWeek>().unwrap().raw(), 201430);
        assert!("201460".parse::<EpiWeek>().is_err());
        assert!("abc".parse::<EpiWeek>().is_err());
    }

    #[test]
    fn test_range_swaps_bounds() {
        let a = EpiWeek::from_raw(201529);
        let b = EpiWeek::from_raw(201430);
        let range = EpiRange::new(a, b);
        assert_eq!(range.from(), b);
        assert_eq!(range.to(), a);
        assert_eq!(range.to_string(), "201430-201529");
        assert!(range.contains(EpiWeek::from_raw(201505)));
        assert!(!range.contains(EpiWeek::from_raw(201530)));
    }

    #[test]
    fn test_spec_display() {
        let single: EpiweekSpec = EpiWeek::from_raw(201501).into();
        assert_eq!(single.to_string(), "201501");
        let range: EpiweekSpec =
            EpiRange::new(EpiWeek::from_raw(201401), EpiWeek::from_raw(201410)).into();
        assert_eq!(range.to_string(), "201401-201410");
    }
}
