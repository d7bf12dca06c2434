//! Shared utility functions for FluSight crates.

/// MMWR (CDC epidemiological) calendar helpers.
///
/// MMWR weeks start on Sunday. Week 1 of a year is the week containing
/// January 4, so a year has either 52 or 53 weeks.
pub mod mmwr {
    use chrono::{Datelike, Days, NaiveDate};

    /// The Sunday that starts MMWR week 1 of `year`.
    pub fn first_day_of_year(year: i32) -> Option<NaiveDate> {
        let jan4 = NaiveDate::from_ymd_opt(year, 1, 4)?;
        jan4.checked_sub_days(Days::new(u64::from(jan4.weekday().num_days_from_sunday())))
    }

    /// Number of MMWR weeks in `year` (52 or 53).
    pub fn weeks_in_year(year: u32) -> u32 {
        let year = year as i32;
        match (first_day_of_year(year), first_day_of_year(year + 1)) {
            (Some(start), Some(next)) => ((next - start).num_days() / 7) as u32,
            _ => 52,
        }
    }

    /// Map a calendar date to its MMWR `(year, week)`.
    ///
    /// Early January dates may belong to the last week of the previous
    /// MMWR year, late December dates to week 1 of the next.
    pub fn epiweek_for_date(date: NaiveDate) -> Option<(u32, u32)> {
        let mut year = date.year();
        let mut start = first_day_of_year(year)?;
        if date < start {
            year -= 1;
            start = first_day_of_year(year)?;
        } else {
            let next = first_day_of_year(year + 1)?;
            if date >= next {
                year += 1;
                start = next;
            }
        }
        let week = (date - start).num_days() / 7 + 1;
        Some((u32::try_from(year).ok()?, week as u32))
    }

}

/// Formatting helpers for generated metadata.
pub mod format {
    use chrono::{DateTime, Datelike, Utc};

    /// English ordinal for a day of the month: 1st, 2nd, 3rd, 11th, 22nd...
    pub fn ordinal(n: u32) -> String {
        let suffix = match (n % 10, n % 100) {
            (_, 11..=13) => "th",
            (1, _) => "st",
            (2, _) => "nd",
            (3, _) => "rd",
            _ => "th",
        };
        format!("{n}{suffix}")
    }

    /// Format an update timestamp as "October 16th 2026, 03:04:05" (12-hour clock).
    pub fn update_time(at: &DateTime<Utc>) -> String {
        format!(
            "{} {} {}",
            at.format("%B"),
            ordinal(at.day()),
            at.format("%Y, %I:%M:%S")
        )
    }

}
