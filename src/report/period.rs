//! Relative period presets and calendar month handling for reports.

use std::str::FromStr;

use serde::Deserialize;
use time::{Date, Duration, Month};

use crate::Error;

/// Relative date-range presets for filtering transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Today only.
    Day,
    /// The last seven days, inclusive of today.
    Week,
    /// The current calendar month.
    Month,
    /// No date restriction.
    All,
}

impl Period {
    /// The inclusive date range for the period, anchored on `today`.
    ///
    /// Returns `None` for [Period::All].
    pub fn range(self, today: Date) -> Option<(Date, Date)> {
        match self {
            Self::Day => Some((today, today)),
            Self::Week => Some((today - Duration::days(7), today)),
            Self::Month => {
                let start = today.replace_day(1).unwrap();
                Some((start, last_day_of_month(today.year(), today.month())))
            }
            Self::All => None,
        }
    }
}

/// A calendar month in a specific year, parsed from `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    /// The calendar year.
    pub year: i32,
    /// The month within the year.
    pub month: Month,
}

impl YearMonth {
    /// The first day of the month.
    pub fn first_day(self) -> Date {
        Date::from_calendar_date(self.year, self.month, 1).unwrap()
    }

    /// The last day of the month, accounting for leap years.
    pub fn last_day(self) -> Date {
        last_day_of_month(self.year, self.month)
    }

    /// The number of days in the month.
    pub fn days(self) -> u8 {
        time::util::days_in_year_month(self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidMonth(value.to_owned());

        let (year, month) = value.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        let month = Month::try_from(month).map_err(|_| invalid())?;

        Ok(Self { year, month })
    }
}

fn last_day_of_month(year: i32, month: Month) -> Date {
    Date::from_calendar_date(year, month, time::util::days_in_year_month(year, month)).unwrap()
}
