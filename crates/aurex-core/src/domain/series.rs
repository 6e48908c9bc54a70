use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration};

use crate::{InstrumentId, ValidationError};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Longest custom range accepted, in days (ten years).
pub const MAX_RANGE_DAYS: i64 = 3_653;

/// Explicit start/end date pair with `start < end`, at most [`MAX_RANGE_DAYS`] apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        let days = (end - start).whole_days();
        if days > MAX_RANGE_DAYS {
            return Err(ValidationError::DateRangeTooLong {
                days,
                max: MAX_RANGE_DAYS,
            });
        }
        Ok(Self { start, end })
    }

    /// Parses two `YYYY-MM-DD` dates.
    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub const fn start(self) -> Date {
        self.start
    }

    pub const fn end(self) -> Date {
        self.end
    }

    /// Whole days between start and end; always at least one.
    pub fn days(self) -> u32 {
        u32::try_from((self.end - self.start).whole_days()).unwrap_or(u32::MAX)
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<Date, ValidationError> {
    let invalid = || ValidationError::InvalidDate {
        value: value.trim().to_owned(),
    };
    Date::parse(value.trim(), DATE_FORMAT).map_err(|_| invalid())
}

/// Chart period selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    OneMonth,
    SixMonths,
    OneYear,
    ThreeYears,
    Custom(DateRange),
}

impl Period {
    pub const PRESETS: [Self; 4] = [
        Self::OneMonth,
        Self::SixMonths,
        Self::OneYear,
        Self::ThreeYears,
    ];

    pub fn label(self) -> String {
        match self {
            Self::OneMonth => String::from("1M"),
            Self::SixMonths => String::from("6M"),
            Self::OneYear => String::from("1Y"),
            Self::ThreeYears => String::from("3Y"),
            Self::Custom(range) => format!("{}..{}", range.start, range.end),
        }
    }

    /// Number of day steps in the series; the series holds `days + 1` points.
    pub fn days(self) -> u32 {
        match self {
            Self::OneMonth => 30,
            Self::SixMonths => 180,
            Self::OneYear => 365,
            Self::ThreeYears => 1_095,
            Self::Custom(range) => range.days(),
        }
    }

    /// First date of the series. Preset periods end on `today`.
    pub fn start_date(self, today: Date) -> Date {
        match self {
            Self::Custom(range) => range.start,
            preset => today
                .checked_sub(Duration::days(i64::from(preset.days())))
                .unwrap_or(Date::MIN),
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "1M" => Ok(Self::OneMonth),
            "6M" => Ok(Self::SixMonths),
            "1Y" => Ok(Self::OneYear),
            "3Y" => Ok(Self::ThreeYears),
            _ => Err(ValidationError::InvalidPeriod {
                value: value.trim().to_owned(),
            }),
        }
    }
}

impl Serialize for Period {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.label())
    }
}

/// One dated price in a historical series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub date: Date,
    pub price: f64,
}

impl Serialize for SeriesPoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("SeriesPoint", 2)?;
        state.serialize_field("date", &self.date.to_string())?;
        state.serialize_field("price", &self.price)?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalSeries {
    pub instrument: InstrumentId,
    pub period: Period,
    pub points: Vec<SeriesPoint>,
}

#[cfg(test)]
mod tests {
    use time::Month;

    use super::*;

    fn date(year: i32, month: Month, day: u8) -> Date {
        Date::from_calendar_date(year, month, day).expect("valid date")
    }

    #[test]
    fn presets_parse_and_count_days() {
        assert_eq!("1m".parse::<Period>(), Ok(Period::OneMonth));
        assert_eq!("3Y".parse::<Period>().map(Period::days), Ok(1_095));
        assert!(matches!(
            "2W".parse::<Period>(),
            Err(ValidationError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn preset_starts_before_today() {
        let today = date(2024, Month::March, 31);
        assert_eq!(Period::OneMonth.start_date(today), date(2024, Month::March, 1));
    }

    #[test]
    fn custom_range_requires_start_before_end() {
        assert!(matches!(
            DateRange::parse("2024-02-01", "2024-02-01"),
            Err(ValidationError::InvalidDateRange { .. })
        ));
        assert!(matches!(
            DateRange::parse("2024-13-01", "2024-12-01"),
            Err(ValidationError::InvalidDate { .. })
        ));

        let range = DateRange::parse("2024-02-01", "2024-03-01").expect("valid range");
        assert_eq!(range.days(), 29);
        assert_eq!(Period::Custom(range).label(), "2024-02-01..2024-03-01");
    }

    #[test]
    fn parse_date_trims_and_checks_the_calendar() {
        assert_eq!(parse_date(" 2024-02-29 "), Ok(date(2024, Month::February, 29)));
        assert!(matches!(
            parse_date("2023-02-29"),
            Err(ValidationError::InvalidDate { .. })
        ));
        assert!(matches!(
            parse_date("29/02/2024"),
            Err(ValidationError::InvalidDate { .. })
        ));
    }

    #[test]
    fn points_serialize_dates_as_iso_strings() {
        let point = SeriesPoint {
            date: date(2024, Month::January, 5),
            price: 7.25,
        };
        let json = serde_json::to_string(&point).expect("serializes");
        assert_eq!(json, r#"{"date":"2024-01-05","price":7.25}"#);
    }
}
