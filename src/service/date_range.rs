// service/date_range.rs
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::propertymodel::PropertyRecord;

pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;

/// User-selected time window for the property table and stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DateRangeFilter {
    All,
    ThisMonth,
    ThisYear,
    Month { value: String },
    Year { value: String },
    Custom { from: Option<String>, to: Option<String> },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("Unknown date range '{0}'")]
    UnknownRange(String),

    #[error("Month must be in YYYY-MM format")]
    InvalidMonthFormat,

    #[error("Month must be between 01 and 12")]
    MonthOutOfRange,

    #[error("Year must be a four-digit number")]
    InvalidYearFormat,

    #[error("Year must be between 2000 and 2100, got {0}")]
    YearOutOfRange(i32),

    #[error("Both start and end dates are required")]
    MissingCustomDates,

    #[error("Dates must be in YYYY-MM-DD format")]
    InvalidDate,

    #[error("Start date must be on or before end date")]
    InvertedRange,
}

/// Concrete closed interval a [`DateRangeFilter`] resolves to.
/// `from`/`to` are both `None` for [`DateRangeFilter::All`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRange {
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

/// Query parameters the upstream API takes for the same window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl DateRangeFilter {
    /// Build a filter from the loose query-string pieces the panel sends.
    pub fn from_parts(
        range: Option<&str>,
        month: Option<&str>,
        year: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Self, DateRangeError> {
        let owned = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(String::from);

        match range.map(str::trim).unwrap_or("all") {
            "" | "all" => Ok(DateRangeFilter::All),
            "thisMonth" => Ok(DateRangeFilter::ThisMonth),
            "thisYear" => Ok(DateRangeFilter::ThisYear),
            "month" => Ok(DateRangeFilter::Month {
                value: owned(month).ok_or(DateRangeError::InvalidMonthFormat)?,
            }),
            "year" => Ok(DateRangeFilter::Year {
                value: owned(year).ok_or(DateRangeError::InvalidYearFormat)?,
            }),
            "custom" => Ok(DateRangeFilter::Custom {
                from: owned(from),
                to: owned(to),
            }),
            other => Err(DateRangeError::UnknownRange(other.to_string())),
        }
    }

    /// Display label. Never used for comparisons.
    pub fn label(&self) -> String {
        match self {
            DateRangeFilter::All => "All time".to_string(),
            DateRangeFilter::ThisMonth => "This month".to_string(),
            DateRangeFilter::ThisYear => "This year".to_string(),
            DateRangeFilter::Month { value } => match parse_month(value) {
                Ok((year, month)) => NaiveDate::from_ymd_opt(year, month, 1)
                    .map(|d| d.format("%B %Y").to_string())
                    .unwrap_or_else(|| "Month".to_string()),
                Err(_) => "Month".to_string(),
            },
            DateRangeFilter::Year { value } => format!("Year {}", value.trim()),
            DateRangeFilter::Custom { from, to } => {
                match (
                    from.as_deref().and_then(|f| parse_day(f).ok()),
                    to.as_deref().and_then(|t| parse_day(t).ok()),
                ) {
                    (Some(from), Some(to)) => format!(
                        "{} to {}",
                        from.format("%d %b %Y"),
                        to.format("%d %b %Y")
                    ),
                    _ => "Custom range".to_string(),
                }
            }
        }
    }

    /// Resolve against `now`. Pure: the same inputs give the same range.
    pub fn resolve(&self, now: NaiveDateTime) -> Result<ResolvedRange, DateRangeError> {
        let label = self.label();
        let (bounds, month, year) = match self {
            DateRangeFilter::All => (None, None, None),
            DateRangeFilter::ThisMonth => (
                month_bounds(now.year(), now.month()),
                None,
                None,
            ),
            DateRangeFilter::ThisYear => (year_bounds(now.year()), None, None),
            DateRangeFilter::Month { value } => {
                let (year, month) = parse_month(value)?;
                (month_bounds(year, month), Some(month), Some(year))
            }
            DateRangeFilter::Year { value } => {
                let year = parse_year(value)?;
                (year_bounds(year), None, Some(year))
            }
            DateRangeFilter::Custom { from, to } => {
                let (from, to) = match (from.as_deref(), to.as_deref()) {
                    (Some(from), Some(to)) => (from.trim(), to.trim()),
                    _ => return Err(DateRangeError::MissingCustomDates),
                };
                let from_day = parse_day(from)?;
                let to_day = parse_day(to)?;
                if from_day > to_day {
                    return Err(DateRangeError::InvertedRange);
                }
                (start_of_day(from_day).zip(end_of_day(to_day)), None, None)
            }
        };

        let (from, to) = match bounds {
            Some((from, to)) => (Some(from), Some(to)),
            None => (None, None),
        };

        Ok(ResolvedRange { from, to, label, month, year })
    }
}

impl ResolvedRange {
    pub fn is_bounded(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// Inclusive on both ends. An undated record only passes an unbounded range.
    pub fn contains(&self, at: Option<DateTime<Utc>>) -> bool {
        if !self.is_bounded() {
            return true;
        }
        let Some(at) = at.map(|at| at.naive_utc()) else {
            return false;
        };
        self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at <= to)
    }

    pub fn apply(&self, records: &[PropertyRecord]) -> Vec<PropertyRecord> {
        records
            .iter()
            .filter(|r| self.contains(r.created_at))
            .cloned()
            .collect()
    }

    pub fn query(&self) -> RangeQuery {
        RangeQuery {
            from: self.from.map(|d| d.format("%Y-%m-%d").to_string()),
            to: self.to.map(|d| d.format("%Y-%m-%d").to_string()),
            month: self.month,
            year: self.year,
        }
    }
}

fn all_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_month(value: &str) -> Result<(i32, u32), DateRangeError> {
    let (year, month) = value
        .trim()
        .split_once('-')
        .ok_or(DateRangeError::InvalidMonthFormat)?;
    if !all_digits(year, 4) || !all_digits(month, 2) {
        return Err(DateRangeError::InvalidMonthFormat);
    }
    let year: i32 = year.parse().map_err(|_| DateRangeError::InvalidMonthFormat)?;
    let month: u32 = month.parse().map_err(|_| DateRangeError::InvalidMonthFormat)?;

    // Zero-based index must land in 0..=11.
    if !(0..12).contains(&(month as i64 - 1)) {
        return Err(DateRangeError::MonthOutOfRange);
    }
    Ok((year, month))
}

fn parse_year(value: &str) -> Result<i32, DateRangeError> {
    let value = value.trim();
    if !all_digits(value, 4) {
        return Err(DateRangeError::InvalidYearFormat);
    }
    let year: i32 = value.parse().map_err(|_| DateRangeError::InvalidYearFormat)?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(DateRangeError::YearOutOfRange(year));
    }
    Ok(year)
}

fn parse_day(value: &str) -> Result<NaiveDate, DateRangeError> {
    let value = value.trim();
    let mut parts = value.splitn(3, '-');
    let strict = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(y), Some(m), Some(d)) if all_digits(y, 4) && all_digits(m, 2) && all_digits(d, 2)
    );
    if !strict {
        return Err(DateRangeError::InvalidDate);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| DateRangeError::InvalidDate)
}

fn start_of_day(day: NaiveDate) -> Option<NaiveDateTime> {
    day.and_hms_opt(0, 0, 0)
}

fn end_of_day(day: NaiveDate) -> Option<NaiveDateTime> {
    day.and_hms_milli_opt(23, 59, 59, 999)
}

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = next.pred_opt()?;
    start_of_day(first).zip(end_of_day(last))
}

fn year_bounds(year: i32) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let last = NaiveDate::from_ymd_opt(year, 12, 31)?;
    start_of_day(first).zip(end_of_day(last))
}
