use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use super::error::FilterError;

/// Earliest year accepted in date filters.
pub const MIN_YEAR: i32 = 2010;
/// Latest year accepted in date filters.
pub const MAX_YEAR: i32 = 2040;

/// Normalized query constraints for an event fetch.
///
/// Filters are only built through the constructors below, which validate
/// their input, so a value of this type always describes a possible query.
/// The serialized form keys the aggregate-level cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ym: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ymd: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keyword: Option<String>,
}

impl EventFilter {
    /// Looks up a single event by its provider-local id.
    pub fn by_id(event_id: i64) -> Self {
        Self {
            event_id: Some(event_id),
            ..Self::default()
        }
    }

    /// Every month of `year`.
    pub fn year(year: i32) -> Result<Self, FilterError> {
        Self::month_range(year, 1, year, 12)
    }

    /// A single month.
    pub fn month(year: i32, month: u32) -> Result<Self, FilterError> {
        Self::month_range(year, month, year, month)
    }

    /// A single day.
    pub fn day(year: i32, month: u32, day: u32) -> Result<Self, FilterError> {
        check_year(year)?;
        check_month(month)?;
        if NaiveDate::from_ymd_opt(year, month, day).is_none() {
            return Err(FilterError::OutOfRange {
                field: "day",
                value: i64::from(day),
            });
        }
        Ok(Self {
            ymd: vec![format!("{year:04}{month:02}{day:02}")],
            ..Self::default()
        })
    }

    /// Every month from `from_year/from_month` to `to_year/to_month`, inclusive.
    pub fn month_range(
        from_year: i32,
        from_month: u32,
        to_year: i32,
        to_month: u32,
    ) -> Result<Self, FilterError> {
        check_year(from_year)?;
        check_month(from_month)?;
        check_year(to_year)?;
        check_month(to_month)?;
        if (from_year, from_month) > (to_year, to_month) {
            return Err(FilterError::InvalidRange {
                from: format!("{from_year:04}-{from_month:02}"),
                to: format!("{to_year:04}-{to_month:02}"),
            });
        }
        Ok(Self {
            ym: months_between((from_year, from_month), (to_year, to_month)),
            ..Self::default()
        })
    }

    /// The months touched by the window of `days` before and after `today`.
    pub fn recent(today: NaiveDate, days: u64) -> Self {
        let from = today.checked_sub_days(Days::new(days)).unwrap_or(today);
        let to = today.checked_add_days(Days::new(days)).unwrap_or(today);
        Self {
            ym: months_between((from.year(), from.month()), (to.year(), to.month())),
            ..Self::default()
        }
    }

    /// Attaches a free-text keyword query. Blank queries are ignored.
    pub fn with_keyword(mut self, keyword: Option<&str>) -> Self {
        self.keyword = keyword
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);
        self
    }

    pub fn event_id(&self) -> Option<i64> {
        self.event_id
    }

    /// Year-month buckets as `YYYYMM`.
    pub fn ym(&self) -> &[String] {
        &self.ym
    }

    /// Exact-date buckets as `YYYYMMDD`.
    pub fn ymd(&self) -> &[String] {
        &self.ymd
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }
}

fn check_year(year: i32) -> Result<(), FilterError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(FilterError::OutOfRange {
            field: "year",
            value: i64::from(year),
        })
    }
}

fn check_month(month: u32) -> Result<(), FilterError> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(FilterError::OutOfRange {
            field: "month",
            value: i64::from(month),
        })
    }
}

fn months_between(from: (i32, u32), to: (i32, u32)) -> Vec<String> {
    let (mut year, mut month) = from;
    let mut months = Vec::new();
    while (year, month) <= to {
        months.push(format!("{year:04}{month:02}"));
        month += 1;
        if month > 12 {
            year += 1;
            month = 1;
        }
    }
    months
}
