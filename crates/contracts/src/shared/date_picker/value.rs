use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Machine-readable format of the public value (`YYYY-MM-DD`).
pub const PUBLIC_FORMAT: &str = "%Y-%m-%d";

/// Structured date as the calendar widget sees it.
///
/// `month` is zero-based (0 = January). The combination is not guaranteed to
/// be a real calendar date: typed text such as `30-02-2024` produces a value
/// that [`DateValue::to_naive`] rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateValue {
    pub year: i32,
    pub month: i32,
    pub day: i32,
}

impl DateValue {
    pub const fn new(year: i32, month: i32, day: i32) -> Self {
        Self { year, month, day }
    }

    /// Returns the chrono date if day/month/year form a real Gregorian date.
    pub fn to_naive(&self) -> Option<NaiveDate> {
        let month = u32::try_from(self.month.checked_add(1)?).ok()?;
        let day = u32::try_from(self.day).ok()?;
        NaiveDate::from_ymd_opt(self.year, month, day)
    }

    pub fn is_real_date(&self) -> bool {
        self.to_naive().is_some()
    }

    /// Public (`YYYY-MM-DD`) representation, `None` for impossible dates.
    pub fn to_public(&self) -> Option<String> {
        self.to_naive()
            .map(|date| date.format(PUBLIC_FORMAT).to_string())
    }
}

impl From<NaiveDate> for DateValue {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month0() as i32,
            day: date.day() as i32,
        }
    }
}

/// Parse a public value or bound string.
///
/// Only the date part is read: "2024-03-15" and "2024-03-15T14:02:26Z" both
/// give 15 March 2024. Empty or malformed input gives `None`.
pub fn parse_public(value: &str) -> Option<NaiveDate> {
    let date_part = value.trim().split('T').next().unwrap_or_default();
    if date_part.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(date_part, PUBLIC_FORMAT).ok()
}
