//! Calendar tokens used to pick which dated layers to attempt.

use chrono::{Datelike, Local, NaiveDate};

/// Tokens naming the calendar layers for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarTokens {
    /// `Monday`
    pub weekday: String,
    /// `October-19`
    pub date: String,
    /// `2026-October-19`
    pub date_with_year: String,
    /// `October`
    pub month: String,
    /// `2026-October`
    pub month_with_year: String,
}

impl CalendarTokens {
    pub fn for_date(date: NaiveDate) -> Self {
        let month = date.format("%B").to_string();
        Self {
            weekday: date.format("%A").to_string(),
            date: format!("{}-{}", month, date.day()),
            date_with_year: format!("{}-{}-{}", date.year(), month, date.day()),
            month_with_year: format!("{}-{}", date.year(), month),
            month,
        }
    }

    pub fn today() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    /// Replace the weekday and/or date tokens, ignoring empty overrides.
    pub fn with_overrides(mut self, weekday: Option<&str>, date: Option<&str>) -> Self {
        if let Some(day) = weekday.filter(|s| !s.is_empty()) {
            self.weekday = day.to_string();
        }
        if let Some(d) = date.filter(|s| !s.is_empty()) {
            self.date = d.to_string();
        }
        self
    }
}
