//! Weekly business-hours window.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, Utc, Weekday};
use serde::Deserialize;

use crate::{AppError, Result};

/// Office hours as a daily window on selected weekdays, in a fixed UTC
/// offset.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct BusinessHours {
    /// Opening time (inclusive), `HH:MM`.
    #[serde(default = "default_start")]
    pub start: NaiveTime,
    /// Closing time (exclusive), `HH:MM`.
    #[serde(default = "default_end")]
    pub end: NaiveTime,
    /// Days the office is open.
    #[serde(default = "default_days")]
    pub days: Vec<Weekday>,
    /// Offset of local office time from UTC, in minutes.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

fn default_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn default_end() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn default_days() -> Vec<Weekday> {
    vec![
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ]
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: default_end(),
            days: default_days(),
            utc_offset_minutes: 0,
        }
    }
}

impl BusinessHours {
    /// Check the window is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `start >= end`, no day is selected or
    /// the offset is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.start >= self.end {
            return Err(AppError::Config(format!(
                "business_hours.start ({}) must be before end ({})",
                self.start, self.end
            )));
        }
        if self.days.is_empty() {
            return Err(AppError::Config(
                "business_hours.days must not be empty".into(),
            ));
        }
        self.offset()?;
        Ok(())
    }

    fn offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).ok_or_else(|| {
            AppError::Config(format!(
                "business_hours.utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            ))
        })
    }

    /// Whether `at` falls inside the window.
    ///
    /// An invalid offset is treated as closed.
    #[must_use]
    pub fn is_open(&self, at: DateTime<Utc>) -> bool {
        let Ok(offset) = self.offset() else {
            return false;
        };
        let local = at.with_timezone(&offset);
        let time = local.time();
        self.days.contains(&local.weekday()) && time >= self.start && time < self.end
    }

    /// Start of the next business window at or after `at`.
    ///
    /// Returns `at` itself when the office is open. `None` only if the
    /// window is unusable.
    #[must_use]
    pub fn next_open(&self, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.is_open(at) {
            return Some(at);
        }
        let offset = self.offset().ok()?;
        let local = at.with_timezone(&offset);

        // At most one week ahead.
        (0..=7).find_map(|day| {
            let date = local.date_naive() + Duration::days(day);
            if !self.days.contains(&date.weekday()) {
                return None;
            }
            let candidate = date
                .and_time(self.start)
                .and_local_timezone(offset)
                .single()?
                .with_timezone(&Utc);
            (candidate >= at).then_some(candidate)
        })
    }
}
