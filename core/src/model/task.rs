use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ParseError;

/// Maximum number of tags a task can carry.
pub const MAXIMUM_TAGS: usize = 10;

const SECONDS_IN_MINUTE: i64 = 60;
const MINUTES_IN_HOUR: i64 = 60;
const HOURS_IN_DAY: i64 = 24;
const DAYS_IN_WEEK: i64 = 7;
const WEEKS_IN_MONTH: i64 = 4;
const MONTHS_IN_YEAR: i64 = 12;

/// A single to-do item.
///
/// Tasks have no stored identity: the number shown to the user is the task's
/// position in the store and is recomputed on every listing. Two tasks are
/// equal when description, tags, begin, end and done all match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Task {
    pub description: String,
    tags: BTreeSet<String>,
    pub begin: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub done: bool,
}

impl Task {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Adds a tag. A tag the task already has is accepted and ignored.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> Result<(), ParseError> {
        let tag = tag.into();
        if self.tags.contains(&tag) {
            return Ok(());
        }
        if self.tags.len() >= MAXIMUM_TAGS {
            return Err(ParseError::TooManyTags);
        }
        self.tags.insert(tag);
        Ok(())
    }

    /// Returns whether the tag was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    pub fn clear_tags(&mut self) {
        self.tags.clear();
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    pub fn is_floating(&self) -> bool {
        self.begin.is_none() && self.end.is_none()
    }

    pub fn is_event(&self) -> bool {
        self.begin.is_some() && self.end.is_some()
    }

    pub fn is_overdue_at(&self, now: NaiveDateTime) -> bool {
        matches!(self.end, Some(end) if end < now)
    }

    /// Started already and not yet overdue.
    pub fn is_ongoing_at(&self, now: NaiveDateTime) -> bool {
        match self.begin {
            Some(begin) => !self.is_overdue_at(now) && begin < now,
            None => false,
        }
    }

    /// Overdue tasks count as due on any date.
    pub fn is_due_on(&self, date: NaiveDate, now: NaiveDateTime) -> bool {
        let Some(end) = self.end else {
            return false;
        };
        if self.is_overdue_at(now) {
            return true;
        }
        end >= date.and_time(NaiveTime::MIN) && end <= date.and_time(end_of_day())
    }

    /// An overdue task stays "due today" only while its end is still on or
    /// after today's midnight.
    pub fn is_due_today_at(&self, now: NaiveDateTime) -> bool {
        let Some(end) = self.end else {
            return false;
        };
        let today = now.date();
        if self.is_overdue_at(now) {
            return end >= today.and_time(NaiveTime::MIN);
        }
        end <= today.and_time(end_of_day())
    }

    pub fn is_due_tomorrow_at(&self, now: NaiveDateTime) -> bool {
        let Some(end) = self.end else {
            return false;
        };
        let tomorrow = now.date() + Duration::days(1);
        let start = tomorrow.and_time(NaiveTime::MIN);
        if self.is_overdue_at(now) {
            return end >= start;
        }
        end >= start && end <= tomorrow.and_time(end_of_day())
    }

    /// Countdown to (or count-up from) the task's end, e.g.
    /// `"2 days, 3 hours from now."`.
    ///
    /// Months are four weeks and years twelve months, so the result is an
    /// approximation for anything longer than a week.
    pub fn time_difference(&self, now: NaiveDateTime) -> Option<String> {
        let end = self.end?;
        let delta = (end - now).num_seconds();
        let past = delta < 0;
        let mut rest = delta.abs() / SECONDS_IN_MINUTE;

        let minutes = rest % MINUTES_IN_HOUR;
        rest /= MINUTES_IN_HOUR;
        let hours = rest % HOURS_IN_DAY;
        rest /= HOURS_IN_DAY;
        let days = rest % DAYS_IN_WEEK;
        rest /= DAYS_IN_WEEK;
        let weeks = rest % WEEKS_IN_MONTH;
        rest /= WEEKS_IN_MONTH;
        let months = rest % MONTHS_IN_YEAR;
        let years = rest / MONTHS_IN_YEAR;

        let parts: Vec<String> = [
            (years, "year"),
            (months, "month"),
            (weeks, "week"),
            (days, "day"),
            (hours, "hour"),
            (minutes, "minute"),
        ]
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| {
            if n == 1 {
                format!("1 {unit}")
            } else {
                format!("{n} {unit}s")
            }
        })
        .collect();

        let amount = if parts.is_empty() {
            "less than a minute".to_string()
        } else {
            parts.join(", ")
        };
        let suffix = if past { "ago." } else { "from now." };
        Some(format!("{amount} {suffix}"))
    }
}

pub(crate) fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}
