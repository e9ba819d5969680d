use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::ParseError;
use crate::model::task::end_of_day;

const DATE_FORMAT: &str = "%d/%m/%Y";
const YEARS_MILLENNIUM: i32 = 2000;

/// A begin/end pair pulled out of a command. A deadline has only `end`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimePeriod {
    pub begin: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl TimePeriod {
    pub fn is_deadline(&self) -> bool {
        self.begin.is_none() && self.end.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
enum NamedDay {
    Offset(i64),
    Next(Weekday),
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid date pattern {pattern}: {e}"))
}

static NOISE_REGEX: Lazy<Regex> = Lazy::new(|| compile(r",|\b(?:this|next|the)\b"));
static TO_REGEX: Lazy<Regex> = Lazy::new(|| compile(r"\bto\b"));

// "day after tomorrow" has to go before "tomorrow".
static NAMED_DAYS: Lazy<Vec<(Regex, NamedDay)>> = Lazy::new(|| {
    [
        (r"\bday after tomorrow\b", NamedDay::Offset(2)),
        (r"\byesterday\b", NamedDay::Offset(-1)),
        (r"\b(?:today|2day)\b", NamedDay::Offset(0)),
        (r"\b(?:tomorrow|tmr|tml)\b", NamedDay::Offset(1)),
        (r"\b(?:monday|mon)\b", NamedDay::Next(Weekday::Mon)),
        (r"\b(?:tuesday|tues|tue)\b", NamedDay::Next(Weekday::Tue)),
        (r"\b(?:wednesday|wed)\b", NamedDay::Next(Weekday::Wed)),
        (r"\b(?:thursday|thurs|thur|thu)\b", NamedDay::Next(Weekday::Thu)),
        (r"\b(?:friday|fri)\b", NamedDay::Next(Weekday::Fri)),
        (r"\b(?:saturday|sat)\b", NamedDay::Next(Weekday::Sat)),
        (r"\b(?:sunday|sun)\b", NamedDay::Next(Weekday::Sun)),
    ]
    .into_iter()
    .map(|(pattern, day)| (compile(pattern), day))
    .collect()
});

static NAMED_TIMES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\bdawn\b", "06:00"),
        (r"\bmorning\b", "10:00"),
        (r"\bnoon\b", "12:00"),
        (r"\bafternoon\b", "18:00"),
        (r"\bevening\b", "20:00"),
        (r"\bnight\b", "22:00"),
        (r"\bmidnight\b", "23:59"),
    ]
    .into_iter()
    .map(|(pattern, time)| (compile(pattern), time))
    .collect()
});

static DATE_TOKEN: Lazy<Regex> = Lazy::new(|| compile(r"^(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?$"));
static TIME_TOKEN: Lazy<Regex> = Lazy::new(|| compile(r"^(\d{1,2})(?::(\d{2}))?(am|pm)?$"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Endpoint {
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
}

/// Turns the temporal segments of a command into a period or deadline.
///
/// Returns `Ok(None)` when there are no segments. All segments together may
/// describe one date and one time per endpoint; a dash (or `to`) separates the
/// begin from the end.
pub fn extract_period(segments: &[String], now: NaiveDateTime) -> Result<Option<TimePeriod>, ParseError> {
    if segments.is_empty() {
        return Ok(None);
    }
    let phrase = segments.join(" ");
    let today = now.date();
    let prepared = prepare(&phrase, today);
    if prepared.trim().is_empty() {
        return Err(ParseError::NoDate);
    }

    let parts: Vec<&str> = prepared.split('-').collect();
    match parts.as_slice() {
        [single] => {
            let end = parse_endpoint(single, today)?;
            let date = end.date.unwrap_or(today);
            let time = end.time.unwrap_or_else(end_of_day);
            Ok(Some(TimePeriod {
                begin: None,
                end: Some(date.and_time(time)),
            }))
        }
        [first, second] => {
            if first.trim().is_empty() || second.trim().is_empty() {
                return Err(ParseError::NotARange(phrase.trim().to_string()));
            }
            let mut begin = parse_endpoint(first, today)?;
            let mut end = parse_endpoint(second, today)?;
            begin.date = begin.date.or(end.date);
            end.date = end.date.or(begin.date);

            let begin = begin
                .date
                .unwrap_or(today)
                .and_time(begin.time.unwrap_or(NaiveTime::MIN));
            let end = end
                .date
                .unwrap_or(today)
                .and_time(end.time.unwrap_or_else(end_of_day));
            if begin > end {
                return Err(ParseError::InvalidPeriod(begin, end));
            }
            Ok(Some(TimePeriod {
                begin: Some(begin),
                end: Some(end),
            }))
        }
        _ => Err(ParseError::MultipleDates),
    }
}

/// Parses a phrase naming a single day, e.g. `"fri"` or `"25/12"`.
pub fn parse_day(phrase: &str, now: NaiveDateTime) -> Result<NaiveDate, ParseError> {
    let period = extract_period(&[phrase.to_string()], now)?.ok_or(ParseError::NoDate)?;
    match (period.begin, period.end) {
        (None, Some(end)) => Ok(end.date()),
        _ => Err(ParseError::InvalidDate(phrase.trim().to_string())),
    }
}

/// Lower-cases, drops filler words and replaces named days and times with
/// explicit `dd/MM/yyyy` and `hh:mm` values.
fn prepare(phrase: &str, today: NaiveDate) -> String {
    let mut text = phrase.to_lowercase();
    text = NOISE_REGEX.replace_all(&text, " ").into_owned();
    text = TO_REGEX.replace_all(&text, "-").into_owned();
    for (regex, day) in NAMED_DAYS.iter() {
        let date = resolve_named_day(*day, today).format(DATE_FORMAT).to_string();
        text = regex.replace_all(&text, date.as_str()).into_owned();
    }
    for (regex, time) in NAMED_TIMES.iter() {
        text = regex.replace_all(&text, *time).into_owned();
    }
    text
}

fn resolve_named_day(day: NamedDay, today: NaiveDate) -> NaiveDate {
    match day {
        NamedDay::Offset(days) => today + Duration::days(days),
        NamedDay::Next(weekday) => next_weekday(today, weekday),
    }
}

/// The next `weekday` strictly after `today`.
pub fn next_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let mut days_needed = weekday.num_days_from_sunday() as i64
        - today.weekday().num_days_from_sunday() as i64;
    if days_needed <= 0 {
        days_needed += 7;
    }
    today + Duration::days(days_needed)
}

fn parse_endpoint(part: &str, today: NaiveDate) -> Result<Endpoint, ParseError> {
    let mut endpoint = Endpoint::default();
    let tokens: Vec<&str> = part.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(ParseError::NoDate);
    }

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if let Some(caps) = DATE_TOKEN.captures(token) {
            let date = parse_date(&caps, today).ok_or_else(|| ParseError::InvalidDate(token.to_string()))?;
            if endpoint.date.replace(date).is_some() {
                return Err(ParseError::MultipleDates);
            }
        } else if let Some(caps) = TIME_TOKEN.captures(token) {
            // "2 pm" arrives as two tokens
            let suffix = match caps.get(3) {
                Some(m) => Some(m.as_str()),
                None => match tokens.get(i + 1) {
                    Some(&next) if next == "am" || next == "pm" => {
                        i += 1;
                        Some(next)
                    }
                    _ => None,
                },
            };
            let time = parse_time(&caps, suffix).ok_or_else(|| ParseError::InvalidDate(token.to_string()))?;
            if endpoint.time.replace(time).is_some() {
                return Err(ParseError::MultipleDates);
            }
        } else {
            return Err(ParseError::InvalidDate(token.to_string()));
        }
        i += 1;
    }
    Ok(endpoint)
}

fn parse_date(caps: &Captures, today: NaiveDate) -> Option<NaiveDate> {
    let day: u32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let year = match caps.get(3) {
        Some(m) if m.as_str().len() == 2 => YEARS_MILLENNIUM + m.as_str().parse::<i32>().ok()?,
        Some(m) => m.as_str().parse().ok()?,
        None => today.year(),
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// A bare number without a colon or am/pm is not a time.
fn parse_time(caps: &Captures, suffix: Option<&str>) -> Option<NaiveTime> {
    let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    let hour = match suffix {
        Some(meridiem) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            match (meridiem, hour) {
                ("am", 12) => 0,
                ("am", h) => h,
                ("pm", 12) => 12,
                (_, h) => h + 12,
            }
        }
        None if caps.get(2).is_some() => hour,
        None => return None,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}
