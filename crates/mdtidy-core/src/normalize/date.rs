use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{TidyError, TidyResult};

/// Date-only, date + time (space or `T` separated), optional seconds,
/// optional fraction, optional `Z` / `±HHMM` / `±HH:MM` offset.
static DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(\d{4})-(\d{1,2})-(\d{1,2})(?:(?:[Tt]|\s+)(\d{1,2}):(\d{2})(?::(\d{2}))?(?:\.\d+)?)?\s*(Z|[+-]\d{2}:?\d{2})?\s*$",
    )
    .expect("hardcoded date regex must compile")
});

pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Rewrites the accepted date shapes into `YYYY-MM-DDTHH:MM:SS±HHMM`.
#[derive(Debug, Clone)]
pub struct DateRule {
    default_time: NaiveTime,
    default_offset: FixedOffset,
}

impl DateRule {
    pub fn new(default_time: &str, default_offset: &str) -> TidyResult<Self> {
        let default_time = NaiveTime::parse_from_str(default_time, "%H:%M:%S").map_err(|_| {
            TidyError::Config(format!("invalid default_time '{}', expected HH:MM:SS", default_time))
        })?;
        let default_offset = parse_offset(default_offset).ok_or_else(|| {
            TidyError::Config(format!(
                "invalid default_offset '{}', expected +HHMM",
                default_offset
            ))
        })?;
        Ok(Self {
            default_time,
            default_offset,
        })
    }

    pub fn parse(&self, raw: &str) -> Option<DateTime<FixedOffset>> {
        let caps = DATE_REGEX.captures(raw)?;
        let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

        let date = NaiveDate::from_ymd_opt(num(1)? as i32, num(2)?, num(3)?)?;
        let time = match caps.get(4) {
            Some(_) => NaiveTime::from_hms_opt(num(4)?, num(5)?, num(6).unwrap_or(0))?,
            None => self.default_time,
        };
        let offset = match caps.get(7) {
            Some(m) => parse_offset(m.as_str())?,
            None => self.default_offset,
        };

        offset.from_local_datetime(&date.and_time(time)).single()
    }

    /// Canonical form of `raw`, or `None` when it matches no accepted shape.
    pub fn canonicalize(&self, raw: &str) -> Option<String> {
        self.parse(raw)
            .map(|dt| dt.format(CANONICAL_FORMAT).to_string())
    }
}

fn parse_offset(raw: &str) -> Option<FixedOffset> {
    if raw == "Z" {
        return FixedOffset::east_opt(0);
    }
    let (sign, digits) = if let Some(rest) = raw.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = raw.strip_prefix('-') {
        (-1, rest)
    } else {
        return None;
    };
    let digits: String = digits.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
