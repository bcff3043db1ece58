use chrono::{Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::fallback::Fallback;

const FORMAT: &str = "%Y-%m-%d";

/// A calendar date used as the store key.
///
/// Always rendered as zero-padded `YYYY-MM-DD`, so comparing the rendered
/// strings gives the same order as comparing the dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Substitute for any date that cannot be parsed.
    pub const EPOCH: DateKey = match NaiveDate::from_ymd_opt(1970, 1, 1) {
        Some(date) => DateKey(date),
        None => panic!("1970-01-01 is a valid date"),
    };

    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parses `YYYY-MM-DD` exactly; any whitespace is rejected.
    ///
    /// Anything else becomes [`DateKey::EPOCH`], which makes a range query
    /// return everything.
    pub fn parse(text: &str) -> Fallback<DateKey> {
        // chrono skips spaces before numeric fields
        if text.chars().any(char::is_whitespace) {
            return Fallback::defaulted(
                Self::EPOCH,
                format!("invalid date '{}': contains whitespace", text),
            );
        }
        match NaiveDate::parse_from_str(text, FORMAT) {
            Ok(date) => Fallback::Loaded(Self(date)),
            Err(e) => Fallback::defaulted(
                Self::EPOCH,
                format!("invalid date '{}': {}", text, e),
            ),
        }
    }

    /// Finds the first `YYYY-MM-DD` run inside a table header such as
    /// `2024-01-10(수)`.
    pub fn from_header_text(text: &str) -> Option<DateKey> {
        let bytes = text.as_bytes();
        if bytes.len() < 10 {
            return None;
        }
        (0..=bytes.len() - 10).find_map(|start| {
            let window = &bytes[start..start + 10];
            let shaped = window.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });
            if !shaped {
                return None;
            }
            // The window is ASCII, so it sits on char boundaries.
            NaiveDate::parse_from_str(&text[start..start + 10], FORMAT)
                .ok()
                .map(Self)
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The key `days` days earlier, saturating at the earliest representable date.
    pub fn days_before(&self, days: u64) -> DateKey {
        Self(self.0.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN))
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    /// Strict: a persisted key that does not parse is an error, not epoch.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&text, FORMAT)
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}
