//! Date and instant encodings required by the document profile.

use std::fmt;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, SecondsFormat, Timelike};
use serde::{Serialize, Serializer};

/// The single instant shared by every time-sensitive field of one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildTimestamp(DateTime<FixedOffset>);

impl BuildTimestamp {
    /// Truncates to whole seconds, the precision of the container.
    pub fn new(instant: DateTime<FixedOffset>) -> Self {
        Self(instant.with_nanosecond(0).unwrap_or(instant))
    }

    /// `YYYY-MM-DDTHH:MM:SS±HH:MM`, never `Z`.
    pub fn to_fhir_string(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, false)
    }
}

impl fmt::Display for BuildTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fhir_string())
    }
}

impl Serialize for BuildTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_fhir_string())
    }
}

/// Capture the current local instant with its UTC offset.
pub fn now_with_offset() -> BuildTimestamp {
    BuildTimestamp::new(Local::now().fixed_offset())
}

/// Convert a `DD-MM-YYYY` entry (`/` and `.` also accepted) to `YYYY-MM-DD`.
///
/// Returns `None` for anything that is not a real calendar date with a
/// four-digit year.
pub fn to_canonical_date(local: &str) -> Option<String> {
    let parts: Vec<&str> = local
        .trim()
        .split(|c: char| matches!(c, '-' | '/' | '.'))
        .collect();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };

    if year.len() != 4 || !is_short_number(day) || !is_short_number(month) {
        return None;
    }
    if !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)?;
    Some(date.format("%Y-%m-%d").to_string())
}

fn is_short_number(value: &str) -> bool {
    (1..=2).contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reorders_and_pads_dates() {
        assert_eq!(to_canonical_date("5-3-1990").as_deref(), Some("1990-03-05"));
        assert_eq!(to_canonical_date("25/12/2001").as_deref(), Some("2001-12-25"));
        assert_eq!(to_canonical_date(" 01.01.1970 ").as_deref(), Some("1970-01-01"));
    }

    #[test]
    fn rejects_malformed_dates() {
        for input in [
            "", "1990-03-05", "5-3-90", "5-3", "a-b-cdef", "31-02-2020", "5-3-1990-1", "123-1-1990",
        ] {
            assert_eq!(to_canonical_date(input), None, "{input}");
        }
    }

    #[test]
    fn instant_keeps_offset_and_drops_subseconds() {
        let instant = DateTime::parse_from_rfc3339("2024-03-15T10:30:45.678+05:30").unwrap();
        let stamp = BuildTimestamp::new(instant);
        assert_eq!(stamp.to_fhir_string(), "2024-03-15T10:30:45+05:30");

        let utc = DateTime::parse_from_rfc3339("2024-03-15T05:00:45Z").unwrap();
        assert_eq!(BuildTimestamp::new(utc).to_string(), "2024-03-15T05:00:45+00:00");
    }

    #[test]
    fn now_has_explicit_offset() {
        let text = now_with_offset().to_fhir_string();
        assert_eq!(text.len(), 25);
        assert!(matches!(&text[19..20], "+" | "-"));
        assert_eq!(&text[22..23], ":");
    }
}
