//! Timestamp rendering for date and datetime columns.

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use color_eyre::eyre::eyre;
use color_eyre::Result;

use super::js_number_string;
use crate::value::CellValue;

/// Wall-clock layout used for temporal cells, e.g. `Nov 14, 10:13 PM`.
pub const WALL_CLOCK_FORMAT: &str = "%b %-d, %-I:%M %p";

/// Time zone temporal cells are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    /// The zone of the running process
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl DisplayZone {
    pub fn utc() -> Self {
        DisplayZone::Fixed(Utc.fix())
    }

    /// Parse `local`, `utc`/`z`, or a numeric offset such as `+02:00`, `-0530` or `+09`.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "local" => return Ok(DisplayZone::Local),
            "utc" | "z" => return Ok(DisplayZone::utc()),
            _ => {}
        }

        let invalid = || eyre!("Invalid time zone '{}': expected local, utc or +HH:MM", s);
        let (sign, rest) = match trimmed.chars().next() {
            Some('+') => (1, &trimmed[1..]),
            Some('-') => (-1, &trimmed[1..]),
            _ => return Err(invalid()),
        };
        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let (hours, minutes) = match digits.len() {
            2 => (&digits[..2], "0"),
            4 => (&digits[..2], &digits[2..]),
            _ => return Err(invalid()),
        };
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if minutes >= 60 {
            return Err(invalid());
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(DisplayZone::Fixed)
            .ok_or_else(invalid)
    }

    pub fn render(&self, instant: DateTime<Utc>) -> String {
        match self {
            DisplayZone::Local => instant
                .with_timezone(&Local)
                .format(WALL_CLOCK_FORMAT)
                .to_string(),
            DisplayZone::Fixed(offset) => instant
                .with_timezone(offset)
                .format(WALL_CLOCK_FORMAT)
                .to_string(),
        }
    }
}

/// Result of rendering one cell of a temporal column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemporalOutcome {
    /// The cell's display text (empty for null, unchanged for text)
    Formatted(String),
    /// The number had no recognizable unit; carries its plain string form
    InvalidTimestamp(String),
}

impl TemporalOutcome {
    pub fn text(&self) -> &str {
        match self {
            TemporalOutcome::Formatted(s) | TemporalOutcome::InvalidTimestamp(s) => s,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            TemporalOutcome::Formatted(s) | TemporalOutcome::InvalidTimestamp(s) => s,
        }
    }
}

/// Count digits of the integer part of `|n|`.
fn integer_digit_count(n: f64) -> usize {
    let int = n.abs().trunc();
    if int < 1.0 {
        1
    } else {
        format!("{:.0}", int).len()
    }
}

/// Interpret a numeric timestamp by magnitude: 10 integer digits are epoch
/// seconds, 13 are epoch milliseconds. Anything else is not a timestamp.
pub fn timestamp_millis(n: f64) -> Option<i64> {
    if !n.is_finite() {
        return None;
    }
    let millis = match integer_digit_count(n) {
        10 => (n * 1000.0).trunc(),
        13 => n.trunc(),
        _ => return None,
    };
    Some(millis as i64)
}

/// Render one cell of a date/datetime column.
pub fn format_temporal(value: &CellValue, zone: &DisplayZone) -> TemporalOutcome {
    match value {
        CellValue::Null => TemporalOutcome::Formatted(String::new()),
        CellValue::Text(s) => TemporalOutcome::Formatted(s.clone()),
        CellValue::Instant(instant) => TemporalOutcome::Formatted(zone.render(*instant)),
        CellValue::Number(n) => match timestamp_millis(*n).and_then(DateTime::from_timestamp_millis)
        {
            Some(instant) => TemporalOutcome::Formatted(zone.render(instant)),
            None => TemporalOutcome::InvalidTimestamp(js_number_string(*n)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_seconds_and_millis_agree() {
        let utc = DisplayZone::utc();
        let secs = format_temporal(&CellValue::Number(1_700_000_000.0), &utc);
        let millis = format_temporal(&CellValue::Number(1_700_000_000_000.0), &utc);
        assert_eq!(secs, TemporalOutcome::Formatted("Nov 14, 10:13 PM".to_string()));
        assert_eq!(secs, millis);
    }

    #[test]
    fn test_fixed_offset_rendering() {
        let zone = DisplayZone::parse("+02:00").unwrap();
        let out = format_temporal(&CellValue::Number(1_700_000_000.0), &zone);
        assert_eq!(out.text(), "Nov 15, 12:13 AM");
    }

    #[test]
    fn test_unrecognized_magnitude_falls_back() {
        let utc = DisplayZone::utc();
        assert_eq!(
            format_temporal(&CellValue::Number(12345.0), &utc),
            TemporalOutcome::InvalidTimestamp("12345".to_string())
        );
        assert_eq!(
            format_temporal(&CellValue::Number(f64::NAN), &utc),
            TemporalOutcome::InvalidTimestamp("NaN".to_string())
        );
    }

    #[test]
    fn test_null_text_and_instant() {
        let utc = DisplayZone::utc();
        assert_eq!(format_temporal(&CellValue::Null, &utc).text(), "");
        assert_eq!(
            format_temporal(&CellValue::Text("yesterday".into()), &utc).text(),
            "yesterday"
        );
        let instant = Utc.with_ymd_and_hms(2024, 3, 5, 9, 7, 0).unwrap();
        assert_eq!(
            format_temporal(&CellValue::Instant(instant), &utc).text(),
            "Mar 5, 9:07 AM"
        );
    }

    #[test]
    fn test_fractional_seconds_use_integer_digits() {
        assert_eq!(timestamp_millis(1_700_000_000.75), Some(1_700_000_000_750));
        assert_eq!(timestamp_millis(999_999_999.0), None);
    }

    #[test]
    fn test_parse_zone() {
        assert_eq!(DisplayZone::parse("local").unwrap(), DisplayZone::Local);
        assert_eq!(DisplayZone::parse("UTC").unwrap(), DisplayZone::utc());
        let DisplayZone::Fixed(offset) = DisplayZone::parse("-0530").unwrap() else {
            panic!("expected fixed offset");
        };
        assert_eq!(offset.local_minus_utc(), -(5 * 3600 + 30 * 60));
        assert!(DisplayZone::parse("+25:00").is_err());
        assert!(DisplayZone::parse("Mars/Olympus").is_err());
    }
}
