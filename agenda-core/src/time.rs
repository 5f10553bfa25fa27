//! Date and time-of-day normalization.
//!
//! Dates are pure calendar dates (`NaiveDate`), so comparisons between
//! "today" and an appointment date never depend on the time of day or the
//! local UTC offset. Times of day are kept as canonical `HH:MM` strings.

use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use regex::Regex;

/// `H:MM` or `HH:MM`, optionally followed by `AM`/`PM`.
static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]{1,2}):([0-9]{2})(?:\s*(AM|PM))?").expect("time pattern compiles")
});

/// Normalize a time-of-day string to 24-hour `HH:MM`.
///
/// Takes the leftmost `H:MM` or `HH:MM` in the input, optionally followed by
/// `AM`/`PM` (case-insensitive). Input without a recognizable time is
/// returned trimmed and otherwise unchanged.
pub fn normalize_time(input: &str) -> String {
    let trimmed = input.trim();

    let Some(caps) = TIME_PATTERN.captures(trimmed) else {
        return trimmed.to_string();
    };
    let Ok(hours) = caps[1].parse::<u32>() else {
        return trimmed.to_string();
    };

    let meridiem = caps.get(3).map(|m| m.as_str().to_ascii_uppercase());
    let hours = match meridiem.as_deref() {
        Some("PM") if hours != 12 => hours + 12,
        Some("AM") if hours == 12 => 0,
        _ => hours,
    };

    format!("{:02}:{}", hours, &caps[2])
}

/// Parse a time-of-day string (any form `normalize_time` understands).
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(&normalize_time(input), "%H:%M").ok()
}

/// Pad loose `H:M` input for display (`9:5` becomes `09:05`). Anything
/// else goes through [`normalize_time`].
pub fn format_time_display(input: &str) -> String {
    let trimmed = input.trim();
    if let Some((h, m)) = trimmed.split_once(':') {
        if let (Ok(h), Ok(m)) = (h.parse::<u32>(), m.parse::<u32>()) {
            if h < 24 && m < 60 {
                return format!("{:02}:{:02}", h, m);
            }
        }
    }
    normalize_time(trimmed)
}

/// Serialize a calendar date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a calendar date.
///
/// `YYYY-MM-DD` (with unpadded components tolerated) is tried first, then
/// RFC 3339 timestamps, `YYYY/MM/DD` and `DD/MM/YYYY`.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let s = input.trim();

    let parts: Vec<&str> = s.split('-').collect();
    if parts.len() == 3 {
        if let (Ok(y), Ok(m), Ok(d)) = (
            parts[0].parse::<i32>(),
            parts[1].parse::<u32>(),
            parts[2].parse::<u32>(),
        ) {
            return NaiveDate::from_ymd_opt(y, m, d);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }

    ["%Y/%m/%d", "%d/%m/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Local wall-clock start of an appointment. An unreadable time falls back
/// to the start of the day.
pub fn appointment_start(date: NaiveDate, time: &str) -> NaiveDateTime {
    let time = parse_time(time).unwrap_or(NaiveTime::MIN);
    date.and_time(time)
}

/// Resolve a local wall-clock date-time to an instant. Ambiguous times take
/// the earliest instant; nonexistent ones (DST gaps) are read as UTC.
pub fn to_local(naive: NaiveDateTime) -> DateTime<Local> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_time_converts_meridiem() {
        assert_eq!(normalize_time("2:30 pm"), "14:30");
        assert_eq!(normalize_time("12:00 AM"), "00:00");
        assert_eq!(normalize_time("12:15 PM"), "12:15");
        assert_eq!(normalize_time("11:45am"), "11:45");
    }

    #[test]
    fn normalize_time_pads_and_keeps_24h() {
        assert_eq!(normalize_time("09:05"), "09:05");
        assert_eq!(normalize_time("9:05"), "09:05");
        assert_eq!(normalize_time("  18:00 "), "18:00");
    }

    #[test]
    fn normalize_time_finds_time_inside_text() {
        assert_eq!(normalize_time("at 7:05PM sharp"), "19:05");
        assert_eq!(normalize_time("10:30 Pm"), "22:30");
        assert_eq!(normalize_time("10:30 later"), "10:30");
    }

    #[test]
    fn normalize_time_takes_first_match() {
        assert_eq!(normalize_time("10:00 - 11:00"), "10:00");
        assert_eq!(normalize_time("starts 123:45"), "23:45");
    }

    #[test]
    fn normalize_time_passes_through_unrecognized_input() {
        assert_eq!(normalize_time("  noon "), "noon");
        assert_eq!(normalize_time(""), "");
        assert_eq!(normalize_time("9:5"), "9:5");
    }

    #[test]
    fn display_pads_loose_times() {
        assert_eq!(format_time_display("9:5"), "09:05");
        assert_eq!(format_time_display("14:30"), "14:30");
        assert_eq!(format_time_display("2:30 PM"), "14:30");
        assert_eq!(format_time_display("later"), "later");
    }

    #[test]
    fn format_and_parse_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(format_date(date), "2024-03-01");
        assert_eq!(parse_date("2024-03-01"), Some(date));
        assert_eq!(parse_date("2024-3-1"), Some(date));
    }

    #[test]
    fn parse_date_fallbacks() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(parse_date("2024-03-01T23:30:00Z"), Some(date));
        assert_eq!(parse_date("2024/03/01"), Some(date));
        assert_eq!(parse_date("01/03/2024"), Some(date));
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2024-02-30"), None);
    }

    #[test]
    fn appointment_start_falls_back_to_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            appointment_start(date, "2:30 pm"),
            date.and_hms_opt(14, 30, 0).unwrap()
        );
        assert_eq!(
            appointment_start(date, "whenever"),
            date.and_hms_opt(0, 0, 0).unwrap()
        );
    }
}
