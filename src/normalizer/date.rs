//! Lenient feed date parsing.
//!
//! Feeds routinely break their own format's date rules, so each dialect's
//! preferred format is tried first and a fixed list of alternates after it.
//! A date that matches nothing yields `None`; it never fails the item.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// RSS: RFC 822/2822 first.
    Rfc2822First,
    /// Atom and JSON Feed: RFC 3339 first.
    Rfc3339First,
}

const OFFSET_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S %z",
    "%a, %d %b %Y %H:%M %z",
    "%d %b %Y %H:%M:%S %z",
    "%a, %d %B %Y %H:%M:%S %z",
    "%A, %d %B %Y %H:%M:%S %z",
    "%a %b %d %H:%M:%S %z %Y",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%dT%H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%a, %d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%a, %d %b %Y", "%d %b %Y", "%B %d, %Y"];

/// Zone names seen in the wild that the RFC parsers reject or misread.
const ZONE_ABBREVIATIONS: &[(&str, &str)] = &[
    ("UTC", "+0000"),
    ("GMT", "+0000"),
    ("UT", "+0000"),
    ("Z", "+0000"),
    ("EST", "-0500"),
    ("EDT", "-0400"),
    ("CST", "-0600"),
    ("CDT", "-0500"),
    ("MST", "-0700"),
    ("MDT", "-0600"),
    ("PST", "-0800"),
    ("PDT", "-0700"),
    ("AKST", "-0900"),
    ("AKDT", "-0800"),
    ("HST", "-1000"),
    ("WET", "+0000"),
    ("BST", "+0100"),
    ("CET", "+0100"),
    ("CEST", "+0200"),
    ("EET", "+0200"),
    ("EEST", "+0300"),
    ("MSK", "+0300"),
    ("JST", "+0900"),
    ("KST", "+0900"),
    ("AEST", "+1000"),
    ("AEDT", "+1100"),
    ("NZST", "+1200"),
    ("NZDT", "+1300"),
];

/// Parse a feed date, trying the style's preferred format first.
pub fn parse_date(raw: &str, style: DateStyle) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // A weekday that disagrees with the date is ignored rather than fatal.
    let parsed = parse_any(raw, style)
        .or_else(|| strip_weekday(raw).and_then(|rest| parse_any(rest, style)));

    if parsed.is_none() {
        tracing::debug!(date = raw, "Unrecognized date format, leaving unset");
    }
    parsed
}

fn parse_any(raw: &str, style: DateStyle) -> Option<DateTime<Utc>> {
    replace_zone_abbreviation(raw)
        .and_then(|replaced| parse_with_offsets(&replaced, style))
        .or_else(|| parse_with_offsets(raw, style))
        .or_else(|| parse_naive(raw))
}

fn parse_with_offsets(raw: &str, style: DateStyle) -> Option<DateTime<Utc>> {
    let rfc2822 = || DateTime::parse_from_rfc2822(raw).ok();
    let rfc3339 = || DateTime::parse_from_rfc3339(raw).ok();

    let primary = match style {
        DateStyle::Rfc2822First => rfc2822().or_else(rfc3339),
        DateStyle::Rfc3339First => rfc3339().or_else(rfc2822),
    };

    primary
        .or_else(|| {
            OFFSET_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
        })
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_naive(raw: &str) -> Option<DateTime<Utc>> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Swap a trailing zone abbreviation for its numeric offset.
fn replace_zone_abbreviation(raw: &str) -> Option<String> {
    let (head, zone) = raw.rsplit_once(' ')?;
    let zone = zone.trim_matches(|c| c == '(' || c == ')');
    ZONE_ABBREVIATIONS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(zone))
        .map(|(_, offset)| format!("{} {}", head.trim_end(), offset))
}

/// The text after a leading `"<word>, "` day name.
fn strip_weekday(raw: &str) -> Option<&str> {
    let (day, rest) = raw.split_once(',')?;
    let rest = rest.trim_start();
    (!day.is_empty() && day.chars().all(|c| c.is_ascii_alphabetic()) && !rest.is_empty())
        .then_some(rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_rfc2822() {
        assert_eq!(
            parse_date("Mon, 01 Jan 2024 00:00:00 GMT", DateStyle::Rfc2822First),
            Some(utc(2024, 1, 1, 0, 0, 0))
        );
        assert_eq!(
            parse_date("Tue, 02 Jan 2024 10:00:00 +0200", DateStyle::Rfc2822First),
            Some(utc(2024, 1, 2, 8, 0, 0))
        );
    }

    #[test]
    fn test_rfc3339() {
        assert_eq!(
            parse_date("2003-12-13T08:29:29-04:00", DateStyle::Rfc3339First),
            Some(utc(2003, 12, 13, 12, 29, 29))
        );
        assert_eq!(
            parse_date("2024-01-01T00:00:00Z", DateStyle::Rfc3339First),
            Some(utc(2024, 1, 1, 0, 0, 0))
        );
    }

    #[test]
    fn test_falls_back_across_styles() {
        // RSS feeds sometimes carry ISO dates and vice versa.
        assert_eq!(
            parse_date("2024-01-01T00:00:00Z", DateStyle::Rfc2822First),
            Some(utc(2024, 1, 1, 0, 0, 0))
        );
        assert_eq!(
            parse_date("Mon, 01 Jan 2024 00:00:00 +0000", DateStyle::Rfc3339First),
            Some(utc(2024, 1, 1, 0, 0, 0))
        );
    }

    #[test]
    fn test_offset_without_colon() {
        assert_eq!(
            parse_date("2024-01-01T05:00:00+0500", DateStyle::Rfc3339First),
            Some(utc(2024, 1, 1, 0, 0, 0))
        );
    }

    #[test]
    fn test_zone_abbreviation() {
        assert_eq!(
            parse_date("Mon, 01 Jan 2024 10:00:00 CEST", DateStyle::Rfc2822First),
            Some(utc(2024, 1, 1, 8, 0, 0))
        );
        assert_eq!(
            parse_date("Mon, 01 Jan 2024 00:00:00 PST", DateStyle::Rfc2822First),
            Some(utc(2024, 1, 1, 8, 0, 0))
        );
    }

    #[test]
    fn test_wrong_weekday_is_ignored() {
        // 2024-01-01 was a Monday.
        assert_eq!(
            parse_date("Tue, 01 Jan 2024 00:00:00 GMT", DateStyle::Rfc2822First),
            Some(utc(2024, 1, 1, 0, 0, 0))
        );
        assert_eq!(
            parse_date("Friday, 01 Jan 2024 10:00:00 +0200", DateStyle::Rfc3339First),
            Some(utc(2024, 1, 1, 8, 0, 0))
        );
        assert_eq!(strip_weekday("Tue, 01 Jan 2024"), Some("01 Jan 2024"));
        assert_eq!(strip_weekday("January 5, 2024"), None);
        assert_eq!(strip_weekday("2024-01-01"), None);
    }

    #[test]
    fn test_naive_datetime_is_utc() {
        assert_eq!(
            parse_date("2024-03-04 05:06:07", DateStyle::Rfc2822First),
            Some(utc(2024, 3, 4, 5, 6, 7))
        );
        assert_eq!(
            parse_date("2024-03-04T05:06:07", DateStyle::Rfc3339First),
            Some(utc(2024, 3, 4, 5, 6, 7))
        );
    }

    #[test]
    fn test_date_only() {
        assert_eq!(
            parse_date("2024-03-04", DateStyle::Rfc3339First),
            Some(utc(2024, 3, 4, 0, 0, 0))
        );
        assert_eq!(
            parse_date("04 Mar 2024", DateStyle::Rfc2822First),
            Some(utc(2024, 3, 4, 0, 0, 0))
        );
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(parse_date("", DateStyle::Rfc2822First), None);
        assert_eq!(parse_date("   ", DateStyle::Rfc3339First), None);
        assert_eq!(parse_date("yesterday-ish", DateStyle::Rfc2822First), None);
        assert_eq!(parse_date("2024-13-45", DateStyle::Rfc3339First), None);
    }

    #[test]
    fn test_replace_zone_abbreviation() {
        assert_eq!(
            replace_zone_abbreviation("Mon, 01 Jan 2024 10:00:00 EDT").as_deref(),
            Some("Mon, 01 Jan 2024 10:00:00 -0400")
        );
        assert_eq!(replace_zone_abbreviation("2024-01-01"), None);
        assert_eq!(replace_zone_abbreviation("Mon, 01 Jan 2024 10:00:00 XYZ"), None);
    }
}
