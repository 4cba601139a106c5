//! Timestamp parsing for the Tracker wire format.
//!
//! The server encodes an optional instant as either an empty element or
//! `<naive datetime> <ZONE>`, where `ZONE` is a 3-4 letter abbreviation
//! (e.g. `PST`) or a signed 4-digit offset (e.g. `-0800`). Abbreviations
//! are resolved through a fixed table; anything alphabetic outside the
//! table is an error, never a silent fallback.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;

use crate::error::{Error, Result};

/// Trailing zone token: a bare 3-4 letter word or a signed 4-digit offset
/// at the very end of the string.
static ZONE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\b[A-Za-z]{3,4}|[+-]?\d{4})$").unwrap());

/// Signed 4-digit numeric offset, e.g. `+1030` or `-0800`.
static NUMERIC_OFFSET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?\d{4}$").unwrap());

/// Fixed abbreviation table, offsets in `±hhmm` form.
///
/// The table intentionally keeps ambiguous duplicates (BST, SST, SAT, ...);
/// resolution takes the first match in table order.
const TIME_ZONES: &[(&str, &str)] = &[
    ("ACDT", "+1030"),
    ("ACST", "+0930"),
    ("ADT", "-0300"),
    ("AEDT", "+1100"),
    ("AEST", "+1000"),
    ("AHDT", "-0900"),
    ("AHST", "-1000"),
    ("AST", "-0400"),
    ("AT", "-0200"),
    ("AWDT", "+0900"),
    ("AWST", "+0800"),
    ("BAT", "+0300"),
    ("BDST", "+0200"),
    ("BET", "-1100"),
    ("BST", "-0300"),
    ("BT", "+0300"),
    ("BZT2", "-0300"),
    ("CADT", "+1030"),
    ("CAST", "+0930"),
    ("CAT", "-1000"),
    ("CCT", "+0800"),
    ("CDT", "-0500"),
    ("CED", "+0200"),
    ("CET", "+0100"),
    ("CEST", "+0200"),
    ("CST", "-0600"),
    ("CENTRAL", "-0600"),
    ("EAST", "+1000"),
    ("EDT", "-0400"),
    ("EED", "+0300"),
    ("EET", "+0200"),
    ("EEST", "+0300"),
    ("EST", "-0500"),
    ("EASTERN", "-0500"),
    ("FST", "+0200"),
    ("FWT", "+0100"),
    ("GMT", "-0000"),
    ("GST", "+1000"),
    ("HDT", "-0900"),
    ("HST", "-1000"),
    ("IDLE", "+1200"),
    ("IDLW", "-1200"),
    ("IST", "+0530"),
    ("ICT", "+0700"),
    ("IT", "+0330"),
    ("JST", "+0900"),
    ("JT", "+0700"),
    ("MDT", "-0600"),
    ("MED", "+0200"),
    ("MET", "+0100"),
    ("MEST", "+0200"),
    ("MEWT", "+0100"),
    ("MST", "-0700"),
    ("MSK", "+0400"),
    ("MOUNTAIN", "-0700"),
    ("MT", "+0800"),
    ("NDT", "-0230"),
    ("NFT", "-0330"),
    ("NT", "-1100"),
    ("NST", "+0630"),
    ("NZ", "+1100"),
    ("NZST", "+1200"),
    ("NZDT", "+1300"),
    ("NZT", "+1200"),
    ("PDT", "-0700"),
    ("PST", "-0800"),
    ("PACIFIC", "-0800"),
    ("ROK", "+0900"),
    ("SAD", "+1000"),
    ("SAST", "+0900"),
    ("SAT", "+0900"),
    ("SDT", "+1000"),
    ("SST", "+0200"),
    ("SWT", "+0100"),
    ("USZ3", "+0400"),
    ("USZ4", "+0500"),
    ("USZ5", "+0600"),
    ("USZ6", "+0700"),
    ("UT", "-0000"),
    ("UTC", "-0000"),
    ("UZ10", "+1100"),
    ("WAT", "-0100"),
    ("WET", "-0000"),
    ("WST", "+0800"),
    ("YDT", "-0800"),
    ("YST", "-0900"),
    ("ZP4", "+0400"),
    ("ZP5", "+0500"),
    ("ZP6", "+0600"),
];

/// Resolve an abbreviation to its UTC offset in minutes. Case-insensitive,
/// first table match wins.
pub fn zone_offset_minutes(abbr: &str) -> Option<i32> {
    let upper = abbr.to_uppercase();
    TIME_ZONES
        .iter()
        .find(|(name, _)| *name == upper)
        .and_then(|(_, offset)| numeric_offset_minutes(offset))
}

/// Parse a `±hhmm` offset into minutes. `-0000` maps to zero.
fn numeric_offset_minutes(token: &str) -> Option<i32> {
    if !NUMERIC_OFFSET.is_match(token) {
        return None;
    }
    let (sign, digits) = match token.as_bytes()[0] {
        b'-' => (-1, &token[1..]),
        b'+' => (1, &token[1..]),
        _ => (1, token),
    };
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    Some(sign * (hours * 60 + minutes))
}

fn parse_naive(value: &str) -> Result<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"];
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(d.and_time(NaiveTime::MIN));
        }
    }
    Err(Error::malformed_timestamp(value))
}

/// Parse an optional wire timestamp.
///
/// Empty or whitespace-only input is "no value", not an error. Input with
/// no trailing zone token is interpreted in the host's local zone. Input
/// with a zone token is interpreted at the resolved fixed offset and
/// anchored through the absolute instant.
pub fn parse(raw: &str) -> Result<Option<DateTime<Utc>>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let Some(m) = ZONE_TOKEN.find(trimmed) else {
        let naive = parse_naive(trimmed)?;
        let local = Local
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| Error::malformed_timestamp(trimmed))?;
        return Ok(Some(local.with_timezone(&Utc)));
    };

    let token = m.as_str();
    let offset_minutes = match numeric_offset_minutes(token) {
        Some(minutes) => minutes,
        None => zone_offset_minutes(token).ok_or_else(|| Error::unknown_time_zone(token))?,
    };

    let naive = parse_naive(trimmed[..m.start()].trim())?;
    let offset = FixedOffset::east_opt(offset_minutes * 60)
        .ok_or_else(|| Error::malformed_timestamp(trimmed))?;
    let instant = offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| Error::malformed_timestamp(trimmed))?;

    Ok(Some(instant.with_timezone(&Utc)))
}

/// Render an optional instant in the wire form.
///
/// The wall clock is written at offset zero with a literal `" UTC"` suffix,
/// so re-parsing the output denotes the same instant. An absent value
/// renders nothing and the field is omitted.
pub fn format(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}
