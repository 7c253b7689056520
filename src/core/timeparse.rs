//! Purpose: Parse loosely formatted, human-entered date/time strings.
//! Exports: `parse_time`, `ZERO_TIME`.
//! Role: Fallback used when a non-numeric value is read as a timestamp.
//! Invariants: The layout is chosen from the string length and the separator
//!             present (`.`, `-`, `/`), never from explicit format tags.
//! Invariants: Inputs without an offset are interpreted as UTC.
//! Notes: Length/separator dispatch is ambiguous by construction (a bare
//!        10-digit string is always Unix seconds); keep it stable.

use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::macros::{datetime, format_description};
use time::parsing::Parsable;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use super::error::{Error, ErrorKind};

/// Result for empty input and for failed coercions.
pub const ZERO_TIME: OffsetDateTime = datetime!(0001-01-01 0:00 UTC);

// Widths of "Mon, 02 Jan 2006 15:04:05 -0700", "2006-01-02T15:04:05+07:00"
// and "2006-01-02T15:04:05.999999999+07:00".
const RFC1123Z_LEN: usize = 31;
const RFC3339_LEN: usize = 25;
const RFC3339_NANO_LEN: usize = 35;

pub fn parse_time(input: &str) -> Result<OffsetDateTime, Error> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(ZERO_TIME);
    }
    if separator_after_start(trimmed, 'Z') {
        return OffsetDateTime::parse(trimmed, &Rfc3339).map_err(|err| invalid(trimmed, err));
    }
    let spaced;
    let s = if separator_after_start(trimmed, 'T') {
        spaced = trimmed.replacen('T', " ", 1);
        spaced.as_str()
    } else {
        trimmed
    };

    let dot = separator_after_start(s, '.');
    let dash = separator_after_start(s, '-');
    let slash = separator_after_start(s, '/');

    let parsed = match s.len() {
        6 => date_utc(&expand_short_year(s)?, format_description!("[day].[month].[year]")),
        8 => date_utc(&expand_short_year(s)?, format_description!("[day].[month].[year]")),
        10 if dot => date_utc(s, format_description!("[day].[month].[year]")),
        10 if dash => date_utc(s, format_description!("[year]-[month]-[day]")),
        10 if slash => date_utc(s, format_description!("[year]/[month]/[day]")),
        10 => return unix_seconds(s),
        16 if dash => naive_utc(s, format_description!("[year]-[month]-[day] [hour]:[minute]")),
        16 if slash => naive_utc(s, format_description!("[year]/[month]/[day] [hour]:[minute]")),
        16 if dot => naive_utc(s, format_description!("[day].[month].[year] [hour]:[minute]")),
        19 if dash => naive_utc(
            s,
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        ),
        19 if slash => naive_utc(
            s,
            format_description!("[year]/[month]/[day] [hour]:[minute]:[second]"),
        ),
        19 if dot => naive_utc(
            s,
            format_description!("[day].[month].[year] [hour]:[minute]:[second]"),
        ),
        29 if dash => naive_utc(
            s,
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        ),
        29 if slash => naive_utc(
            s,
            format_description!("[year]/[month]/[day] [hour]:[minute]:[second].[subsecond]"),
        ),
        29 if dot => naive_utc(
            s,
            format_description!("[day].[month].[year] [hour]:[minute]:[second].[subsecond]"),
        ),
        RFC1123Z_LEN => OffsetDateTime::parse(trimmed, &Rfc2822),
        // The RFC 3339 profiles need their `T` back.
        RFC3339_LEN | RFC3339_NANO_LEN => OffsetDateTime::parse(trimmed, &Rfc3339),
        _ => return Err(unknown_format(trimmed)),
    };
    parsed.map_err(|err| invalid(trimmed, err))
}

fn separator_after_start(s: &str, sep: char) -> bool {
    s.find(sep).is_some_and(|idx| idx > 0)
}

fn date_utc(
    input: &str,
    description: &(impl Parsable + ?Sized),
) -> Result<OffsetDateTime, time::error::Parse> {
    Date::parse(input, description).map(|date| date.midnight().assume_utc())
}

fn naive_utc(
    input: &str,
    description: &(impl Parsable + ?Sized),
) -> Result<OffsetDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(input, description).map(PrimitiveDateTime::assume_utc)
}

/// Rewrites `DDMMYY` / `DD.MM.YY` into `DD.MM.YYYY`; two-digit years from 69
/// on belong to the 1900s, the rest to the 2000s.
fn expand_short_year(s: &str) -> Result<String, Error> {
    if !s.is_ascii() {
        return Err(unknown_format(s));
    }
    let (day, month, yy) = match s.len() {
        6 => (&s[0..2], &s[2..4], &s[4..6]),
        _ if &s[2..3] == "." && &s[5..6] == "." => (&s[0..2], &s[3..5], &s[6..8]),
        _ => return Err(unknown_format(s)),
    };
    if !yy.bytes().all(|b| b.is_ascii_digit()) {
        return Err(unknown_format(s));
    }
    let yy: u32 = yy.parse().map_err(|_| unknown_format(s))?;
    let century = if yy >= 69 { 1900 } else { 2000 };
    Ok(format!("{day}.{month}.{}", century + yy))
}

fn unix_seconds(s: &str) -> Result<OffsetDateTime, Error> {
    let seconds: i64 = s.parse().map_err(|err| {
        Error::new(ErrorKind::TimeFormat)
            .with_message(format!("invalid unix timestamp `{s}`"))
            .with_source(err)
    })?;
    OffsetDateTime::from_unix_timestamp(seconds).map_err(|err| {
        Error::new(ErrorKind::TimeFormat)
            .with_message(format!("unix timestamp out of range `{s}`"))
            .with_source(err)
    })
}

fn unknown_format(s: &str) -> Error {
    Error::new(ErrorKind::TimeFormat).with_message(format!("unknown time-format: `{s}`"))
}

fn invalid(s: &str, err: time::error::Parse) -> Error {
    Error::new(ErrorKind::TimeFormat)
        .with_message(format!("invalid time `{s}`"))
        .with_source(err)
}
