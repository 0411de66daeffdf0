//! ISO8601 and RFC 822 codecs for dates, times and datetimes.
//!
//! The ISO8601 grammar accepted here is loose about padding
//! (`2024-1-5 9:03` parses) and strict about everything else: every pattern
//! is anchored to the whole input, so trailing garbage is an error rather
//! than silently dropped.

use crate::consts::{
    FRACTION_DIGITS, INVALID_DATE, INVALID_DATETIME, INVALID_TIME, MAX_YEAR, MICROS_PER_SECOND,
    MINUTES_PER_HOUR, MIN_YEAR, NANOS_PER_MICRO, RFC822_FORMAT, RFC822_UNKNOWN_OFFSET,
    SECONDS_PER_DAY, SECONDS_PER_MINUTE, UTC_DESIGNATOR,
};
use crate::prelude::*;
use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone,
    Timelike,
};
use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt;
use std::str::FromStr;

static ISO8601_DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<year>[0-9]{4})-(?P<month>[0-9]{1,2})-(?P<day>[0-9]{1,2})[T ](?P<hour>[0-9]{1,2}):(?P<minute>[0-9]{1,2})(?::(?P<second>[0-9]{1,2})(?:\.(?P<microsecond>[0-9]{1,6})[0-9]{0,6})?)?(?P<tzinfo>Z|[+-][0-9]{2}(?::?[0-9]{2})?)?$",
    )
    .expect("ISO8601 datetime pattern is valid")
});

static ISO8601_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<hour>[0-9]{1,2}):(?P<minute>[0-9]{1,2})(?::(?P<second>[0-9]{1,2})(?:\.(?P<microsecond>[0-9]{1,6})[0-9]{0,6})?)?$",
    )
    .expect("ISO8601 time pattern is valid")
});

static ISO8601_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<year>[0-9]{4})-(?P<month>[0-9]{1,2})-(?P<day>[0-9]{1,2})$")
        .expect("ISO8601 date pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ParseError {
    /// The input did not match the expected layout
    #[display(fmt = "{_0}")]
    InvalidFormat(&'static str),
    #[display(fmt = "Invalid {field}: {value}")]
    OutOfRange { field: &'static str, value: i64 },
    #[display(fmt = "Invalid date: {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[display(fmt = "Invalid time: {hour:02}:{minute:02}:{second:02}.{microsecond:06}")]
    InvalidTime {
        hour: u32,
        minute: u32,
        second: u32,
        microsecond: u32,
    },
    #[display(fmt = "Invalid UTC offset: {seconds}s (must be strictly between -24h and 24h)")]
    InvalidOffset { seconds: i64 },
    #[display(fmt = "UTC offset must be a whole number of seconds: {_0}")]
    FractionalOffset(String),
    #[display(fmt = "Not a valid RFC 822 datetime string: {_0}")]
    InvalidRfc822(String),
}

impl std::error::Error for ParseError {}

/// A datetime that may or may not carry a fixed UTC offset.
///
/// A value without an offset is "naive": it names a wall-clock reading
/// with no statement about where on Earth it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IsoDateTime {
    naive: NaiveDateTime,
    offset: Option<FixedOffset>,
}

impl IsoDateTime {
    /// A datetime with no timezone attached
    pub const fn naive(naive: NaiveDateTime) -> Self {
        Self {
            naive,
            offset: None,
        }
    }

    /// A datetime whose wall-clock fields are local to `offset`
    pub const fn with_offset(naive: NaiveDateTime, offset: FixedOffset) -> Self {
        Self {
            naive,
            offset: Some(offset),
        }
    }

    /// Wall-clock fields, in the value's own offset when it has one
    pub const fn local(&self) -> NaiveDateTime {
        self.naive
    }

    pub const fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    /// Returns the zoned datetime, or `None` for a naive value
    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        self.offset
            .and_then(|offset| offset.from_local_datetime(&self.naive).single())
    }
}

impl From<NaiveDateTime> for IsoDateTime {
    fn from(naive: NaiveDateTime) -> Self {
        Self::naive(naive)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for IsoDateTime {
    fn from(value: DateTime<Tz>) -> Self {
        Self::with_offset(value.naive_local(), value.offset().fix())
    }
}

impl fmt::Display for IsoDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_datetime_iso(self))
    }
}

impl FromStr for IsoDateTime {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_iso_datetime(s)
    }
}

impl serde::Serialize for IsoDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for IsoDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Anything that can report the UTC offset it carries.
pub trait UtcOffset {
    fn utc_offset(&self) -> Option<FixedOffset>;
}

impl UtcOffset for IsoDateTime {
    fn utc_offset(&self) -> Option<FixedOffset> {
        self.offset
    }
}

impl UtcOffset for NaiveDateTime {
    fn utc_offset(&self) -> Option<FixedOffset> {
        None
    }
}

impl UtcOffset for NaiveTime {
    fn utc_offset(&self) -> Option<FixedOffset> {
        None
    }
}

impl<Tz: TimeZone> UtcOffset for DateTime<Tz> {
    fn utc_offset(&self) -> Option<FixedOffset> {
        Some(self.offset().fix())
    }
}

/// Returns true if `value` carries a UTC offset.
pub fn is_aware<T: UtcOffset + ?Sized>(value: &T) -> bool {
    value.utc_offset().is_some()
}

/// Input accepted by [`fixed_offset_timezone`].
#[derive(Debug, Clone, Copy, PartialEq, From)]
pub enum OffsetSpec {
    Seconds(i64),
    FractionalSeconds(f64),
    Span(TimeDelta),
}

impl From<i32> for OffsetSpec {
    fn from(seconds: i32) -> Self {
        Self::Seconds(i64::from(seconds))
    }
}

/// Builds a fixed-offset timezone from a count of seconds or a duration.
///
/// # Errors
/// Returns `ParseError::InvalidOffset` when the offset is a day or more in
/// either direction, and `ParseError::FractionalOffset` when it is not a
/// whole number of seconds.
pub fn fixed_offset_timezone(offset: impl Into<OffsetSpec>) -> Result<FixedOffset, ParseError> {
    let seconds = match offset.into() {
        OffsetSpec::Seconds(seconds) => seconds,
        OffsetSpec::FractionalSeconds(seconds) => {
            if !seconds.is_finite() || seconds.fract() != 0.0 {
                return Err(ParseError::FractionalOffset(seconds.to_string()));
            }
            whole_seconds(seconds)
        }
        OffsetSpec::Span(span) => {
            if span.subsec_nanos() != 0 {
                return Err(ParseError::FractionalOffset(span.to_string()));
            }
            span.num_seconds()
        }
    };

    i32::try_from(seconds)
        .ok()
        .and_then(FixedOffset::east_opt)
        .ok_or(ParseError::InvalidOffset { seconds })
}

/// Total microseconds in `value`, computed without floating point.
///
/// Precision below one microsecond is truncated toward zero.
pub fn timedelta_to_microseconds(value: TimeDelta) -> i128 {
    let days = value.num_days();
    let seconds = value.num_seconds() - days * SECONDS_PER_DAY;
    let microseconds = value.subsec_nanos() / NANOS_PER_MICRO;
    (i128::from(days) * i128::from(SECONDS_PER_DAY) + i128::from(seconds))
        * i128::from(MICROS_PER_SECOND)
        + i128::from(microseconds)
}

/// Parses `YYYY-MM-DD[T ]HH:MM[:SS[.ffffff]][Z|±HH[:MM]]`.
///
/// Up to twelve fractional digits are accepted; only the first six are
/// kept, without rounding. A `Z` designator yields a zero offset, a signed
/// designator yields that fixed offset, and no designator yields a naive
/// value.
///
/// # Errors
/// `ParseError::InvalidFormat` when the text does not match, or a range
/// error when a matched field is out of bounds.
pub fn parse_iso_datetime(value: &str) -> Result<IsoDateTime, ParseError> {
    let Some(caps) = ISO8601_DATETIME.captures(value) else {
        debug!("rejected ISO8601 datetime {value:?}");
        return Err(ParseError::InvalidFormat(INVALID_DATETIME));
    };

    let date = date_from_captures(&caps, INVALID_DATETIME)?;
    let time = time_from_captures(&caps, INVALID_DATETIME)?;
    let naive = date.and_time(time);

    match caps.name("tzinfo") {
        Some(tz) => Ok(IsoDateTime::with_offset(naive, parse_designator(tz.as_str())?)),
        None => Ok(IsoDateTime::naive(naive)),
    }
}

/// Parses `HH:MM[:SS[.ffffff]]`. Timezone designators are not accepted.
///
/// # Errors
/// `ParseError::InvalidFormat` when the text does not match, or
/// `ParseError::InvalidTime` when a field is out of range.
pub fn parse_iso_time(value: &str) -> Result<NaiveTime, ParseError> {
    let Some(caps) = ISO8601_TIME.captures(value) else {
        debug!("rejected ISO8601 time {value:?}");
        return Err(ParseError::InvalidFormat(INVALID_TIME));
    };
    time_from_captures(&caps, INVALID_TIME)
}

/// Parses `YYYY-MM-DD`.
///
/// # Errors
/// `ParseError::InvalidFormat` when the text does not match, or a range
/// error when the fields do not name a real day.
pub fn parse_iso_date(value: &str) -> Result<NaiveDate, ParseError> {
    let Some(caps) = ISO8601_DATE.captures(value) else {
        debug!("rejected ISO8601 date {value:?}");
        return Err(ParseError::InvalidFormat(INVALID_DATE));
    };
    date_from_captures(&caps, INVALID_DATE)
}

/// Formats as `YYYY-MM-DDTHH:MM:SS[.ffffff][±HH:MM[:SS]]`.
///
/// The fraction appears only when the microsecond field is non-zero; the
/// offset appears only for aware values, and a zero offset renders as
/// `+00:00`.
pub fn format_datetime_iso(value: &IsoDateTime) -> String {
    let mut out = value.naive.format("%Y-%m-%dT%H:%M:%S").to_string();
    let micros = (value.naive.nanosecond() % 1_000_000_000) / 1_000;
    if micros != 0 {
        out.push_str(&format!(".{micros:06}"));
    }
    if let Some(offset) = value.offset {
        out.push_str(&format_offset(offset, true));
    }
    out
}

/// Formats as RFC 822, e.g. `Mon, 15 Jan 2024 10:30:00 +0000`.
///
/// Naive values carry the `-0000` "unknown offset" zone. RFC 2822 zones
/// have minute resolution, so any seconds part of the offset is dropped.
pub fn format_datetime_rfc822(value: &IsoDateTime) -> String {
    let base = value.naive.format(RFC822_FORMAT);
    match value.offset {
        Some(offset) => format!("{base} {}", format_offset(offset, false)),
        None => format!("{base} {RFC822_UNKNOWN_OFFSET}"),
    }
}

/// Parses an RFC 822/2822 datetime.
///
/// A `-0000` zone means the offset is unknown and yields a naive value.
///
/// # Errors
/// `ParseError::InvalidRfc822` when chrono rejects the text.
pub fn parse_rfc822(value: &str) -> Result<IsoDateTime, ParseError> {
    let parsed = DateTime::parse_from_rfc2822(value).map_err(|e| {
        debug!("rejected RFC 822 datetime {value:?}: {e}");
        ParseError::InvalidRfc822(e.to_string())
    })?;
    if rfc822_zone(value).as_deref() == Some(RFC822_UNKNOWN_OFFSET) {
        Ok(IsoDateTime::naive(parsed.naive_local()))
    } else {
        Ok(parsed.into())
    }
}

/// The zone token of an RFC 2822 datetime: the token after the time, once
/// `(...)` comments are removed.
fn rfc822_zone(value: &str) -> Option<String> {
    let mut bare = String::with_capacity(value.len());
    let mut depth = 0_usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if depth > 0 => {
                chars.next();
            }
            '(' => depth += 1,
            ')' if depth > 0 => {
                depth -= 1;
                bare.push(' ');
            }
            _ if depth == 0 => bare.push(ch),
            _ => {}
        }
    }
    let mut tokens = bare.split_whitespace();
    tokens.find(|token| token.contains(':'))?;
    tokens.next().map(str::to_owned)
}

// Saturating cast; anything that saturates is rejected as out of range.
#[allow(clippy::cast_possible_truncation)]
fn whole_seconds(seconds: f64) -> i64 {
    seconds as i64
}

fn capture<T: FromStr>(
    caps: &Captures<'_>,
    name: &str,
    message: &'static str,
) -> Result<Option<T>, ParseError> {
    caps.name(name)
        .map(|m| {
            m.as_str()
                .parse::<T>()
                .map_err(|_| ParseError::InvalidFormat(message))
        })
        .transpose()
}

fn required<T: FromStr>(
    caps: &Captures<'_>,
    name: &str,
    message: &'static str,
) -> Result<T, ParseError> {
    capture(caps, name, message)?.ok_or(ParseError::InvalidFormat(message))
}

fn date_from_captures(caps: &Captures<'_>, message: &'static str) -> Result<NaiveDate, ParseError> {
    let year: i32 = required(caps, "year", message)?;
    let month: u32 = required(caps, "month", message)?;
    let day: u32 = required(caps, "day", message)?;

    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ParseError::OutOfRange {
            field: "year",
            value: i64::from(year),
        });
    }
    NaiveDate::from_ymd_opt(year, month, day).ok_or(ParseError::InvalidDate { year, month, day })
}

fn time_from_captures(caps: &Captures<'_>, message: &'static str) -> Result<NaiveTime, ParseError> {
    let hour: u32 = required(caps, "hour", message)?;
    let minute: u32 = required(caps, "minute", message)?;
    let second: u32 = capture(caps, "second", message)?.unwrap_or(0);
    let microsecond = match caps.name("microsecond") {
        Some(m) => format!("{:0<width$}", m.as_str(), width = FRACTION_DIGITS)
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidFormat(message))?,
        None => 0,
    };

    NaiveTime::from_hms_micro_opt(hour, minute, second, microsecond).ok_or(
        ParseError::InvalidTime {
            hour,
            minute,
            second,
            microsecond,
        },
    )
}

/// `Z`, `±HH`, `±HHMM` or `±HH:MM`.
fn parse_designator(designator: &str) -> Result<FixedOffset, ParseError> {
    if designator == UTC_DESIGNATOR {
        return fixed_offset_timezone(0);
    }

    let (sign, digits) = designator.split_at(1);
    let digits = digits.replace(':', "");
    let (hours, minutes) = digits.split_at(2.min(digits.len()));
    let hours: i32 = hours
        .parse()
        .map_err(|_| ParseError::InvalidFormat(INVALID_DATETIME))?;
    let minutes: i32 = if minutes.is_empty() {
        0
    } else {
        minutes
            .parse()
            .map_err(|_| ParseError::InvalidFormat(INVALID_DATETIME))?
    };

    let mut offset_minutes = hours * MINUTES_PER_HOUR + minutes;
    if sign == "-" {
        offset_minutes = -offset_minutes;
    }
    fixed_offset_timezone(offset_minutes * SECONDS_PER_MINUTE)
}

/// `+HH:MM[:SS]` when `colon`, otherwise `+HHMM`.
fn format_offset(offset: FixedOffset, colon: bool) -> String {
    let total = offset.local_minus_utc();
    let sign = if total < 0 { '-' } else { '+' };
    let total = total.unsigned_abs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    match (colon, seconds) {
        (true, 0) => format!("{sign}{hours:02}:{minutes:02}"),
        (true, _) => format!("{sign}{hours:02}:{minutes:02}:{seconds:02}"),
        (false, _) => format!("{sign}{hours:02}{minutes:02}"),
    }
}
