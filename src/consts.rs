/// Minimum year accepted by the ISO8601 parsers (inclusive)
pub const MIN_YEAR: i32 = 1;

/// Maximum year accepted by the ISO8601 parsers (inclusive)
pub const MAX_YEAR: i32 = 9999;

/// Seconds in one day, used when flattening durations
pub const SECONDS_PER_DAY: i64 = 86_400;
/// Seconds in one minute
pub const SECONDS_PER_MINUTE: i32 = 60;
/// Minutes in one hour
pub const MINUTES_PER_HOUR: i32 = 60;
/// Microseconds in one second
pub const MICROS_PER_SECOND: i64 = 1_000_000;
/// Nanoseconds in one microsecond
pub const NANOS_PER_MICRO: i32 = 1_000;

/// Number of fractional-second digits kept by the parsers
pub const FRACTION_DIGITS: usize = 6;

/// Designator for a zero UTC offset
pub const UTC_DESIGNATOR: &str = "Z";
/// RFC 2822 zone meaning "no offset information"
pub const RFC822_UNKNOWN_OFFSET: &str = "-0000";
/// Layout used for RFC 822 output (zero-padded day of month)
pub const RFC822_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

/// Separator between segments of a dotted path key
pub const PATH_SEPARATOR: char = '.';

/// Unknown-field policy: silently drop unknown fields
pub const EXCLUDE: &str = "exclude";
/// Unknown-field policy: keep unknown fields verbatim
pub const INCLUDE: &str = "include";
/// Unknown-field policy: reject input carrying unknown fields
pub const RAISE: &str = "raise";

pub(crate) const INVALID_DATETIME: &str = "Not a valid ISO8601-formatted datetime string";
pub(crate) const INVALID_TIME: &str = "Not a valid ISO8601-formatted time string";
pub(crate) const INVALID_DATE: &str = "Not a valid ISO8601-formatted date string";
