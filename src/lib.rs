//! Utilities for serialization and validation layers.
//!
//! - [`datetime`]: ISO8601 and RFC 822 codecs, fixed-offset timezones and
//!   exact duration arithmetic.
//! - [`access`]: duck-typed `get_value`/`set_value` over mappings, sequences
//!   and attribute-bearing types, plus `pluck`.
//! - [`types`] and [`reflect`]: classification predicates and registered
//!   class/signature metadata.
//! - [`missing`]: the "no value supplied" sentinel.

pub mod access;
mod consts;
pub mod datetime;
pub mod missing;
mod prelude;
pub mod reflect;
pub mod types;

pub use access::{Accessor, Key, PathError, get_value, pluck, set_value};
pub use consts::*;
pub use datetime::{
    IsoDateTime, OffsetSpec, ParseError, UtcOffset, fixed_offset_timezone, format_datetime_iso,
    format_datetime_rfc822, is_aware, parse_iso_date, parse_iso_datetime, parse_iso_time,
    parse_rfc822, timedelta_to_microseconds,
};
pub use missing::{MISSING, Maybe, Missing, Truthy};
pub use reflect::{
    Callable, Class, FIELD, FUNCTION, Field, FieldSource, Object, ReflectError, Signature,
    Subject, callable_or_raise, get_func_args, is_instance_or_subclass, resolve_field_instance,
};
pub use types::{
    Introspect, Kind, Unknown, UnknownPolicyError, is_collection, is_generator,
    is_iterable_but_not_string, is_keyed_tuple,
};

use crate::prelude::*;

/// Broad category of a failure, for callers that only care which kind of
/// mistake the input made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ErrorKind {
    /// Malformed or out-of-range input
    Value,
    /// A record lacked a required key
    Key,
    /// An object lacked a required capability
    Type,
    /// A field could not be resolved
    Resolution,
}

/// Any error produced by this crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Reflect(#[from] ReflectError),

    #[error(transparent)]
    UnknownPolicy(#[from] UnknownPolicyError),
}

impl Error {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(_) | Self::UnknownPolicy(_) | Self::Path(PathError::Conflict { .. }) => {
                ErrorKind::Value
            }
            Self::Path(PathError::KeyNotFound { .. }) => ErrorKind::Key,
            Self::Reflect(ReflectError::NotCallable(_)) => ErrorKind::Type,
            Self::Reflect(ReflectError::FieldResolution(_)) => ErrorKind::Resolution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    #[derive(Debug)]
    struct Plain;

    impl Object for Plain {
        fn class(&self) -> &'static Class {
            &FIELD
        }
    }

    fn build(key: &str) -> Result<Map<String, serde_json::Value>, Error> {
        let mut map = json!({"a": 1}).as_object().cloned().unwrap_or_default();
        set_value(&mut map, key, json!(true))?;
        Ok(map)
    }

    #[test]
    fn test_error_kinds() {
        let err: Error = parse_iso_datetime("not-a-date").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Value);

        let err = build("a.b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert!(build("c.d").is_ok());

        let err: Error = pluck(&[json!({})], "id").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Key);

        let err: Error = callable_or_raise(&Plain).unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Type);

        let err: Error = resolve_field_instance(&FUNCTION).unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Resolution);

        let err: Error = "bogus".parse::<Unknown>().unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn test_error_display_is_transparent() {
        let err: Error = parse_iso_date("2024/01/01").unwrap_err().into();
        assert_eq!(err.to_string(), "Not a valid ISO8601-formatted date string");
    }
}
