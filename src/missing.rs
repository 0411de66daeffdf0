//! The "no value supplied" sentinel.
//!
//! [`Missing`] is distinct from JSON `null`: a field whose value is
//! `Value::Null` was supplied as null, a field that is [`Maybe::Missing`] was
//! never supplied at all.

use crate::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Zero-sized marker meaning "no value supplied".
///
/// Every `Missing` is the same value; copies compare equal and carry no
/// state, so there is exactly one sentinel per process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "<missing>")]
pub struct Missing;

/// The sentinel value.
pub const MISSING: Missing = Missing;

/// A value that may be absent, where absence is not the same as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Maybe<T> {
    /// No value was supplied
    Missing,
    /// A supplied value (possibly `null`)
    Present(T),
}

impl<T> Maybe<T> {
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Converts to `Option`, mapping the sentinel to `None`
    pub fn present(self) -> Option<T> {
        match self {
            Self::Present(v) => Some(v),
            Self::Missing => None,
        }
    }

    pub const fn as_ref(&self) -> Maybe<&T> {
        match self {
            Self::Present(v) => Maybe::Present(v),
            Self::Missing => Maybe::Missing,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Maybe<U> {
        match self {
            Self::Present(v) => Maybe::Present(f(v)),
            Self::Missing => Maybe::Missing,
        }
    }

    /// Returns `self` if present, otherwise `other`
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Present(_) => self,
            Self::Missing => other,
        }
    }

    pub fn or_else<F: FnOnce() -> Self>(self, f: F) -> Self {
        match self {
            Self::Present(_) => self,
            Self::Missing => f(),
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Self::Present(v) => v,
            Self::Missing => default,
        }
    }
}

impl<T> Default for Maybe<T> {
    fn default() -> Self {
        Self::Missing
    }
}

impl<T> From<Missing> for Maybe<T> {
    fn from(_: Missing) -> Self {
        Self::Missing
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Self::Present)
    }
}

impl From<Value> for Maybe<Value> {
    fn from(value: Value) -> Self {
        Self::Present(value)
    }
}

impl<T> From<Maybe<T>> for Option<T> {
    fn from(value: Maybe<T>) -> Self {
        value.present()
    }
}

impl<T: PartialEq> PartialEq<Missing> for Maybe<T> {
    fn eq(&self, _: &Missing) -> bool {
        self.is_missing()
    }
}

// Missing serializes as none; pair with `skip_serializing_if = "Maybe::is_missing"`
// to drop the key entirely.
impl<T: Serialize> Serialize for Maybe<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Present(v) => v.serialize(serializer),
            Self::Missing => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Maybe<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Self::Present)
    }
}

/// Truthiness in the sense the serialization layer uses it: empty and zero
/// values are falsy, as is the sentinel.
pub trait Truthy {
    fn is_truthy(&self) -> bool;
}

impl Truthy for Missing {
    fn is_truthy(&self) -> bool {
        false
    }
}

impl<T: Truthy> Truthy for Maybe<T> {
    fn is_truthy(&self) -> bool {
        match self {
            Self::Present(v) => v.is_truthy(),
            Self::Missing => false,
        }
    }
}

impl<T: Truthy> Truthy for Option<T> {
    fn is_truthy(&self) -> bool {
        self.as_ref().is_some_and(Truthy::is_truthy)
    }
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

impl Truthy for str {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Truthy for Vec<T> {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for Value {
    fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => !matches!(n.as_f64(), Some(f) if f == 0.0),
            Self::String(s) => !s.is_empty(),
            Self::Array(a) => !a.is_empty(),
            Self::Object(o) => !o.is_empty(),
        }
    }
}
