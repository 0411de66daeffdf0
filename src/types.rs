use crate::consts::{EXCLUDE, INCLUDE, RAISE};
use crate::missing::{Maybe, Missing};
use crate::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

/// Coarse shape of a value, as seen by the serialization layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Kind {
    /// Numbers, booleans, null and other atoms
    Scalar,
    /// Unicode text
    Text,
    /// Immutable raw bytes
    Bytes,
    /// Key/value containers, iterated by key
    Mapping,
    /// Ordered or unordered containers of values
    Sequence,
    /// A fixed sequence whose positions also have names
    KeyedTuple,
    /// A single-pass cursor over some other container
    Iterator,
    /// A single-pass lazy producer driven by its own state
    Generator,
}

impl Kind {
    /// Whether values of this kind can be iterated at all
    pub const fn is_iterable(self) -> bool {
        !matches!(self, Self::Scalar)
    }

    /// Whether values of this kind are text or raw bytes
    pub const fn is_string_like(self) -> bool {
        matches!(self, Self::Text | Self::Bytes)
    }
}

/// Reports the [`Kind`] of a value.
pub trait Introspect {
    fn kind(&self) -> Kind;
}

impl Introspect for Value {
    fn kind(&self) -> Kind {
        match self {
            Self::Null | Self::Bool(_) | Self::Number(_) => Kind::Scalar,
            Self::String(_) => Kind::Text,
            Self::Array(_) => Kind::Sequence,
            Self::Object(_) => Kind::Mapping,
        }
    }
}

macro_rules! impl_kind {
    ($kind:ident => $($ty:ty),+ $(,)?) => {
        $(
            impl Introspect for $ty {
                fn kind(&self) -> Kind {
                    Kind::$kind
                }
            }
        )+
    };
}

impl_kind!(Scalar => bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, (), Missing);
impl_kind!(Text => str, String);
// `Vec<u8>` is a growable buffer and stays a `Sequence`.
impl_kind!(Bytes => [u8]);
impl_kind!(Mapping => Map<String, Value>);

impl<T> Introspect for Vec<T> {
    fn kind(&self) -> Kind {
        Kind::Sequence
    }
}

impl<T, const N: usize> Introspect for [T; N] {
    fn kind(&self) -> Kind {
        Kind::Sequence
    }
}

impl<T> Introspect for VecDeque<T> {
    fn kind(&self) -> Kind {
        Kind::Sequence
    }
}

impl<T, S> Introspect for HashSet<T, S> {
    fn kind(&self) -> Kind {
        Kind::Sequence
    }
}

impl<T> Introspect for BTreeSet<T> {
    fn kind(&self) -> Kind {
        Kind::Sequence
    }
}

impl<A, B> Introspect for (A, B) {
    fn kind(&self) -> Kind {
        Kind::Sequence
    }
}

impl<A, B, C> Introspect for (A, B, C) {
    fn kind(&self) -> Kind {
        Kind::Sequence
    }
}

impl<K, V, S> Introspect for HashMap<K, V, S> {
    fn kind(&self) -> Kind {
        Kind::Mapping
    }
}

impl<K, V> Introspect for BTreeMap<K, V> {
    fn kind(&self) -> Kind {
        Kind::Mapping
    }
}

impl<T> Introspect for std::vec::IntoIter<T> {
    fn kind(&self) -> Kind {
        Kind::Iterator
    }
}

impl<T> Introspect for std::slice::Iter<'_, T> {
    fn kind(&self) -> Kind {
        Kind::Iterator
    }
}

impl<F> Introspect for std::iter::FromFn<F> {
    fn kind(&self) -> Kind {
        Kind::Generator
    }
}

impl<T, F> Introspect for std::iter::Successors<T, F> {
    fn kind(&self) -> Kind {
        Kind::Generator
    }
}

impl<T: Introspect> Introspect for Maybe<T> {
    fn kind(&self) -> Kind {
        match self {
            Self::Present(v) => v.kind(),
            Self::Missing => Kind::Scalar,
        }
    }
}

impl<T: Introspect> Introspect for Option<T> {
    fn kind(&self) -> Kind {
        self.as_ref().map_or(Kind::Scalar, Introspect::kind)
    }
}

/// Returns true if `obj` is a lazy producer driven by its own state.
pub fn is_generator<T: Introspect + ?Sized>(obj: &T) -> bool {
    obj.kind() == Kind::Generator
}

/// Returns true if `obj` is iterable and is neither text nor raw bytes.
pub fn is_iterable_but_not_string<T: Introspect + ?Sized>(obj: &T) -> bool {
    let kind = obj.kind();
    kind.is_iterable() && !kind.is_string_like()
}

/// Returns true if `obj` is a collection: iterable, not a string, and not
/// a mapping.
pub fn is_collection<T: Introspect + ?Sized>(obj: &T) -> bool {
    is_iterable_but_not_string(obj) && obj.kind() != Kind::Mapping
}

/// Returns true if `obj` is a tuple whose positions also have names.
pub fn is_keyed_tuple<T: Introspect + ?Sized>(obj: &T) -> bool {
    obj.kind() == Kind::KeyedTuple
}

/// What a schema does with input fields it does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unknown {
    /// Drop them
    Exclude,
    /// Pass them through unchanged
    Include,
    /// Reject the input
    #[default]
    Raise,
}

/// Error returned when a string names no [`Unknown`] policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Object {0:?} is not a valid value for the 'unknown' parameter")]
pub struct UnknownPolicyError(pub String);

impl Unknown {
    pub const ALL: [Self; 3] = [Self::Exclude, Self::Include, Self::Raise];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exclude => EXCLUDE,
            Self::Include => INCLUDE,
            Self::Raise => RAISE,
        }
    }

    /// Returns true if `value` names a policy
    pub fn is_valid(value: &str) -> bool {
        value.parse::<Self>().is_ok()
    }
}

impl fmt::Display for Unknown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unknown {
    type Err = UnknownPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|policy| policy.as_str() == s)
            .ok_or_else(|| UnknownPolicyError(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Point {
        x: i64,
        y: i64,
    }

    impl Introspect for Point {
        fn kind(&self) -> Kind {
            Kind::KeyedTuple
        }
    }

    #[test]
    fn test_is_collection_cases() {
        struct TestCase {
            value: Value,
            is_collection: bool,
            description: &'static str,
        }

        let cases = [
            TestCase {
                value: json!([1, 2]),
                is_collection: true,
                description: "array",
            },
            TestCase {
                value: json!([]),
                is_collection: true,
                description: "empty array",
            },
            TestCase {
                value: json!("ab"),
                is_collection: false,
                description: "string",
            },
            TestCase {
                value: json!({"a": 1}),
                is_collection: false,
                description: "object",
            },
            TestCase {
                value: json!(1),
                is_collection: false,
                description: "number",
            },
            TestCase {
                value: json!(null),
                is_collection: false,
                description: "null",
            },
        ];

        for case in &cases {
            assert_eq!(
                is_collection(&case.value),
                case.is_collection,
                "{}: expected {}",
                case.description,
                if case.is_collection {
                    "collection"
                } else {
                    "not collection"
                }
            );
        }
    }

    #[test]
    fn test_is_collection_std_types() {
        assert!(is_collection(&vec![1, 2]));
        assert!(is_collection(&[1, 2, 3]));
        assert!(is_collection(&(1, "a")));
        assert!(is_collection(&HashSet::<u8>::new()));
        assert!(is_collection(&VecDeque::<u8>::new()));
        assert!(is_collection(&vec![1_u8, 2]));
        assert!(!is_collection("ab"));
        assert!(!is_collection(&String::from("ab")));
        assert!(!is_collection(b"ab".as_slice()));
        assert!(!is_collection(&HashMap::<String, u8>::new()));
        assert!(!is_collection(&BTreeMap::<String, u8>::new()));
        assert!(!is_collection(&42_i32));
    }

    #[test]
    fn test_is_iterable_but_not_string() {
        assert!(is_iterable_but_not_string(&json!({"a": 1})));
        assert!(is_iterable_but_not_string(&vec![1]));
        assert!(!is_iterable_but_not_string("text"));
        assert!(!is_iterable_but_not_string(b"bytes".as_slice()));
        assert!(!is_iterable_but_not_string(&1.5_f64));
        assert!(!is_iterable_but_not_string(&crate::MISSING));
    }

    #[test]
    fn test_is_generator() {
        let mut count = 0;
        let counter = std::iter::from_fn(move || {
            count += 1;
            (count < 3).then_some(count)
        });
        assert!(is_generator(&counter));

        let powers = std::iter::successors(Some(1_u32), |n| n.checked_mul(2));
        assert!(is_generator(&powers));

        let items = vec![1, 2, 3];
        assert!(!is_generator(&items));
        assert!(!is_generator(&items.iter()));
        assert!(is_collection(&items.iter()));
        assert!(is_collection(&items.into_iter()));
    }

    #[test]
    fn test_is_keyed_tuple() {
        let point = Point { x: 1, y: 2 };
        assert_eq!(point.x + point.y, 3);
        assert!(is_keyed_tuple(&point));
        assert!(is_collection(&point));
        assert!(!is_keyed_tuple(&(1, 2)));
        assert!(!is_keyed_tuple(&json!([1, 2])));
    }

    #[test]
    fn test_maybe_and_option_kind() {
        assert_eq!(Maybe::Present(json!([1])).kind(), Kind::Sequence);
        assert_eq!(Maybe::<Value>::Missing.kind(), Kind::Scalar);
        assert_eq!(Some(String::from("x")).kind(), Kind::Text);
        assert_eq!(None::<String>.kind(), Kind::Scalar);
    }

    #[test]
    fn test_unknown_parse_and_display() {
        for policy in Unknown::ALL {
            assert_eq!(policy.to_string().parse::<Unknown>().unwrap(), policy);
        }
        assert_eq!("exclude".parse::<Unknown>().unwrap(), Unknown::Exclude);
        assert!(Unknown::is_valid("include"));
        assert!(!Unknown::is_valid("INCLUDE"));
        let err = "ignore".parse::<Unknown>().unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Object "ignore" is not a valid value for the 'unknown' parameter"#
        );
    }

    #[test]
    fn test_unknown_default_is_raise() {
        assert_eq!(Unknown::default(), Unknown::Raise);
    }

    #[test]
    fn test_unknown_serde() {
        let json = serde_json::to_string(&Unknown::Include).unwrap();
        assert_eq!(json, r#""include""#);
        let parsed: Unknown = serde_json::from_str(r#""exclude""#).unwrap();
        assert_eq!(parsed, Unknown::Exclude);
        let result: Result<Unknown, _> = serde_json::from_str(r#""skip""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(Kind::KeyedTuple.to_string(), "KeyedTuple");
    }
}
