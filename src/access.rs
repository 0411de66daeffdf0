//! Duck-typed value access.
//!
//! [`get_value`] tries subscript access first and falls back to attribute
//! access; [`set_value`] writes through dotted paths, creating intermediate
//! objects as it goes.

use crate::consts::PATH_SEPARATOR;
use crate::missing::Maybe;
use crate::prelude::*;
use log::trace;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// A subscript or attribute key.
///
/// Negative indexes count back from the end of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Key<'a> {
    #[display(fmt = "{_0}")]
    Index(i64),
    #[display(fmt = "{_0}")]
    Name(&'a str),
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for Key<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name)
    }
}

impl From<i64> for Key<'_> {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

impl From<i32> for Key<'_> {
    fn from(index: i32) -> Self {
        Self::Index(i64::from(index))
    }
}

impl From<usize> for Key<'_> {
    fn from(index: usize) -> Self {
        Self::Index(i64::try_from(index).unwrap_or(i64::MAX))
    }
}

/// Resolves a possibly negative index against a sequence length.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    if index < 0 {
        len.checked_sub(usize::try_from(index.unsigned_abs()).ok()?)
    } else {
        usize::try_from(index).ok().filter(|&i| i < len)
    }
}

fn index_slice(items: &[Value], index: i64) -> Option<Value> {
    resolve_index(index, items.len()).map(|i| items[i].clone())
}

/// Something values can be read out of, by subscript or by attribute.
///
/// Both methods default to "not available". Mapping-like types implement
/// [`Accessor::item`]; record-like types implement [`Accessor::attr`];
/// types that behave like both implement both.
pub trait Accessor {
    /// `obj[key]`, or `None` when the key is absent or the type has no
    /// subscript access
    fn item(&self, key: Key<'_>) -> Option<Value> {
        let _ = key;
        None
    }

    /// `obj.name`, or `None` when there is no such attribute
    fn attr(&self, name: &str) -> Option<Value> {
        let _ = name;
        None
    }
}

impl Accessor for Value {
    fn item(&self, key: Key<'_>) -> Option<Value> {
        match (self, key) {
            (Self::Object(map), Key::Name(name)) => map.get(name).cloned(),
            (Self::Array(items), Key::Index(index)) => index_slice(items, index),
            (Self::String(text), Key::Index(index)) => {
                let i = resolve_index(index, text.chars().count())?;
                text.chars().nth(i).map(|c| Self::String(c.to_string()))
            }
            _ => None,
        }
    }
}

impl Accessor for Map<String, Value> {
    fn item(&self, key: Key<'_>) -> Option<Value> {
        match key {
            Key::Name(name) => self.get(name).cloned(),
            Key::Index(_) => None,
        }
    }
}

impl Accessor for [Value] {
    fn item(&self, key: Key<'_>) -> Option<Value> {
        match key {
            Key::Index(index) => index_slice(self, index),
            Key::Name(_) => None,
        }
    }
}

impl Accessor for Vec<Value> {
    fn item(&self, key: Key<'_>) -> Option<Value> {
        self.as_slice().item(key)
    }
}

impl<S: std::hash::BuildHasher> Accessor for HashMap<String, Value, S> {
    fn item(&self, key: Key<'_>) -> Option<Value> {
        match key {
            Key::Name(name) => self.get(name).cloned(),
            Key::Index(_) => None,
        }
    }
}

impl Accessor for BTreeMap<String, Value> {
    fn item(&self, key: Key<'_>) -> Option<Value> {
        match key {
            Key::Name(name) => self.get(name).cloned(),
            Key::Index(_) => None,
        }
    }
}

/// Error type for path writes and keyed extraction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// A path segment exists but does not hold an object.
    #[error("String path conflicts with current dictionary structure at {path}")]
    Conflict { path: String },

    /// A record has no value under the requested key.
    #[error("Key not found: {key}")]
    KeyNotFound { key: String },
}

/// Reads `key` off `obj`, first as `obj[key]`, then as `obj.key`.
///
/// Returns `default` when neither lookup finds anything; pass
/// [`MISSING`](crate::MISSING) to get the sentinel back. Integer keys never
/// fall back to attribute access.
pub fn get_value<'k, A: Accessor + ?Sized>(
    obj: &A,
    key: impl Into<Key<'k>>,
    default: impl Into<Maybe<Value>>,
) -> Maybe<Value> {
    let key = key.into();
    if let Some(value) = obj.item(key) {
        return Maybe::Present(value);
    }

    let attribute = match key {
        Key::Name(name) => obj.attr(name),
        Key::Index(_) => None,
    };
    attribute.map_or_else(
        || {
            trace!("no item or attribute {key}, using default");
            default.into()
        },
        Maybe::Present,
    )
}

/// Stores `value` under `key`, treating dots in `key` as a path.
///
/// Missing intermediate segments are created as empty objects.
///
/// # Errors
/// Returns `PathError::Conflict` naming the offending prefix when an
/// intermediate segment already holds something other than an object.
pub fn set_value(container: &mut Map<String, Value>, key: &str, value: Value) -> Result<(), PathError> {
    let Some((parents, last)) = key.rsplit_once(PATH_SEPARATOR) else {
        container.insert(key.to_owned(), value);
        return Ok(());
    };

    let mut current = container;
    let mut consumed = 0;
    for part in parents.split(PATH_SEPARATOR) {
        consumed += part.len();
        let prefix = &key[..consumed];
        consumed += PATH_SEPARATOR.len_utf8();

        let entry = current.entry(part).or_insert_with(|| {
            trace!("creating object at {prefix}");
            Value::Object(Map::new())
        });
        current = match entry {
            Value::Object(map) => map,
            _ => {
                return Err(PathError::Conflict {
                    path: prefix.to_owned(),
                });
            }
        };
    }

    current.insert(last.to_owned(), value);
    Ok(())
}

/// Extracts `record[key]` from each record, preserving order.
///
/// # Errors
/// Returns `PathError::KeyNotFound` for the first record lacking `key`.
pub fn pluck<'k, A: Accessor>(records: &[A], key: impl Into<Key<'k>>) -> Result<Vec<Value>, PathError> {
    let key = key.into();
    records
        .iter()
        .map(|record| {
            record.item(key).ok_or_else(|| PathError::KeyNotFound {
                key: key.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::missing::{MISSING, Missing};
    use serde_json::json;

    struct User {
        name: &'static str,
        age: u8,
    }

    impl Accessor for User {
        fn attr(&self, name: &str) -> Option<Value> {
            match name {
                "name" => Some(json!(self.name)),
                "age" => Some(json!(self.age)),
                _ => None,
            }
        }
    }

    /// A mapping that also exposes attributes.
    struct Tagged {
        entries: Map<String, Value>,
        label: &'static str,
    }

    impl Accessor for Tagged {
        fn item(&self, key: Key<'_>) -> Option<Value> {
            self.entries.item(key)
        }

        fn attr(&self, name: &str) -> Option<Value> {
            (name == "label").then(|| json!(self.label))
        }
    }

    #[test]
    fn test_get_value_sequence_index() {
        let items = json!([1, 2, 3]);
        assert_eq!(get_value(&items, 1, MISSING), Maybe::Present(json!(2)));
        assert_eq!(get_value(&items, -1, MISSING), Maybe::Present(json!(3)));
        assert_eq!(get_value(&items, 3, MISSING), MISSING);
        assert_eq!(get_value(&items, -4, MISSING), MISSING);

        let vec = vec![json!("a"), json!("b")];
        assert_eq!(get_value(&vec, 0_usize, MISSING), Maybe::Present(json!("a")));
        assert_eq!(get_value(vec.as_slice(), 1, MISSING), Maybe::Present(json!("b")));
    }

    #[test]
    fn test_get_value_mapping_returns_sentinel() {
        let obj = json!({"x": 1});
        assert_eq!(get_value(&obj, "x", MISSING), Maybe::Present(json!(1)));
        let result = get_value(&obj, "y", MISSING);
        assert_eq!(result, Missing);
        assert!(result.is_missing());
    }

    #[test]
    fn test_get_value_custom_default() {
        let obj = json!({"x": 1});
        assert_eq!(get_value(&obj, "y", json!(null)), Maybe::Present(Value::Null));
        assert_eq!(get_value(&obj, "y", json!(42)), Maybe::Present(json!(42)));
    }

    #[test]
    fn test_get_value_null_is_present() {
        let obj = json!({"x": null});
        assert_eq!(get_value(&obj, "x", MISSING), Maybe::Present(Value::Null));
    }

    #[test]
    fn test_get_value_wrong_key_type() {
        let obj = json!({"0": "zero"});
        assert_eq!(get_value(&obj, 0, MISSING), MISSING);
        let items = json!([1]);
        assert_eq!(get_value(&items, "0", MISSING), MISSING);
        assert_eq!(get_value(&json!(5), "x", MISSING), MISSING);
    }

    #[test]
    fn test_get_value_string_index() {
        let text = json!("héllo");
        assert_eq!(get_value(&text, 1, MISSING), Maybe::Present(json!("é")));
        assert_eq!(get_value(&text, -1, MISSING), Maybe::Present(json!("o")));
        assert_eq!(get_value(&text, 9, MISSING), MISSING);
    }

    #[test]
    fn test_get_value_attribute_only() {
        let user = User {
            name: "ada",
            age: 36,
        };
        assert_eq!(get_value(&user, "name", MISSING), Maybe::Present(json!("ada")));
        assert_eq!(get_value(&user, "age", MISSING), Maybe::Present(json!(36)));
        assert_eq!(get_value(&user, "email", MISSING), MISSING);
        assert_eq!(get_value(&user, 0, MISSING), MISSING);
    }

    #[test]
    fn test_get_value_item_then_attribute() {
        let mut entries = Map::new();
        entries.insert("label".to_owned(), json!("from item"));
        let tagged = Tagged {
            entries,
            label: "from attr",
        };
        assert_eq!(
            get_value(&tagged, "label", MISSING),
            Maybe::Present(json!("from item"))
        );

        let tagged = Tagged {
            entries: Map::new(),
            label: "from attr",
        };
        assert_eq!(
            get_value(&tagged, "label", MISSING),
            Maybe::Present(json!("from attr"))
        );
    }

    #[test]
    fn test_get_value_std_maps() {
        let mut hash = HashMap::new();
        hash.insert("k".to_owned(), json!(1));
        assert_eq!(get_value(&hash, "k", MISSING), Maybe::Present(json!(1)));

        let mut tree = BTreeMap::new();
        tree.insert("k".to_owned(), json!(2));
        assert_eq!(get_value(&tree, "k", MISSING), Maybe::Present(json!(2)));
        assert_eq!(get_value(&tree, "j", MISSING), MISSING);
    }

    #[test]
    fn test_set_value_plain_key() {
        let mut map = Map::new();
        set_value(&mut map, "a", json!(1)).unwrap();
        assert_eq!(Value::Object(map), json!({"a": 1}));
    }

    #[test]
    fn test_set_value_nested() {
        let mut map = Map::new();
        set_value(&mut map, "a.b.c", json!(1)).unwrap();
        assert_eq!(Value::Object(map), json!({"a": {"b": {"c": 1}}}));
    }

    #[test]
    fn test_set_value_merges_into_existing() {
        let mut map = json!({"a": {"x": 0}}).as_object().cloned().unwrap();
        set_value(&mut map, "a.b", json!(2)).unwrap();
        set_value(&mut map, "a.x", json!(9)).unwrap();
        assert_eq!(Value::Object(map), json!({"a": {"x": 9, "b": 2}}));
    }

    #[test]
    fn test_set_value_conflict() {
        let mut map = json!({"a": 1}).as_object().cloned().unwrap();
        let result = set_value(&mut map, "a.b", json!(2));
        assert_eq!(
            result,
            Err(PathError::Conflict {
                path: "a".to_owned()
            })
        );
        assert_eq!(Value::Object(map), json!({"a": 1}));
    }

    #[test]
    fn test_set_value_conflict_names_deep_prefix() {
        let mut map = json!({"a": {"b": [1]}}).as_object().cloned().unwrap();
        let err = set_value(&mut map, "a.b.c.d", json!(2)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "String path conflicts with current dictionary structure at a.b"
        );
    }

    #[test]
    fn test_set_value_null_segment_conflicts() {
        let mut map = json!({"a": null}).as_object().cloned().unwrap();
        assert!(set_value(&mut map, "a.b", json!(1)).is_err());
    }

    #[test]
    fn test_pluck() {
        let records = [json!({"id": 1, "name": "foo"}), json!({"id": 2, "name": "bar"})];
        assert_eq!(pluck(&records, "id").unwrap(), vec![json!(1), json!(2)]);
        assert_eq!(
            pluck(&records, "name").unwrap(),
            vec![json!("foo"), json!("bar")]
        );
    }

    #[test]
    fn test_pluck_missing_key() {
        let records = [json!({"id": 1}), json!({"name": "bar"})];
        assert_eq!(
            pluck(&records, "id"),
            Err(PathError::KeyNotFound {
                key: "id".to_owned()
            })
        );
        let empty: [Value; 0] = [];
        assert_eq!(pluck(&empty, "id").unwrap(), Vec::<Value>::new());
    }

    #[test]
    fn test_resolve_index() {
        assert_eq!(resolve_index(0, 0), None);
        assert_eq!(resolve_index(-1, 3), Some(2));
        assert_eq!(resolve_index(-3, 3), Some(0));
        assert_eq!(resolve_index(i64::MIN, 3), None);
    }
}
