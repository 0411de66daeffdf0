//! Registered runtime metadata standing in for class objects and call
//! signatures.
//!
//! Types that take part in field resolution declare a `static` [`Class`];
//! callables describe their parameters with a [`Signature`]. Class identity
//! is the address of that static.

use crate::access::{Accessor, get_value};
use crate::missing::{MISSING, Maybe};
use serde_json::Value;
use std::fmt;
use std::ptr;

/// A registered class: a name, an optional parent and, for concrete field
/// classes, a no-argument constructor.
pub struct Class {
    name: &'static str,
    parent: Option<&'static Class>,
    factory: Option<fn() -> Box<dyn Field>>,
}

impl Class {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            parent: None,
            factory: None,
        }
    }

    /// Declares `parent` as this class's base
    #[must_use]
    pub const fn extends(mut self, parent: &'static Self) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Registers the constructor used by [`resolve_field_instance`]
    #[must_use]
    pub const fn with_factory(mut self, factory: fn() -> Box<dyn Field>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn parent(&self) -> Option<&'static Self> {
        self.parent
    }

    /// Returns true if `self` is `other` or descends from it
    pub fn is_subclass_of(&self, other: &Self) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if ptr::eq(class, other) {
                return true;
            }
            current = class.parent;
        }
        false
    }

    /// Builds a fresh instance, if this class registered a constructor
    pub fn instantiate(&self) -> Option<Box<dyn Field>> {
        self.factory.map(|factory| factory())
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

/// Base class of every field.
pub static FIELD: Class = Class::new("Field");

/// Class of registered callables.
pub static FUNCTION: Class = Class::new("function");

/// A value that knows its registered class.
pub trait Object: fmt::Debug {
    fn class(&self) -> &'static Class;

    /// Call metadata, for objects that can be invoked
    fn callable(&self) -> Option<&Callable> {
        None
    }
}

/// A schema field.
pub trait Field: Object {
    /// Reads this field's raw value off `obj`
    fn get_value(&self, obj: &dyn Accessor, attr: &str) -> Maybe<Value> {
        get_value(obj, attr, MISSING)
    }
}

/// Parameter names of a callable, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    params: &'static [&'static str],
}

impl Signature {
    pub const fn new(params: &'static [&'static str]) -> Self {
        Self { params }
    }

    pub const fn params(&self) -> &'static [&'static str] {
        self.params
    }
}

/// Metadata describing something that can be called.
#[derive(Debug, Clone, PartialEq)]
pub enum Callable {
    /// A free function
    Function(Signature),
    /// A method bound to its receiver; the signature lists the receiver first
    BoundMethod(Signature),
    /// An object with a call operator; the signature is the operator's,
    /// receiver first
    Instance(Signature),
    /// Another callable with leading arguments already applied
    Partial { func: Box<Callable>, args: Vec<Value> },
}

impl Object for Callable {
    fn class(&self) -> &'static Class {
        &FUNCTION
    }

    fn callable(&self) -> Option<&Callable> {
        Some(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReflectError {
    /// The object has no call metadata.
    #[error("Object {0} is not callable")]
    NotCallable(String),

    /// Neither a concrete field class nor a field instance.
    #[error("Could not resolve field instance from {0}")]
    FieldResolution(String),
}

/// Either a class or an instance, for [`is_instance_or_subclass`].
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Class(&'a Class),
    Instance(&'a dyn Object),
}

impl<'a> From<&'a Class> for Subject<'a> {
    fn from(class: &'a Class) -> Self {
        Self::Class(class)
    }
}

impl<'a> From<&'a dyn Object> for Subject<'a> {
    fn from(object: &'a dyn Object) -> Self {
        Self::Instance(object)
    }
}

/// Returns true if `val` is a class descending from `class`, or an instance
/// of such a class.
pub fn is_instance_or_subclass<'a>(val: impl Into<Subject<'a>>, class: &Class) -> bool {
    match val.into() {
        Subject::Class(c) => c.is_subclass_of(class),
        Subject::Instance(obj) => obj.class().is_subclass_of(class),
    }
}

/// Checks that `obj` can be called.
///
/// # Errors
/// Returns `ReflectError::NotCallable` carrying the object's debug
/// representation.
pub fn callable_or_raise(obj: &dyn Object) -> Result<(), ReflectError> {
    if obj.callable().is_none() {
        return Err(ReflectError::NotCallable(format!("{obj:?}")));
    }
    Ok(())
}

/// Parameter names a caller supplies, in order.
///
/// The receiver of bound methods and callable instances is not listed.
/// Partial applications report the full list of the callable they wrap.
pub fn get_func_args(func: &Callable) -> Vec<&'static str> {
    match func {
        Callable::Function(sig) => sig.params().to_vec(),
        Callable::BoundMethod(sig) | Callable::Instance(sig) => {
            sig.params().iter().skip(1).copied().collect()
        }
        Callable::Partial { func, .. } => get_func_args(func),
    }
}

/// Input to [`resolve_field_instance`].
#[derive(Debug)]
pub enum FieldSource {
    Class(&'static Class),
    Field(Box<dyn Field>),
    Other(Box<dyn Object>),
}

impl From<&'static Class> for FieldSource {
    fn from(class: &'static Class) -> Self {
        Self::Class(class)
    }
}

impl From<Box<dyn Field>> for FieldSource {
    fn from(field: Box<dyn Field>) -> Self {
        Self::Field(field)
    }
}

impl From<Box<dyn Object>> for FieldSource {
    fn from(object: Box<dyn Object>) -> Self {
        Self::Other(object)
    }
}

/// Instantiates a field class, or passes a field instance through.
///
/// # Errors
/// Returns `ReflectError::FieldResolution` for classes outside the field
/// hierarchy, field classes without a registered constructor, and
/// non-field instances.
pub fn resolve_field_instance(source: impl Into<FieldSource>) -> Result<Box<dyn Field>, ReflectError> {
    match source.into() {
        FieldSource::Field(field) => Ok(field),
        FieldSource::Class(class) if class.is_subclass_of(&FIELD) => class
            .instantiate()
            .ok_or_else(|| ReflectError::FieldResolution(format!("{class:?}"))),
        FieldSource::Class(class) => Err(ReflectError::FieldResolution(format!("{class:?}"))),
        FieldSource::Other(object) => Err(ReflectError::FieldResolution(format!("{object:?}"))),
    }
}
