//! The translation tree value model.
//!
//! A base translation and every override are [`Value`] trees. `Value::Null` doubles as the
//! fallthrough marker: a field set to it, or missing, means "no value here".

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{
    Deserialize,
    Deserializer,
};
use serde_json::Number;

use crate::types::Key;

/// Ordered field map of a record.
pub type Fields = IndexMap<String, Value>;

/// Signature of the functions stored in [`Value::Callable`].
type CallableFn = dyn Fn(&Call<'_>) -> Value + Send + Sync;

/// A node of a translation tree.
#[derive(Clone, Default)]
pub enum Value {
    /// Absent or explicitly nulled field; the fallthrough marker.
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Arc<Vec<Self>>),
    Record(Arc<Fields>),
    Callable(Callable),
    /// Any foreign value (dates, domain objects, ...) carried through unmerged.
    Opaque(Opaque),
}

/// Shared fallthrough marker handed out for absent entries.
pub(crate) static NULL: Value = Value::Null;

impl Value {
    /// Builds a record from `(key, value)` pairs, keeping their order.
    #[must_use]
    pub fn record<K, V, I>(fields: I) -> Self
    where
        K: Into<String>,
        V: Into<Self>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Record(Arc::new(fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect()))
    }

    #[must_use]
    pub fn sequence<V, I>(items: I) -> Self
    where
        V: Into<Self>,
        I: IntoIterator<Item = V>,
    {
        Self::Sequence(Arc::new(items.into_iter().map(Into::into).collect()))
    }

    #[must_use]
    pub fn callable(function: impl Fn(&Call<'_>) -> Self + Send + Sync + 'static) -> Self {
        Self::Callable(Callable::new(function))
    }

    #[must_use]
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Self::Opaque(Opaque::new(value))
    }

    /// Returns a copy of this record with `key` set to `value`.
    ///
    /// Non-record values are replaced by a single-field record.
    #[must_use]
    pub fn with(self, key: impl Into<String>, value: impl Into<Self>) -> Self {
        let mut fields = match self {
            Self::Record(fields) => fields,
            _ => Arc::default(),
        };
        Arc::make_mut(&mut fields).insert(key.into(), value.into());
        Self::Record(fields)
    }

    /// Whether this is the fallthrough marker.
    #[must_use]
    pub const fn is_fallthrough(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this is a record or a sequence.
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Self::Record(_) | Self::Sequence(_))
    }

    /// Reads a directly declared entry of a composite.
    ///
    /// Returns `None` for scalars and for keys the composite does not declare. An entry that
    /// is declared but set to the fallthrough marker is returned as `Some(&Value::Null)`.
    #[must_use]
    pub fn get(&self, key: &Key) -> Option<&Self> {
        match (self, key) {
            (Self::Record(fields), Key::Field(name)) => fields.get(name),
            (Self::Record(fields), Key::Index(index)) => fields.get(&index.to_string()),
            (Self::Sequence(items), key) => key.as_index().and_then(|index| items.get(index)),
            _ => None,
        }
    }

    /// Like [`Value::get`], but with absent entries folded into the fallthrough marker.
    #[must_use]
    pub fn field(&self, key: &Key) -> &Self {
        self.get(key).unwrap_or(&NULL)
    }

    /// Whether `key` is one of this composite's own entries.
    #[must_use]
    pub fn declares(&self, key: &Key) -> bool {
        self.get(key).is_some()
    }

    /// Own keys of a composite in declaration order; empty for scalars.
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        match self {
            Self::Record(fields) => fields.keys().map(|name| Key::Field(name.clone())).collect(),
            Self::Sequence(items) => (0..items.len()).map(Key::Index).collect(),
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_record(&self) -> Option<&Fields> {
        match self {
            Self::Record(fields) => Some(&**fields),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Self]> {
        match self {
            Self::Sequence(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_callable(&self) -> Option<&Callable> {
        match self {
            Self::Callable(callable) => Some(callable),
            _ => None,
        }
    }

    /// Downcasts an opaque value to its concrete type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Opaque(opaque) => opaque.downcast_ref(),
            _ => None,
        }
    }
}

/// A function stored in a translation tree.
///
/// Equality is identity: two callables are equal only if they share the same allocation.
#[derive(Clone)]
pub struct Callable(Arc<CallableFn>);

impl Callable {
    #[must_use]
    pub fn new(function: impl Fn(&Call<'_>) -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(function))
    }

    /// Invokes the function with `this` as its declaring record.
    #[must_use]
    pub fn invoke(&self, this: &Value, args: &[Value]) -> Value {
        (self.0)(&Call { this, args })
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable(..)")
    }
}

/// The receiver and arguments of one callable invocation.
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    /// The record on the base tree that declares the callable.
    this: &'a Value,
    /// Arguments as passed by the caller.
    args: &'a [Value],
}

impl<'a> Call<'a> {
    /// The declaring record; sibling fields can be read from it directly.
    #[must_use]
    pub const fn this(&self) -> &'a Value {
        self.this
    }

    #[must_use]
    pub const fn args(&self) -> &'a [Value] {
        self.args
    }

    /// Returns the argument at `index`, or the fallthrough marker when it was not passed.
    #[must_use]
    pub fn arg(&self, index: usize) -> &'a Value {
        self.args.get(index).unwrap_or(&NULL)
    }
}

/// A foreign value embedded in a tree.
#[derive(Clone)]
pub struct Opaque(Arc<dyn Any + Send + Sync>);

impl Opaque {
    #[must_use]
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Opaque(..)")
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => a == b,
            (Self::Callable(a), Self::Callable(b)) => a.ptr_eq(b),
            (Self::Opaque(a), Self::Opaque(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => write!(f, "{b:?}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Sequence(items) => f.debug_list().entries(items.iter()).finish(),
            Self::Record(fields) => f.debug_map().entries(fields.iter()).finish(),
            Self::Callable(callable) => callable.fmt(f),
            Self::Opaque(opaque) => opaque.fmt(f),
        }
    }
}

/// Renders values the way they read when interpolated into text: the fallthrough marker is
/// empty and sequence elements are comma-joined.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Sequence(items) => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Record(fields) => {
                f.write_str("{")?;
                for (index, (key, value)) in fields.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Self::Callable(_) => f.write_str("<callable>"),
            Self::Opaque(_) => f.write_str("<opaque>"),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::sequence(items),
            serde_json::Value::Object(map) => Self::record(map),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Self::Number(n.into())
    }
}

/// Non-finite numbers have no representation and become the fallthrough marker.
impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Self::Null, Self::Number)
    }
}

impl From<Callable> for Value {
    fn from(callable: Callable) -> Self {
        Self::Callable(callable)
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::Sequence(Arc::new(items))
    }
}

impl From<Fields> for Value {
    fn from(fields: Fields) -> Self {
        Self::Record(Arc::new(fields))
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Builds a [`Value::Record`] from `key => value` pairs.
///
/// ```
/// use t9n::{record, Value};
///
/// let base = record! {
///     "title" => "Welcome",
///     "menu" => record! { "open" => "Open" },
/// };
/// assert_eq!(base.to_string(), "{title: Welcome, menu: {open: Open}}");
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::Value::Record(::std::sync::Arc::default())
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Value::record([$((::std::string::String::from($key), $crate::Value::from($value))),+])
    };
}

/// Builds a [`Value::Sequence`] from a list of values.
#[macro_export]
macro_rules! sequence {
    ($($value:expr),* $(,)?) => {
        $crate::Value::sequence(::std::vec![$($crate::Value::from($value)),*])
    };
}
