//! Merged views and the per-field resolution rules.

use std::fmt;
use std::sync::Arc;

use super::candidates::CandidateChain;
use super::interpolation::{
    ActiveRootGuard,
    Interpolated,
};
use crate::types::{
    DEFAULT_KEY_SEPARATOR,
    Key,
    KeyPath,
    KeyPathError,
};
use crate::value::{
    NULL,
    Value,
};

/// The full candidate chain a tree of views was built from.
///
/// Every view created while reading through a root shares it, and wrapped callables activate
/// it while they run.
#[derive(Clone)]
pub(super) struct RootContext {
    /// `[base, ...overrides]` as passed to [`MergedView::new`].
    candidates: Arc<[Value]>,
}

impl RootContext {
    /// A view over the whole chain.
    pub(super) fn view(&self) -> MergedView {
        MergedView { candidates: Arc::clone(&self.candidates), root: self.clone() }
    }

    /// Whether both contexts are the same root.
    pub(super) fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.candidates, &other.candidates)
    }
}

impl fmt::Debug for RootContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootContext").field("candidates", &self.candidates.len()).finish()
    }
}

/// A lazily merged view of one path of a candidate chain.
///
/// The first candidate is the base value at this path and decides which keys exist. The
/// remaining candidates are the overrides that define something at this path, lowest priority
/// first. Nothing is merged until a field is read.
#[derive(Debug, Clone)]
pub struct MergedView {
    /// Base value at this path, then the overrides defining it.
    candidates: Arc<[Value]>,
    /// Root this view was read from.
    root: RootContext,
}

/// Outcome of reading one field through a view.
#[derive(Debug, Clone)]
pub enum Resolved {
    /// A record or sequence, merged lazily in turn.
    View(MergedView),
    /// A callable that runs with its translation active.
    Interpolated(Interpolated),
    /// A scalar, opaque, or structurally mismatched value, returned unchanged.
    Value(Value),
}

impl MergedView {
    /// Builds the root view of `chain`.
    #[must_use]
    pub fn new(chain: CandidateChain) -> Self {
        RootContext { candidates: chain.into_shared() }.view()
    }

    /// The base value at this view's path.
    #[must_use]
    pub fn canonical(&self) -> &Value {
        self.candidates.first().unwrap_or(&NULL)
    }

    /// Candidates aligned to this path, base first.
    #[must_use]
    pub fn candidates(&self) -> &[Value] {
        &self.candidates
    }

    /// Whether both views were read from the same root.
    #[must_use]
    pub fn shares_root_with(&self, other: &Self) -> bool {
        self.root.ptr_eq(&other.root)
    }

    /// Resolves one field.
    ///
    /// Returns `None` when the base does not define `key`, whatever the overrides say.
    /// Otherwise the highest-priority candidate that defines the field wins.
    pub fn get(&self, key: impl Into<Key>) -> Option<Resolved> {
        let key = key.into();
        let canonical = self.canonical().get(&key).filter(|value| !value.is_fallthrough())?;

        let defined: Vec<Value> = self
            .candidates
            .iter()
            .filter_map(|candidate| candidate.get(&key))
            .filter(|value| !value.is_fallthrough())
            .cloned()
            .collect();
        let resolved = defined.last().cloned()?;

        tracing::trace!(
            "Resolved '{key}' from {} of {} candidates",
            defined.len(),
            self.candidates.len()
        );

        if resolved.is_composite() && canonical.is_composite() {
            return Some(Resolved::View(Self { candidates: defined.into(), root: self.root.clone() }));
        }

        Some(match resolved {
            Value::Callable(callable) => Resolved::Interpolated(Interpolated::bound(
                self.root.clone(),
                self.canonical().clone(),
                callable,
            )),
            value => Resolved::Value(value),
        })
    }

    /// Resolves a path of keys, one view at a time.
    ///
    /// The empty path resolves to this view itself.
    #[must_use]
    pub fn lookup(&self, path: &KeyPath) -> Option<Resolved> {
        let mut keys = path.keys().iter();
        let Some(first) = keys.next() else {
            return Some(Resolved::View(self.clone()));
        };
        keys.try_fold(self.get(first)?, |resolved, key| resolved.get(key))
    }

    /// Parses `path` with the default `.` separator and resolves it.
    ///
    /// # Errors
    /// Returns [`KeyPathError`] if `path` is malformed.
    pub fn at(&self, path: &str) -> Result<Option<Resolved>, KeyPathError> {
        Ok(self.lookup(&KeyPath::parse(path, DEFAULT_KEY_SEPARATOR)?))
    }

    #[must_use]
    pub fn is_sequence(&self) -> bool {
        matches!(self.canonical(), Value::Sequence(_))
    }

    #[must_use]
    pub fn is_record(&self) -> bool {
        matches!(self.canonical(), Value::Record(_))
    }

    /// Observable keys: every index of a base sequence, or the base record's defined fields.
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        match self.canonical() {
            Value::Record(fields) => fields
                .iter()
                .filter(|(_, value)| !value.is_fallthrough())
                .map(|(name, _)| Key::Field(name.clone()))
                .collect(),
            canonical => canonical.keys(),
        }
    }

    /// Number of observable keys. A merged sequence is exactly as long as the base one.
    #[must_use]
    pub fn len(&self) -> usize {
        match self.canonical() {
            Value::Sequence(items) => items.len(),
            Value::Record(fields) => fields.values().filter(|value| !value.is_fallthrough()).count(),
            _ => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolved values in key order.
    pub fn values(&self) -> impl Iterator<Item = Option<Resolved>> + '_ {
        self.keys().into_iter().map(|key| self.get(key))
    }

    /// `(key, resolved)` pairs in key order.
    pub fn entries(&self) -> impl Iterator<Item = (Key, Option<Resolved>)> + '_ {
        self.keys().into_iter().map(|key| {
            let resolved = self.get(&key);
            (key, resolved)
        })
    }

    /// Joins the resolved elements' text with `separator`; unresolved elements are empty.
    #[must_use]
    pub fn join(&self, separator: &str) -> String {
        self.values()
            .map(|resolved| resolved.map(|resolved| resolved.to_string()).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Materializes this view into a plain tree.
    ///
    /// Callables keep their binding to this view's translation. The snapshot is computed on
    /// every call.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self.canonical() {
            Value::Sequence(_) => Value::sequence(
                self.values().map(|resolved| resolved.map_or(Value::Null, |r| r.to_value())),
            ),
            Value::Record(_) => Value::record(
                self.entries()
                    .filter_map(|(key, resolved)| Some((key.to_string(), resolved?.to_value()))),
            ),
            canonical => canonical.clone(),
        }
    }

    /// Layers more overrides on top of a snapshot of this view.
    ///
    /// With no overrides every key reads the same as through `self`.
    #[must_use]
    pub fn overlay<I>(&self, overrides: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::new(CandidateChain::from_overrides(self.to_value(), overrides))
    }

    /// Runs `f` with this view's translation active, as if called from one of its callables.
    pub fn enter<R>(&self, f: impl FnOnce() -> R) -> R {
        let _active = ActiveRootGuard::activate(self.root.clone());
        f()
    }
}

impl Resolved {
    /// Reads `key` of a base composite without merging.
    ///
    /// Callables found this way are not bound to any translation.
    pub(super) fn raw_field(parent: &Value, key: &Key) -> Option<Self> {
        let value = parent.get(key).filter(|value| !value.is_fallthrough())?;
        Some(match value {
            Value::Callable(callable) => {
                Self::Interpolated(Interpolated::unbound(parent.clone(), callable.clone()))
            }
            value => Self::Value(value.clone()),
        })
    }

    /// Reads a field of a resolved composite; plain values are read without merging.
    pub fn get(&self, key: impl Into<Key>) -> Option<Self> {
        match self {
            Self::View(view) => view.get(key),
            Self::Value(value) => Self::raw_field(value, &key.into()),
            Self::Interpolated(_) => None,
        }
    }

    #[must_use]
    pub fn lookup(&self, path: &KeyPath) -> Option<Self> {
        path.keys().iter().try_fold(self.clone(), |resolved, key| resolved.get(key))
    }

    /// Invokes a resolved callable. Returns `None` for anything else.
    #[must_use]
    pub fn call(&self, args: &[Value]) -> Option<Value> {
        match self {
            Self::Interpolated(interpolated) => Some(interpolated.call(args)),
            _ => None,
        }
    }

    /// Joins the elements of a sequence, merged or plain.
    #[must_use]
    pub fn join(&self, separator: &str) -> Option<String> {
        match self {
            Self::View(view) if view.is_sequence() => Some(view.join(separator)),
            Self::Value(Value::Sequence(items)) => {
                Some(items.iter().map(ToString::to_string).collect::<Vec<_>>().join(separator))
            }
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_view(&self) -> Option<&MergedView> {
        match self {
            Self::View(view) => Some(view),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_interpolated(&self) -> Option<&Interpolated> {
        match self {
            Self::Interpolated(interpolated) => Some(interpolated),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    /// Converts into a plain tree; see [`MergedView::to_value`].
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::View(view) => view.to_value(),
            Self::Interpolated(interpolated) => Value::Callable(interpolated.to_callable()),
            Self::Value(value) => value.clone(),
        }
    }
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::View(view) => write!(f, "{}", view.to_value()),
            Self::Interpolated(_) => f.write_str("<callable>"),
            Self::Value(value) => write!(f, "{value}"),
        }
    }
}
