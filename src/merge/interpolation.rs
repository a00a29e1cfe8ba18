//! The active translation seen by callables.
//!
//! A callable read through a [`MergedView`](super::MergedView) is wrapped into an
//! [`Interpolated`]. Invoking it makes the view's root the *active root* of the current thread
//! for the duration of the call, so that [`current`] can read other fields in the same language
//! without the callable being told which language that is.

use std::cell::RefCell;

use super::view::{
    Resolved,
    RootContext,
};
use crate::types::{
    DEFAULT_KEY_SEPARATOR,
    Key,
    KeyPath,
    KeyPathError,
};
use crate::value::{
    Callable,
    Value,
};

thread_local! {
    /// Root of the translation whose callable is running on this thread, if any.
    static ACTIVE_ROOT: RefCell<Option<RootContext>> = const { RefCell::new(None) };
}

/// Returns the active root of this thread.
fn active_root() -> Option<RootContext> {
    ACTIVE_ROOT.with(|slot| slot.borrow().clone())
}

/// Whether this thread is currently inside a merge-triggered call.
#[must_use]
pub fn has_active_translation() -> bool {
    ACTIVE_ROOT.with(|slot| slot.borrow().is_some())
}

/// Makes a root active until dropped, then restores whatever was active before.
///
/// Restoring in `Drop` covers early returns and unwinding panics alike.
#[derive(Debug)]
pub(super) struct ActiveRootGuard {
    /// The root that was active when this guard was created.
    previous: Option<RootContext>,
}

impl ActiveRootGuard {
    /// Makes `root` active on this thread.
    pub(super) fn activate(root: RootContext) -> Self {
        let previous = ACTIVE_ROOT.with(|slot| slot.replace(Some(root)));
        Self { previous }
    }
}

impl Drop for ActiveRootGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        // The slot is gone if the thread is already tearing down its locals.
        let _ = ACTIVE_ROOT.try_with(|slot| slot.replace(previous));
    }
}

/// A callable resolved through a merged view.
///
/// Calling it runs the function with `this` bound to the declaring record of the *base* tree,
/// whichever translation supplied the function, and with the view's root active.
#[derive(Debug, Clone)]
pub struct Interpolated {
    /// `None` for callables read without merging; those leave the active root alone.
    root: Option<RootContext>,
    /// Declaring record in the base tree.
    this: Value,
    /// The function itself, from whichever candidate won.
    callable: Callable,
}

impl Interpolated {
    /// A callable read through the view rooted at `root`.
    pub(super) const fn bound(root: RootContext, this: Value, callable: Callable) -> Self {
        Self { root: Some(root), this, callable }
    }

    /// A callable read straight from a tree.
    pub(super) const fn unbound(this: Value, callable: Callable) -> Self {
        Self { root: None, this, callable }
    }

    /// Invokes the callable with `args`.
    #[must_use]
    pub fn call(&self, args: &[Value]) -> Value {
        let _active = self.root.clone().map(ActiveRootGuard::activate);
        self.callable.invoke(&self.this, args)
    }

    /// The record the callable was declared on.
    #[must_use]
    pub const fn this(&self) -> &Value {
        &self.this
    }

    /// Whether calling activates a translation.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.root.is_some()
    }

    /// Wraps the binding into a plain callable that can be stored in another tree.
    #[must_use]
    pub fn to_callable(&self) -> Callable {
        let interpolated = self.clone();
        Callable::new(move |call| interpolated.call(call.args()))
    }
}

/// Returns a view of whichever translation is active on this thread.
///
/// Inside a callable invoked through a merged view, reads resolve through that view's root.
/// Anywhere else, or for keys the active root cannot resolve, they read `base` directly.
///
/// ```
/// use t9n::{current, record, translated, Value};
///
/// let base = record! { "name" => "Sweden" };
/// let swedish = translated(base.clone(), [record! { "name" => "Sverige" }]);
///
/// let outside = current(&base).get("name").map(|name| name.to_string());
/// let inside = swedish.enter(|| current(&base).get("name").map(|name| name.to_string()));
///
/// assert_eq!(outside.as_deref(), Some("Sweden"));
/// assert_eq!(inside.as_deref(), Some("Sverige"));
/// ```
#[must_use]
pub fn current(base: &Value) -> CurrentView {
    CurrentView { base: base.clone() }
}

/// See [`current`].
#[derive(Debug, Clone)]
pub struct CurrentView {
    /// Tree read when no active root resolves a key.
    base: Value,
}

impl CurrentView {
    /// Resolves `key` against the active root, falling back to the unmerged base.
    pub fn get(&self, key: impl Into<Key>) -> Option<Resolved> {
        let key = key.into();
        active_root()
            .and_then(|root| root.view().get(&key))
            .or_else(|| Resolved::raw_field(&self.base, &key))
    }

    #[must_use]
    pub fn lookup(&self, path: &KeyPath) -> Option<Resolved> {
        let (first, rest) = path.keys().split_first()?;
        rest.iter().try_fold(self.get(first)?, |resolved, key| resolved.get(key))
    }

    /// Parses `path` with the default `.` separator and resolves it.
    ///
    /// # Errors
    /// Returns [`KeyPathError`] if `path` is malformed.
    pub fn at(&self, path: &str) -> Result<Option<Resolved>, KeyPathError> {
        Ok(self.lookup(&KeyPath::parse(path, DEFAULT_KEY_SEPARATOR)?))
    }

    #[must_use]
    pub const fn base(&self) -> &Value {
        &self.base
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::panic::{
        AssertUnwindSafe,
        catch_unwind,
    };
    use std::sync::LazyLock;

    use googletest::prelude::*;

    use super::*;
    use crate::merge::translated;
    use crate::record;

    static BASE: LazyLock<Value> = LazyLock::new(|| {
        record! {
            "direct" => Value::callable(|_| Value::from("base")),
            "indirect" => Value::callable(|_| {
                current(&BASE).get("direct").and_then(|direct| direct.call(&[])).unwrap_or_default()
            }),
            "explode" => Value::callable(|_| panic!("callable failed")),
        }
    });

    fn swedish() -> crate::merge::MergedView {
        translated(BASE.clone(), [record! { "direct" => Value::callable(|_| Value::from("bas")) }])
    }

    fn call(resolved: Option<Resolved>) -> Option<String> {
        resolved.and_then(|resolved| resolved.call(&[])).map(|value| value.to_string())
    }

    #[googletest::test]
    fn test_current_outside_any_call_reads_base() {
        expect_that!(has_active_translation(), eq(false));
        expect_that!(call(current(&BASE).get("direct")), some(eq("base")));
        expect_that!(call(current(&BASE).get("indirect")), some(eq("base")));
    }

    #[googletest::test]
    fn test_wrapped_call_activates_its_root() {
        let swedish = swedish();

        expect_that!(call(swedish.get("direct")), some(eq("bas")));
        expect_that!(call(swedish.get("indirect")), some(eq("bas")));
        expect_that!(has_active_translation(), eq(false));
    }

    #[googletest::test]
    fn test_enter_restores_previous_root() {
        let outer = swedish();
        let inner = translated(BASE.clone(), Vec::<Value>::new());

        let seen = outer.enter(|| {
            let during = call(current(&BASE).get("direct"));
            let nested = inner.enter(|| call(current(&BASE).get("direct")));
            let after = call(current(&BASE).get("direct"));
            (during, nested, after)
        });

        expect_that!(seen.0, some(eq("bas")));
        expect_that!(seen.1, some(eq("base")));
        expect_that!(seen.2, some(eq("bas")));
        expect_that!(has_active_translation(), eq(false));
    }

    #[googletest::test]
    fn test_root_is_restored_when_a_callable_panics() {
        let english = translated(BASE.clone(), Vec::<Value>::new());
        let explode = swedish().get("explode").unwrap();

        let outcome = english.enter(|| {
            let result = catch_unwind(AssertUnwindSafe(|| explode.call(&[])));
            (result.is_err(), call(current(&BASE).get("direct")))
        });

        expect_that!(outcome.0, eq(true));
        expect_that!(outcome.1, some(eq("base")));
        expect_that!(has_active_translation(), eq(false));
    }

    #[googletest::test]
    fn test_unbound_callables_leave_the_slot_alone() {
        let direct = current(&BASE).get("direct").unwrap();
        let interpolated = direct.as_interpolated().unwrap();

        expect_that!(interpolated.is_bound(), eq(false));
        expect_that!(swedish().enter(|| call(Some(direct.clone()))), some(eq("base")));
    }

    #[googletest::test]
    fn test_active_root_is_per_thread() {
        let swedish = swedish();

        let other_thread = swedish.enter(|| {
            std::thread::scope(|scope| {
                scope.spawn(|| call(current(&BASE).get("direct"))).join().unwrap()
            })
        });

        expect_that!(other_thread, some(eq("base")));
    }

    #[googletest::test]
    fn test_to_callable_keeps_the_binding() {
        let swedish = swedish();
        let indirect = swedish.get("indirect").unwrap().to_value();

        let result = indirect.as_callable().unwrap().invoke(&Value::Null, &[]);

        expect_that!(result.as_str(), some(eq("bas")));
    }
}
