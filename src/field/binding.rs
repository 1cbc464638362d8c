//! Value bindings: the external `(value, setter)` pair a controller guards.
//!
//! The controller never owns the field value. It reads it and, under policy,
//! writes it through a [`ValueBinding`] handed to it by the caller.

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Read/write capability over a field value.
pub trait ValueBinding {
    /// Current value
    fn value(&self) -> Cow<'_, str>;

    /// Replace the value
    fn set_value(&mut self, value: String);
}

impl ValueBinding for String {
    fn value(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }

    fn set_value(&mut self, value: String) {
        *self = value;
    }
}

impl<T: ValueBinding + ?Sized> ValueBinding for &mut T {
    fn value(&self) -> Cow<'_, str> {
        (**self).value()
    }

    fn set_value(&mut self, value: String) {
        (**self).set_value(value);
    }
}

/// Cloneable handle to a value shared between a controller and its owner.
///
/// Every clone observes the same value.
#[derive(Debug, Clone, Default)]
pub struct SharedValue(Rc<RefCell<String>>);

impl SharedValue {
    /// Create a shared value
    pub fn new(initial: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(initial.into())))
    }

    /// Snapshot of the current value
    pub fn get(&self) -> String {
        self.0.borrow().clone()
    }

    /// Replace the value
    pub fn set(&self, value: impl Into<String>) {
        *self.0.borrow_mut() = value.into();
    }
}

impl ValueBinding for SharedValue {
    fn value(&self) -> Cow<'_, str> {
        Cow::Owned(self.get())
    }

    fn set_value(&mut self, value: String) {
        self.set(value);
    }
}

/// Explicit accessor/mutator pair.
pub struct FnBinding<G, S> {
    getter: G,
    setter: S,
}

impl<G, S> FnBinding<G, S>
where
    G: Fn() -> String,
    S: FnMut(String),
{
    /// Bind a getter and a setter
    pub fn new(getter: G, setter: S) -> Self {
        Self { getter, setter }
    }
}

impl<G, S> ValueBinding for FnBinding<G, S>
where
    G: Fn() -> String,
    S: FnMut(String),
{
    fn value(&self) -> Cow<'_, str> {
        Cow::Owned((self.getter)())
    }

    fn set_value(&mut self, value: String) {
        (self.setter)(value);
    }
}

impl<G, S> fmt::Debug for FnBinding<G, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnBinding").finish_non_exhaustive()
    }
}

/// A value with no setter.
///
/// Writes are dropped; the controller still computes and returns every
/// change outcome.
#[derive(Debug, Clone, Default)]
pub struct ReadOnlyValue(String);

impl ReadOnlyValue {
    /// Wrap a fixed value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl ValueBinding for ReadOnlyValue {
    fn value(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.0)
    }

    fn set_value(&mut self, value: String) {
        tracing::debug!(len = value.len(), "no setter bound, dropping write");
    }
}
