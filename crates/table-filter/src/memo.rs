//! Identity-keyed memoization.
//!
//! A [`Memo`] holds one computed value together with the dependencies it was
//! computed from. Dependencies compare by identity ([`Arc::ptr_eq`]) rather
//! than by content, so a cache check is O(1) no matter how large the dataset
//! is. Replacing a dependency with a new `Arc` (even one with equal content)
//! invalidates the cached value.
//!
//! The memo keeps a clone of every dependency it was keyed on, so an
//! address can't be freed and reused by a different value while it is
//! still in the cache.

use std::sync::{Arc, Mutex, PoisonError};

use crate::data::FilterStrategy;

/// A value a [`Memo`] can be keyed on.
pub(crate) trait Dependency: Clone {
    /// Returns `true` if `self` and `other` are the same dependency.
    fn same(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Dependency for Arc<T> {
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl Dependency for FilterStrategy {
    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

macro_rules! tuple_dependency {
    ($($name:ident $idx:tt),+) => {
        impl<$($name: Dependency),+> Dependency for ($($name,)+) {
            fn same(&self, other: &Self) -> bool {
                $(self.$idx.same(&other.$idx))&&+
            }
        }
    };
}

tuple_dependency!(A 0, B 1);
tuple_dependency!(A 0, B 1, C 2, D 3, E 4);

/// Single-slot cache keyed by dependency identity.
pub(crate) struct Memo<D, V> {
    slot: Mutex<Option<(D, V)>>,
}

impl<D: Dependency, V: Clone> Memo<D, V> {
    pub(crate) fn new() -> Self {
        Memo {
            slot: Mutex::new(None),
        }
    }

    /// Returns the cached value if it was computed from `deps`.
    pub(crate) fn get(&self, deps: &D) -> Option<V> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some((cached, value)) if cached.same(deps) => Some(value.clone()),
            _ => None,
        }
    }

    /// Returns the cached value for `deps`, computing and storing it first
    /// if the dependencies changed.
    pub(crate) fn get_or_init(&self, deps: D, compute: impl FnOnce() -> V) -> V {
        if let Some(value) = self.get(&deps) {
            return value;
        }
        let value = compute();
        self.store(deps, value.clone());
        value
    }

    fn store(&self, deps: D, value: V) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some((deps, value));
    }
}
