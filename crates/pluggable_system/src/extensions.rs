//! Typed state attached to instances and targets by plugin hooks.
//!
//! Hooks have no fields of their own to write to, so instances and targets
//! carry an [`Extensions`] map keyed by type. A plugin defines a type for its
//! state and stores one value of it.
//!
//! ```
//! use pluggable_system::extensions::Extensions;
//!
//! #[derive(Debug, PartialEq)]
//! struct CacheSize(usize);
//!
//! let mut extensions = Extensions::new();
//! extensions.insert(CacheSize(16));
//! extensions.get_mut::<CacheSize>().unwrap().0 += 1;
//!
//! assert_eq!(extensions.get::<CacheSize>(), Some(&CacheSize(17)));
//! ```

use core::any::{Any, TypeId};

use hashbrown::HashMap;

/// Type-erased extension value.
type BoxedExtension = Box<dyn Any + Send + Sync>;

/// A map holding at most one value per type.
#[derive(Default)]
pub struct Extensions {
    values: HashMap<TypeId, BoxedExtension>,
}

impl core::fmt::Debug for Extensions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Extensions")
            .field("len", &self.values.len())
            .finish()
    }
}

impl Extensions {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous value of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) -> Option<T> {
        self.values
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    /// Returns a reference to the value of type `T`.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
    }

    /// Returns a mutable reference to the value of type `T`.
    #[must_use]
    pub fn get_mut<T: Any + Send + Sync>(&mut self) -> Option<&mut T> {
        self.values
            .get_mut(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_mut::<T>())
    }

    /// Returns the value of type `T`, inserting one built by `init` if absent.
    pub fn get_or_insert_with<T: Any + Send + Sync>(&mut self, init: impl FnOnce() -> T) -> &mut T {
        let boxed = self
            .values
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(init()));
        // The entry is keyed by `TypeId::of::<T>()`, so the downcast cannot fail.
        match boxed.downcast_mut::<T>() {
            Some(value) => value,
            None => unreachable!("extension stored under a foreign TypeId"),
        }
    }

    /// Removes and returns the value of type `T`.
    pub fn remove<T: Any + Send + Sync>(&mut self) -> Option<T> {
        self.values
            .remove(&TypeId::of::<T>())
            .and_then(|old| old.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    /// Returns true if a value of type `T` is stored.
    #[must_use]
    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Counter(u32);

    #[derive(Debug, PartialEq)]
    struct Label(&'static str);

    #[test]
    fn insert_replaces_value_of_same_type() {
        let mut extensions = Extensions::new();
        assert_eq!(extensions.insert(Counter(1)), None);
        assert_eq!(extensions.insert(Counter(2)), Some(Counter(1)));
        assert_eq!(extensions.len(), 1);
    }

    #[test]
    fn values_are_keyed_by_type() {
        let mut extensions = Extensions::new();
        extensions.insert(Counter(3));
        extensions.insert(Label("cache"));

        assert_eq!(extensions.get::<Counter>(), Some(&Counter(3)));
        assert_eq!(extensions.get::<Label>(), Some(&Label("cache")));
        assert!(!extensions.contains::<String>());
    }

    #[test]
    fn get_or_insert_with_initializes_once() {
        let mut extensions = Extensions::new();
        extensions.get_or_insert_with(|| Counter(0)).0 += 1;
        extensions.get_or_insert_with(|| Counter(100)).0 += 1;

        assert_eq!(extensions.remove::<Counter>(), Some(Counter(2)));
        assert!(extensions.is_empty());
    }
}
