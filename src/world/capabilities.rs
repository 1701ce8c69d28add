//! Type-erased per-scenario state.
//!
//! `CapabilityStore` holds one value per concrete type, keyed by `TypeId`.
//! Unlike shared application data, world state is owned by a single scenario
//! and mutated by its steps, so values are boxed rather than reference
//! counted and can be borrowed mutably.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
};

/// Stores scenario-scoped values keyed by concrete type.
///
/// # Examples
///
/// ```rust
/// use lucid::world::CapabilityStore;
///
/// let mut store = CapabilityStore::default();
/// store.insert(41u32);
/// *store.get_mut::<u32>().expect("value should exist") += 1;
/// assert_eq!(store.get::<u32>(), Some(&42));
/// ```
#[derive(Default)]
pub struct CapabilityStore {
    values: HashMap<TypeId, Box<dyn Any + Send>>,
}

impl CapabilityStore {
    /// Insert a value of type `T`, replacing any existing value of that type.
    pub fn insert<T>(&mut self, value: T)
    where
        T: Send + 'static,
    {
        self.values.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Insert `value` only if no value of type `T` is stored.
    ///
    /// Returns `true` if the value was inserted.
    pub fn insert_if_absent<T>(&mut self, value: T) -> bool
    where
        T: Send + 'static,
    {
        if self.contains::<T>() {
            return false;
        }
        self.insert(value);
        true
    }

    /// Borrow the value of type `T`, if present.
    #[must_use]
    pub fn get<T>(&self) -> Option<&T>
    where
        T: Send + 'static,
    {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Mutably borrow the value of type `T`, if present.
    pub fn get_mut<T>(&mut self) -> Option<&mut T>
    where
        T: Send + 'static,
    {
        self.values
            .get_mut(&TypeId::of::<T>())
            .and_then(|value| value.downcast_mut::<T>())
    }

    /// Whether a value of type `T` is stored.
    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool { self.values.contains_key(&TypeId::of::<T>()) }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize { self.values.len() }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.values.is_empty() }
}
