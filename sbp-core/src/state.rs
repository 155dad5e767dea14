//! # Domain State
//!
//! Each domain owns one private [`DomainState`], created empty when the domain
//! first appears and handed to every handler of that domain as its first
//! parameter.
//!
//! The state is a record keyed by Rust type: a domain stores at most one value
//! per type. Values are shared as `Arc<T>`; data a handler mutates should sit
//! behind interior mutability (`Mutex`, atomics, ...).
//!
//! The slot table lock is only held for the duration of a single slot
//! operation, never across a handler call, so handlers may dispatch back into
//! their own domain.
//!
//! # Example
//!
//! ```rust
//! use sbp_core::DomainState;
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! let state = DomainState::new("counter");
//! let hits = state.get_or_insert_with(|| AtomicU64::new(0));
//! hits.fetch_add(1, Ordering::Relaxed);
//! assert_eq!(state.get::<AtomicU64>().unwrap().load(Ordering::Relaxed), 1);
//! ```

use parking_lot::RwLock;
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    sync::Arc,
};

type Slot = Arc<dyn Any + Send + Sync>;

/// Private, type-keyed state of one domain.
pub struct DomainState {
    domain: String,
    slots: RwLock<HashMap<TypeId, Slot>>,
}

impl DomainState {
    /// Create the empty state of `domain`.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Name of the owning domain.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Store `value`, returning the previous value of the same type.
    pub fn insert<T: Send + Sync + 'static>(&self, value: T) -> Option<Arc<T>> {
        self.slots
            .write()
            .insert(TypeId::of::<T>(), Arc::new(value))
            .and_then(downcast)
    }

    /// Get the value of type `T`, if one was stored.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.slots
            .read()
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(downcast)
    }

    /// Get the value of type `T`, storing `init()` first if absent.
    ///
    /// `init` runs without the slot lock held. If two callers race, the first
    /// stored value wins and both observe it.
    pub fn get_or_insert_with<T, F>(&self, init: F) -> Arc<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        if let Some(existing) = self.get::<T>() {
            return existing;
        }
        let fresh = Arc::new(init());
        let mut slots = self.slots.write();
        let key = TypeId::of::<T>();
        if let Some(stored) = slots.get(&key).cloned().and_then(downcast) {
            return stored;
        }
        slots.insert(key, fresh.clone());
        fresh
    }

    /// Remove and return the value of type `T`.
    pub fn remove<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.slots
            .write()
            .remove(&TypeId::of::<T>())
            .and_then(downcast)
    }

    /// Whether a value of type `T` is stored.
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.slots.read().contains_key(&TypeId::of::<T>())
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// Whether nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }
}

fn downcast<T: Send + Sync + 'static>(slot: Slot) -> Option<Arc<T>> {
    slot.downcast::<T>().ok()
}

impl fmt::Debug for DomainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainState")
            .field("domain", &self.domain)
            .field("slots", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct Config {
        name: &'static str,
    }

    #[test]
    fn test_new_state_is_empty() {
        let state = DomainState::new("math");
        assert_eq!(state.domain(), "math");
        assert!(state.is_empty());
        assert!(state.get::<Config>().is_none());
    }

    #[test]
    fn test_insert_replaces_same_type() {
        let state = DomainState::new("d");
        assert!(state.insert(Config { name: "a" }).is_none());
        let old = state.insert(Config { name: "b" }).unwrap();
        assert_eq!(old.name, "a");
        assert_eq!(state.get::<Config>().unwrap().name, "b");
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_slots_are_per_type() {
        let state = DomainState::new("d");
        state.insert(5u32);
        state.insert(String::from("five"));
        assert_eq!(*state.get::<u32>().unwrap(), 5);
        assert_eq!(*state.get::<String>().unwrap(), "five");
        assert!(state.contains::<u32>());
        assert!(!state.contains::<u64>());
    }

    #[test]
    fn test_get_or_insert_with_runs_init_once() {
        let state = DomainState::new("d");
        let runs = AtomicUsize::new(0);
        let first = state.get_or_insert_with(|| {
            runs.fetch_add(1, Ordering::SeqCst);
            AtomicUsize::new(10)
        });
        let second = state.get_or_insert_with(|| {
            runs.fetch_add(1, Ordering::SeqCst);
            AtomicUsize::new(20)
        });
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.load(Ordering::SeqCst), 10);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_init_may_touch_state() {
        let state = DomainState::new("d");
        let value = state.get_or_insert_with(|| {
            state.insert(1u8);
            Config { name: "nested" }
        });
        assert_eq!(value.name, "nested");
        assert!(state.contains::<u8>());
    }

    #[test]
    fn test_get_or_insert_with_keeps_value_stored_during_init() {
        let state = DomainState::new("d");
        let value = state.get_or_insert_with(|| {
            state.insert(Config { name: "first" });
            Config { name: "late" }
        });
        assert_eq!(value.name, "first");
        assert!(Arc::ptr_eq(&value, &state.get::<Config>().unwrap()));
    }

    #[test]
    fn test_remove() {
        let state = DomainState::new("d");
        state.insert(Config { name: "gone" });
        assert_eq!(state.remove::<Config>().unwrap().name, "gone");
        assert!(state.remove::<Config>().is_none());
        assert!(state.is_empty());
    }
}
