//! Unit Cache - per-loader resolution state
//!
//! Four maps, each behind its own lock:
//! - `slots`: one single-flight slot per name; whoever holds the slot lock
//!   performs the load/transform/define, later holders read the outcome
//! - `defined`: names in the `Defined` state
//! - `bad`: the permanent negative set
//! - `raw` / `missing`: results of byte lookups against the bundle, so a
//!   lookup happens at most once per name

use super::error::ResolveError;
use crate::runtime::LoadedUnit;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Outcome stored in a resolution slot
pub(crate) type Outcome = Result<Arc<LoadedUnit>, ResolveError>;

/// Single-flight slot for one name
pub(crate) type Slot = Arc<Mutex<Option<Outcome>>>;

/// Observable state of a name within one loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitState {
    /// Never requested
    Unresolved,
    /// Raw bytes fetched, not yet defined
    BytesLoaded,
    /// Another caller is loading/transforming/defining it right now
    Resolving,
    Defined,
    /// Byte lookup found nothing
    Missing,
    /// Failed definition or transformation
    Bad,
}

#[derive(Default)]
pub struct UnitCache {
    slots: Mutex<HashMap<String, Slot>>,
    defined: RwLock<HashMap<String, Arc<LoadedUnit>>>,
    bad: RwLock<HashSet<String>>,
    raw: Mutex<HashMap<String, Arc<[u8]>>>,
    missing: RwLock<HashSet<String>>,
}

impl UnitCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_bad(&self, name: &str) -> bool {
        self.bad.read().contains(name)
    }

    pub fn mark_bad(&self, name: &str) {
        self.bad.write().insert(name.to_string());
        self.raw.lock().remove(name);
    }

    pub fn defined(&self, name: &str) -> Option<Arc<LoadedUnit>> {
        self.defined.read().get(name).cloned()
    }

    /// Record a defined unit; raw bytes are no longer needed
    pub fn insert_defined(&self, unit: Arc<LoadedUnit>) {
        self.raw.lock().remove(unit.name());
        self.defined.write().insert(unit.name().to_string(), unit);
    }

    /// The slot for `name`, created on first use
    pub(crate) fn slot(&self, name: &str) -> Slot {
        let mut slots = self.slots.lock();
        Arc::clone(slots.entry(name.to_string()).or_default())
    }

    /// Raw bytes for `name`, calling `fetch` only on the first request
    ///
    /// Callers hold the name's slot lock, so `fetch` never runs twice for
    /// one name.
    pub fn raw_bytes<F>(&self, name: &str, fetch: F) -> Option<Arc<[u8]>>
    where
        F: FnOnce() -> Option<Arc<[u8]>>,
    {
        if self.missing.read().contains(name) {
            return None;
        }
        if let Some(bytes) = self.raw.lock().get(name) {
            return Some(Arc::clone(bytes));
        }

        match fetch() {
            Some(bytes) => {
                self.raw.lock().insert(name.to_string(), Arc::clone(&bytes));
                Some(bytes)
            }
            None => {
                self.missing.write().insert(name.to_string());
                None
            }
        }
    }

    pub fn state(&self, name: &str) -> UnitState {
        if self.defined.read().contains_key(name) {
            return UnitState::Defined;
        }
        if self.missing.read().contains(name) {
            return UnitState::Missing;
        }
        if self.bad.read().contains(name) {
            return UnitState::Bad;
        }

        let slot = self.slots.lock().get(name).cloned();
        if let Some(slot) = slot {
            if slot.try_lock().is_none() {
                return UnitState::Resolving;
            }
        }

        if self.raw.lock().contains_key(name) {
            UnitState::BytesLoaded
        } else {
            UnitState::Unresolved
        }
    }

    pub fn defined_count(&self) -> usize {
        self.defined.read().len()
    }

    /// Names in the negative set, sorted
    pub fn bad_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.bad.read().iter().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_raw_lookup_happens_once() {
        let cache = UnitCache::new();
        let calls = Cell::new(0);

        for _ in 0..3 {
            let found = cache.raw_bytes("demo.A", || {
                calls.set(calls.get() + 1);
                Some(Arc::from(&b"bytes"[..]))
            });
            assert_eq!(found.as_deref(), Some(&b"bytes"[..]));
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.state("demo.A"), UnitState::BytesLoaded);
    }

    #[test]
    fn test_missing_is_remembered() {
        let cache = UnitCache::new();
        let calls = Cell::new(0);

        for _ in 0..2 {
            assert!(cache
                .raw_bytes("demo.Gone", || {
                    calls.set(calls.get() + 1);
                    None
                })
                .is_none());
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.state("demo.Gone"), UnitState::Missing);
    }

    #[test]
    fn test_bad_and_slot_states() {
        let cache = UnitCache::new();
        assert_eq!(cache.state("demo.B"), UnitState::Unresolved);

        let slot = cache.slot("demo.B");
        let guard = slot.lock();
        assert_eq!(cache.state("demo.B"), UnitState::Resolving);
        drop(guard);

        cache.mark_bad("demo.B");
        assert!(cache.is_bad("demo.B"));
        assert_eq!(cache.state("demo.B"), UnitState::Bad);
        assert_eq!(cache.bad_names(), vec!["demo.B".to_string()]);
    }

    #[test]
    fn test_slot_is_shared() {
        let cache = UnitCache::new();
        let a = cache.slot("demo.C");
        let b = cache.slot("demo.C");
        assert!(Arc::ptr_eq(&a, &b));
    }
}
