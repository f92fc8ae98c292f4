//! Versioned Cache - Process-local copies of canonical records
//!
//! Every entry carries a version counter that only ever moves forward
//! for the lifetime of the process. There is no eviction and no TTL:
//! an entry lives until it is overwritten or the process exits.
//!
//! One `RwLock` guards every key of a cache (coarse-grained). Readers
//! share the lock only long enough to clone an entry out, so no caller
//! ever holds it across a store round-trip. Writers hold it for the
//! whole read-modify-write of value and version.
//!
//! Every write also advances a per-key write generation, cached or not.
//! A read-through snapshots the generation before going to the store
//! and `populate` refuses the fetched value if a write landed meanwhile:
//!
//! ```text
//! reader: generation() = g ── store read ─────────────── populate(g) → Superseded
//! writer:                        store write ── record (g + 1)
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A cached value plus its version counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedEntry<T> {
    pub value: T,
    pub version: u64,
}

impl<T> VersionedEntry<T> {
    /// Fresh entry at version 0
    pub fn new(value: T) -> Self {
        Self { value, version: 0 }
    }
}

/// Outcome of removing an element from a list-valued entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal<E> {
    /// The element that was removed, if one matched
    pub removed: Option<E>,
    /// Entry version after the removal
    pub version: u64,
}

/// Count of writes applied to one key, snapshotted before a store read
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct WriteGeneration(u64);

/// Outcome of a read-through `populate`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Populated<T> {
    /// The entry now cached, either the fetched value or one already there
    Cached(VersionedEntry<T>),
    /// A write landed after the snapshot; the fetched value was not cached
    Superseded(T),
}

#[derive(Debug)]
struct Slots<K, T> {
    entries: HashMap<K, VersionedEntry<T>>,
    writes: HashMap<K, u64>,
}

impl<K, T> Slots<K, T>
where
    K: Eq + Hash + Clone,
{
    fn generation(&self, key: &K) -> WriteGeneration {
        WriteGeneration(self.writes.get(key).copied().unwrap_or(0))
    }

    fn record_write(&mut self, key: &K) {
        match self.writes.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.writes.insert(key.clone(), 1);
            }
        }
    }
}

/// Keyed map of versioned entries behind a single lock
#[derive(Debug)]
pub struct VersionedCache<K, T> {
    slots: RwLock<Slots<K, T>>,
}

impl<K, T> Default for VersionedCache<K, T> {
    fn default() -> Self {
        Self {
            slots: RwLock::new(Slots {
                entries: HashMap::new(),
                writes: HashMap::new(),
            }),
        }
    }
}

impl<K, T> VersionedCache<K, T>
where
    K: Eq + Hash + Clone,
    T: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking writer can only poison the lock between whole-entry
    // assignments, so the map itself is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, Slots<K, T>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slots<K, T>> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy an entry out, `None` on miss
    pub fn get(&self, key: &K) -> Option<VersionedEntry<T>> {
        self.read().entries.get(key).cloned()
    }

    /// Current version, 0 when the key was never cached
    pub fn version(&self, key: &K) -> u64 {
        self.read().entries.get(key).map(|e| e.version).unwrap_or(0)
    }

    /// Writes applied to `key` so far, cached or cold
    pub fn generation(&self, key: &K) -> WriteGeneration {
        self.read().generation(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.read().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Insert or replace an entry, the raw write every caller with a
    /// known-fresh value goes through
    ///
    /// With `bump` the version becomes prior + 1 (prior is 0 when absent),
    /// otherwise the prior version is kept. Returns the resulting version.
    pub fn upsert(&self, key: K, value: T, bump: bool) -> u64 {
        let mut slots = self.write();
        slots.record_write(&key);
        let prior = slots.entries.get(&key).map(|e| e.version).unwrap_or(0);
        let version = if bump { prior + 1 } else { prior };
        slots.entries.insert(key, VersionedEntry { value, version });
        version
    }

    /// Fill a cold key after a read-through miss
    ///
    /// `seen` is the generation taken before the store read. An entry that
    /// is already cached always wins, so a slow reader can never roll a
    /// version back. A cold key whose generation moved past `seen` means a
    /// write committed while the caller was fetching; the fetched value may
    /// predate it and is handed back uncached.
    pub fn populate(&self, key: K, value: T, seen: WriteGeneration) -> Populated<T> {
        let mut slots = self.write();
        if let Some(existing) = slots.entries.get(&key) {
            return Populated::Cached(existing.clone());
        }
        if slots.generation(&key) != seen {
            return Populated::Superseded(value);
        }
        let entry = VersionedEntry::new(value);
        slots.entries.insert(key, entry.clone());
        Populated::Cached(entry)
    }

    /// Mutate an entry in place, only if it is already cached
    ///
    /// The presence check and the mutation happen under one write lock.
    /// Cold keys still have the write recorded. Returns the resulting
    /// version, or `None` when the key is cold.
    pub fn update_existing<F>(&self, key: &K, bump: bool, mutate: F) -> Option<u64>
    where
        F: FnOnce(&mut T),
    {
        let mut slots = self.write();
        slots.record_write(key);
        let entry = slots.entries.get_mut(key)?;
        mutate(&mut entry.value);
        if bump {
            entry.version += 1;
        }
        Some(entry.version)
    }
}

impl<K, E> VersionedCache<K, Vec<E>>
where
    K: Eq + Hash + Clone,
    E: Clone,
{
    /// Remove the first element matching `matches` from a cached list
    ///
    /// Swap-delete: the last element takes the freed slot and the list
    /// shrinks by one, so relative order is NOT preserved. Returns `None`
    /// when the key is cold (the write is still recorded). A present entry counts as touched even when
    /// nothing matched, and is bumped accordingly.
    pub fn remove_from_collection<F>(&self, key: &K, bump: bool, matches: F) -> Option<Removal<E>>
    where
        F: FnMut(&E) -> bool,
    {
        let mut slots = self.write();
        slots.record_write(key);
        let entry = slots.entries.get_mut(key)?;
        let removed = entry
            .value
            .iter()
            .position(matches)
            .map(|index| entry.value.swap_remove(index));
        if bump {
            entry.version += 1;
        }
        Some(Removal {
            removed,
            version: entry.version,
        })
    }
}
