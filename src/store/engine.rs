//! Store engine
//!
//! Owns the forward store (key → ordered values), the expiration map and the
//! reverse index (value → set of keys) behind a single readers-writer lock.
//! Every public operation is atomic with respect to every other; the
//! invariant `v ∈ store[k] ⟺ k ∈ reverse[v]` holds at every quiescent point.
//!
//! Expiration is lazy with one consistent rule: an expired key is invisible
//! to every operation. Read-path operations report it as absent without
//! mutating; operations that hold the write lock physically prune the key,
//! its expiration record and its reverse-index links.

use super::error::StoreError;
use super::expiry;
use parking_lot::RwLock;
use rand::seq::SliceRandom;
use siphasher::sip::SipHasher13;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::BuildHasherDefault;
use std::time::Duration;

/// Forward store map with SipHasher
pub type StoreMap = HashMap<String, Vec<String>, BuildHasherDefault<SipHasher13>>;

/// Expiration map: key → absolute deadline in epoch milliseconds
pub type ExpiryMap = HashMap<String, u64, BuildHasherDefault<SipHasher13>>;

/// Reverse index: value → keys currently containing it
pub type ReverseMap = HashMap<String, BTreeSet<String>, BuildHasherDefault<SipHasher13>>;

/// The three maps guarded by the engine lock
#[derive(Debug, Default)]
struct EngineState {
    store: StoreMap,
    expiry: ExpiryMap,
    reverse: ReverseMap,
}

impl EngineState {
    /// Whether the key carries a deadline that has passed
    fn is_key_expired(&self, key: &str, now_ms: u64) -> bool {
        self.expiry
            .get(key)
            .map(|&deadline| expiry::is_expired(deadline, now_ms))
            .unwrap_or(false)
    }

    /// Value sequence for a key, `None` when absent or expired
    fn live(&self, key: &str, now_ms: u64) -> Option<&Vec<String>> {
        if self.is_key_expired(key, now_ms) {
            return None;
        }
        self.store.get(key)
    }

    /// Register a value → key link in the reverse index
    fn link(&mut self, value: &str, key: &str) {
        self.reverse
            .entry(value.to_string())
            .or_default()
            .insert(key.to_string());
    }

    /// Remove a value → key link, pruning the value entry if it empties
    fn unlink(&mut self, value: &str, key: &str) {
        if let Some(keys) = self.reverse.get_mut(value) {
            keys.remove(key);
            if keys.is_empty() {
                self.reverse.remove(value);
            }
        }
    }

    /// Remove a key, its expiration record and all its reverse links
    fn remove_key(&mut self, key: &str) {
        if let Some(values) = self.store.remove(key) {
            // Unlink once per distinct value; duplicates share one link
            let distinct: HashSet<&String> = values.iter().collect();
            for value in distinct {
                self.unlink(value, key);
            }
        }
        self.expiry.remove(key);
    }

    /// Prune the key entirely if its deadline has passed
    fn purge_if_expired(&mut self, key: &str, now_ms: u64) {
        if self.is_key_expired(key, now_ms) {
            self.remove_key(key);
        }
    }
}

/// In-memory multi-value store with a reverse index
///
/// Callers receive an explicit handle (usually behind an `Arc`); there are
/// no process-wide singletons. The lock is the only synchronization point:
/// reads run concurrently, writes are exclusive.
pub struct StoreEngine {
    state: RwLock<EngineState>,
}

impl StoreEngine {
    /// Create an empty engine
    pub fn new() -> Self {
        StoreEngine {
            state: RwLock::new(EngineState::default()),
        }
    }

    /// Append values to a key, creating it if absent
    ///
    /// Insertion order is preserved and duplicates are allowed. Never fails
    /// for well-formed input.
    pub fn set(&self, key: &str, values: Vec<String>) {
        let now = expiry::now_millis();
        let mut state = self.state.write();
        state.purge_if_expired(key, now);

        for value in &values {
            state.link(value, key);
        }
        state
            .store
            .entry(key.to_string())
            .or_default()
            .extend(values);
    }

    /// Replace a key's values with the de-duplicated union of the existing
    /// and new values
    ///
    /// The contract is membership, not order; this implementation stores the
    /// union sorted so results are deterministic. The reverse index is
    /// reconciled both ways: links for values no longer present are removed,
    /// links for new values are added.
    pub fn set_unique(&self, key: &str, values: Vec<String>) {
        let now = expiry::now_millis();
        let mut state = self.state.write();
        state.purge_if_expired(key, now);

        let mut union: BTreeSet<String> = values.into_iter().collect();
        let previous = state.store.remove(key).unwrap_or_default();
        union.extend(previous.iter().cloned());

        for value in &previous {
            if !union.contains(value) {
                state.unlink(value, key);
            }
        }
        for value in &union {
            state.link(value, key);
        }

        state
            .store
            .insert(key.to_string(), union.into_iter().collect());
    }

    /// All values for a key, in insertion order
    pub fn get(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let now = expiry::now_millis();
        let state = self.state.read();
        state
            .live(key, now)
            .cloned()
            .ok_or(StoreError::KeyNotFound)
    }

    /// Values for a key with duplicates removed, first-occurrence order
    pub fn get_unique(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let now = expiry::now_millis();
        let state = self.state.read();
        let values = state.live(key, now).ok_or(StoreError::KeyNotFound)?;

        let mut seen: HashSet<&str> = HashSet::new();
        let mut unique = Vec::new();
        for value in values {
            if seen.insert(value.as_str()) {
                unique.push(value.clone());
            }
        }
        Ok(unique)
    }

    /// Remove a key, its expiration record and all its reverse links
    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        let now = expiry::now_millis();
        let mut state = self.state.write();
        state.purge_if_expired(key, now);

        if !state.store.contains_key(key) {
            return Err(StoreError::KeyNotFound);
        }
        state.remove_key(key);
        Ok(())
    }

    /// Remove the first occurrence of a value under a key
    ///
    /// The reverse-index link is dropped only when no occurrence remains,
    /// keeping the forward/reverse invariant intact for duplicated values.
    pub fn remove_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let now = expiry::now_millis();
        let mut state = self.state.write();
        state.purge_if_expired(key, now);

        let values = state.store.get_mut(key).ok_or(StoreError::KeyNotFound)?;
        let position = values
            .iter()
            .position(|v| v == value)
            .ok_or(StoreError::ValueNotFound)?;
        values.remove(position);
        let still_present = values.iter().any(|v| v == value);

        if !still_present {
            state.unlink(value, key);
        }
        Ok(())
    }

    /// Whether the key exists and is not expired
    pub fn exists(&self, key: &str) -> bool {
        let now = expiry::now_millis();
        let state = self.state.read();
        state.live(key, now).is_some()
    }

    /// Set or overwrite the key's expiration deadline to now + ttl
    ///
    /// A ttl of zero expires on the next check.
    pub fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let now = expiry::now_millis();
        let mut state = self.state.write();
        state.purge_if_expired(key, now);

        if !state.store.contains_key(key) {
            return Err(StoreError::KeyNotFound);
        }
        state
            .expiry
            .insert(key.to_string(), expiry::deadline_after(now, ttl));
        Ok(())
    }

    /// Remaining time until the key's expiration
    ///
    /// Fails with `NoExpirySet` when no record exists. When the deadline has
    /// passed this performs eager cleanup of the key, its expiration record
    /// and its reverse-index links, then fails with `Expired`.
    pub fn ttl(&self, key: &str) -> Result<Duration, StoreError> {
        let now = expiry::now_millis();
        let mut state = self.state.write();

        let deadline = *state.expiry.get(key).ok_or(StoreError::NoExpirySet)?;
        match expiry::remaining(deadline, now) {
            Some(rem) => Ok(rem),
            None => {
                state.remove_key(key);
                Err(StoreError::Expired)
            }
        }
    }

    /// `count` values drawn from the key's sequence without replacement,
    /// uniformly shuffled
    ///
    /// Fails with `InvalidCount` when `count` is zero or exceeds the number
    /// of stored values.
    pub fn random_values(&self, key: &str, count: usize) -> Result<Vec<String>, StoreError> {
        let now = expiry::now_millis();
        let state = self.state.read();
        let values = state.live(key, now).ok_or(StoreError::KeyNotFound)?;

        if count == 0 || count > values.len() {
            return Err(StoreError::InvalidCount);
        }

        let mut shuffled = values.clone();
        shuffled.shuffle(&mut rand::thread_rng());
        shuffled.truncate(count);
        Ok(shuffled)
    }

    /// All keys currently associated with a value, lexicographically ordered
    ///
    /// Expired keys are filtered out. Fails with `KeyNotFound` when no live
    /// key maps to the value.
    pub fn keys_for_value(&self, value: &str) -> Result<Vec<String>, StoreError> {
        let now = expiry::now_millis();
        let state = self.state.read();
        let keys: Vec<String> = state
            .reverse
            .get(value)
            .map(|keys| {
                keys.iter()
                    .filter(|key| !state.is_key_expired(key, now))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if keys.is_empty() {
            return Err(StoreError::KeyNotFound);
        }
        Ok(keys)
    }

    /// Atomically clear the forward store, expiration map and reverse index
    pub fn delete_all(&self) {
        let mut state = self.state.write();
        *state = EngineState::default();
    }

    /// Number of live (non-expired) keys
    pub fn key_count(&self) -> usize {
        let now = expiry::now_millis();
        let state = self.state.read();
        state
            .store
            .keys()
            .filter(|key| !state.is_key_expired(key, now))
            .count()
    }

    /// Independent copy of the full engine state, taken under the read lock
    pub fn snapshot(&self) -> crate::snapshot::Snapshot {
        let state = self.state.read();
        crate::snapshot::Snapshot {
            store: state.store.clone(),
            expiry: state.expiry.clone(),
            reverse: state.reverse.clone(),
        }
    }

    /// Replace the entire engine state with a snapshot (not a merge)
    pub fn restore(&self, snapshot: crate::snapshot::Snapshot) {
        let mut state = self.state.write();
        *state = EngineState {
            store: snapshot.store,
            expiry: snapshot.expiry,
            reverse: snapshot.reverse,
        };
    }
}

impl Default for StoreEngine {
    fn default() -> Self {
        Self::new()
    }
}
