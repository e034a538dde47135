//! Snapshot codec
//!
//! Serializes the full engine state (forward store, expiration deadlines as
//! absolute epoch-millisecond instants, reverse index) to a self-describing
//! JSON bundle and back. The only format requirement is that the round trip
//! is lossless for all three structures.

use crate::store::{ExpiryMap, ReverseMap, StoreEngine, StoreError, StoreMap};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Point-in-time copy of the engine state
///
/// Holds independent copies with no aliasing back into live engine state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Forward store: key → ordered value sequence
    pub store: StoreMap,

    /// Expiration deadlines: key → epoch milliseconds
    pub expiry: ExpiryMap,

    /// Reverse index: value → keys containing it
    pub reverse: ReverseMap,
}

impl Snapshot {
    /// An empty snapshot
    pub fn empty() -> Self {
        Snapshot {
            store: StoreMap::default(),
            expiry: ExpiryMap::default(),
            reverse: ReverseMap::default(),
        }
    }
}

/// Serialize a snapshot to bytes
pub fn encode(snapshot: &Snapshot) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(snapshot).map_err(|e| StoreError::Io(e.to_string()))
}

/// Parse a previously produced snapshot
pub fn decode(bytes: &[u8]) -> Result<Snapshot, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::MalformedSnapshot(e.to_string()))
}

/// Serialize the engine state and write it to `path`, overwriting any
/// existing file
///
/// The state is captured in one atomic read under the engine's read lock.
pub fn dump_to_file(engine: &StoreEngine, path: &Path) -> Result<(), StoreError> {
    let bytes = encode(&engine.snapshot())?;
    std::fs::write(path, bytes).map_err(|e| StoreError::Io(e.to_string()))
}

/// Read a snapshot file and replace the engine's entire state with it
///
/// Reads and parses before swapping, so prior state is untouched when the
/// file is missing or malformed.
pub fn load_from_dump(engine: &StoreEngine, path: &Path) -> Result<(), StoreError> {
    if !path.exists() {
        return Err(StoreError::FileNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path).map_err(|e| StoreError::Io(e.to_string()))?;
    let snapshot = decode(&bytes)?;
    engine.restore(snapshot);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_round_trip_empty_state() {
        let snapshot = Snapshot::empty();
        let bytes = encode(&snapshot).unwrap();
        assert_eq!(decode(&bytes).unwrap(), snapshot);
    }

    #[test]
    fn test_round_trip_full_state() {
        let engine = StoreEngine::new();
        engine.set("fruits", strings(&["apple", "banana", "apple"]));
        engine.set("veggies", strings(&["carrot"]));
        engine.expire("veggies", Duration::from_secs(3600)).unwrap();
        // A key whose deadline is already in the past must survive the trip
        engine.set("stale", strings(&["old"]));
        engine.expire("stale", Duration::ZERO).unwrap();

        let snapshot = engine.snapshot();
        let bytes = encode(&snapshot).unwrap();
        assert_eq!(decode(&bytes).unwrap(), snapshot);
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        assert!(matches!(
            decode(b"not json at all"),
            Err(StoreError::MalformedSnapshot(_))
        ));
        assert!(matches!(
            decode(br#"{"store": 42}"#),
            Err(StoreError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn test_dump_and_load_replaces_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");

        let source = StoreEngine::new();
        source.set("k1", strings(&["a", "b"]));
        source.expire("k1", Duration::from_secs(3600)).unwrap();
        dump_to_file(&source, &path).unwrap();

        let target = StoreEngine::new();
        target.set("leftover", strings(&["x"]));
        load_from_dump(&target, &path).unwrap();

        // Replaced, not merged
        assert_eq!(target.get("leftover"), Err(StoreError::KeyNotFound));
        assert_eq!(target.get("k1").unwrap(), strings(&["a", "b"]));
        assert_eq!(target.keys_for_value("a").unwrap(), strings(&["k1"]));
        assert!(target.ttl("k1").unwrap() <= Duration::from_secs(3600));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let engine = StoreEngine::new();
        assert!(matches!(
            load_from_dump(&engine, &path),
            Err(StoreError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_load_malformed_file_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.json");
        std::fs::write(&path, b"{{{").unwrap();

        let engine = StoreEngine::new();
        engine.set("k", strings(&["v"]));

        assert!(matches!(
            load_from_dump(&engine, &path),
            Err(StoreError::MalformedSnapshot(_))
        ));
        assert_eq!(engine.get("k").unwrap(), strings(&["v"]));
    }
}
