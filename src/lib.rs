//! idis - an in-memory multi-value key store with a reverse index
//!
//! The core is the store engine: a forward map (key → ordered values), a
//! reverse index (value → set of keys) kept consistent with every mutation,
//! per-key lazy expiration and point-in-time JSON snapshots. Two thin
//! adapters expose it: a telnet-style line protocol and an HTTP/JSON
//! interface. All shared state lives behind the engine's single
//! readers-writer lock.

pub mod config;
pub mod protocol;
pub mod server;
pub mod snapshot;
pub mod store;
pub mod web;

/// Re-export commonly used types
pub use config::Config;
pub use protocol::{parse_line, Request};
pub use snapshot::{Snapshot, SnapshotConfig, SnapshotTask};
pub use store::{StoreEngine, StoreError};
