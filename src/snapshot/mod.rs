//! Snapshot module
//!
//! Point-in-time persistence: the codec and the periodic dump task.

mod codec;
mod task;

pub use codec::{decode, dump_to_file, encode, load_from_dump, Snapshot};
pub use task::{SnapshotConfig, SnapshotTask};
