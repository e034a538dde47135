//! Store module
//!
//! The core engine: forward store, reverse index and expiration policy.

mod engine;
mod error;
pub mod expiry;

pub use engine::{ExpiryMap, ReverseMap, StoreEngine, StoreMap};
pub use error::StoreError;
