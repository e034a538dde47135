//! Web module
//!
//! HTTP/JSON interface to the store engine.

mod handlers;
mod server;

pub use handlers::{AppState, ResponseMsg};
pub use server::run_web_server;
