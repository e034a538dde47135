//! Line protocol
//!
//! Request types and the line parser shared by the TCP adapter.

mod command;

pub use command::{parse_line, ParseError, Request};
