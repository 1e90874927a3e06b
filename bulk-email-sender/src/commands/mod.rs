//! CLI command implementations

pub mod send;

pub use send::{SendArgs, SendCommand};
