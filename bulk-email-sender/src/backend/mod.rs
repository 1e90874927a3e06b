//! Mail backend implementations
//!
//! - **SMTP**: send through an SMTP server
//! - **Console**: print the mail instead of sending it (dry run)

pub mod console;
pub mod smtp;
