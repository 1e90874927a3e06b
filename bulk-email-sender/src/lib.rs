//! Send one email to a list of recipients over SMTP
//!
//! The message is either an HTML template rendered against an empty context
//! or a plain text file sent verbatim. Recipients come from a
//! newline-delimited file. SMTP credentials are entered when the user submits
//! the send form.
//!
//! # Quick Start
//!
//! ```bash
//! # Pick the format and enter credentials interactively
//! bulk-email-sender
//!
//! # Check the payload and recipient list without sending
//! bulk-email-sender --format html --dry-run
//! ```
//!
//! ## Using the Library
//!
//! ```rust,no_run
//! use bulk_email_sender::{AppConfig, MessageFormat, Outbox, SmtpBackend, SmtpConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = AppConfig::load()?;
//! let outbox = Outbox::prepare(MessageFormat::Plaintxt, &config)?;
//!
//! let sender = SmtpBackend::new(SmtpConfig::new("smtp.example.com", 587, "me@example.com", "secret"));
//! outbox.submit("me@example.com", &sender).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod backend;
pub mod config;
pub mod form;
pub mod message;
pub mod observability;
pub mod recipients;
pub mod testing;

mod error;
mod mail;
mod sender;

pub use backend::{
    console::ConsoleBackend,
    smtp::{SmtpBackend, SmtpConfig, TlsMode},
};
pub use config::AppConfig;
pub use error::MailError;
pub use form::{Outbox, SendForm};
pub use mail::Mail;
pub use message::{HtmlTemplate, MessageBody, MessageFormat};
pub use sender::MailSender;
