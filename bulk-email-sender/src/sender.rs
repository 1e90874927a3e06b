//! Mail sender trait abstraction
//!
//! This module defines the `MailSender` trait that every backend implements.

use async_trait::async_trait;

use crate::{Mail, MailError};

/// Trait for sending a mail
///
/// Implemented by the SMTP backend, the console backend used for dry runs,
/// and the recording sender used in tests.
///
/// # Examples
///
/// ```rust,no_run
/// use bulk_email_sender::{Mail, MailSender, SmtpBackend, SmtpConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sender = SmtpBackend::new(SmtpConfig::new("smtp.example.com", 587, "me@example.com", "secret"));
///
/// let mail = Mail::new()
///     .from("me@example.com")
///     .to("user@example.com")
///     .body(b"Hello, World!".to_vec());
///
/// sender.send(mail).await?;
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Send one mail to all of its recipients in a single transaction
    ///
    /// # Errors
    ///
    /// Returns `MailError` if the mail is incomplete or the transport fails
    async fn send(&self, mail: Mail) -> Result<(), MailError>;
}
