//! Outgoing mail: SMTP envelope plus raw body
//!
//! The body is the SMTP `DATA` payload as resolved; no headers are added.

use crate::MailError;

/// A mail ready to hand to a [`MailSender`](crate::MailSender)
///
/// ```rust
/// use bulk_email_sender::Mail;
///
/// let mail = Mail::new()
///     .from("sender@example.com")
///     .to_multiple(&["a@x.com", "b@y.com"])
///     .body(b"Hello".to_vec());
///
/// assert!(mail.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mail {
    /// Envelope sender (`MAIL FROM`)
    pub from: String,

    /// Envelope recipients (`RCPT TO`), one transaction for all of them
    pub to: Vec<String>,

    /// Raw message payload
    pub body: Vec<u8>,
}

impl Mail {
    /// Create a new empty mail
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the envelope sender
    #[must_use]
    pub fn from(mut self, address: &str) -> Self {
        self.from = address.to_string();
        self
    }

    /// Add a recipient
    #[must_use]
    pub fn to(mut self, address: &str) -> Self {
        self.to.push(address.to_string());
        self
    }

    /// Add multiple recipients
    #[must_use]
    pub fn to_multiple<S: AsRef<str>>(mut self, addresses: &[S]) -> Self {
        self.to
            .extend(addresses.iter().map(|address| address.as_ref().to_string()));
        self
    }

    /// Set the message payload
    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Check that an SMTP transaction can be formed
    ///
    /// Only presence is checked. Address syntax is left to the transport.
    ///
    /// # Errors
    ///
    /// Returns `MailError::NoSender` or `MailError::NoRecipients`
    pub fn validate(&self) -> Result<(), MailError> {
        if self.from.is_empty() {
            return Err(MailError::NoSender);
        }

        if self.to.is_empty() {
            return Err(MailError::NoRecipients);
        }

        Ok(())
    }
}
