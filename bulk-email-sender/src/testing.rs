//! Testing utilities
//!
//! Provides a recording sender for exercising the send path without a server.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{Mail, MailError, MailSender};

/// Sender that captures mails in memory
///
/// # Examples
///
/// ```rust
/// use bulk_email_sender::{Mail, MailSender};
/// use bulk_email_sender::testing::RecordingSender;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sender = RecordingSender::new();
///
/// let mail = Mail::new()
///     .from("me@example.com")
///     .to("user@example.com")
///     .body(b"Hello".to_vec());
///
/// sender.send(mail).await?;
///
/// assert_eq!(sender.sent_count(), 1);
/// assert!(sender.was_sent_to("user@example.com"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingSender {
    sent: Arc<Mutex<Vec<Mail>>>,
}

impl RecordingSender {
    /// Create a new recording sender
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mails sent
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned (should never happen in tests)
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// All sent mails, oldest first
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned (should never happen in tests)
    #[must_use]
    pub fn sent_mails(&self) -> Vec<Mail> {
        self.sent.lock().unwrap().clone()
    }

    /// Whether any mail was addressed to `address`
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned (should never happen in tests)
    #[must_use]
    pub fn was_sent_to(&self, address: &str) -> bool {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .any(|mail| mail.to.iter().any(|to| to == address))
    }

    /// The most recent mail
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned (should never happen in tests)
    #[must_use]
    pub fn last_sent(&self) -> Option<Mail> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl MailSender for RecordingSender {
    async fn send(&self, mail: Mail) -> Result<(), MailError> {
        mail.validate()?;

        self.sent.lock().unwrap().push(mail);

        Ok(())
    }
}
