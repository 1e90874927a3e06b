//! The send form and its submit handler
//!
//! Message and recipients are prepared once, before the form is shown.
//! Credentials are only read when the user submits.

use std::fmt;

use tracing::info;

use crate::backend::smtp::{SmtpConfig, TlsMode};
use crate::config::AppConfig;
use crate::message::{MessageBody, MessageFormat};
use crate::recipients::read_recipients;
use crate::{Mail, MailError, MailSender};

/// SMTP fields entered by the user
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SendForm {
    /// Login name, also the default envelope sender
    pub username: String,
    /// Server hostname
    pub hostname: String,
    /// Login password
    pub password: String,
    /// Server port
    pub port: u16,
}

impl SendForm {
    /// `hostname:port` as dialled
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }

    /// Check the fields a connection cannot be attempted without
    ///
    /// # Errors
    ///
    /// Returns `MailError::Config` for an empty hostname or port 0
    pub fn validate(&self) -> Result<(), MailError> {
        if self.hostname.trim().is_empty() {
            return Err(MailError::config("SMTP hostname must not be empty"));
        }
        if self.port == 0 {
            return Err(MailError::config("SMTP port must not be 0"));
        }
        Ok(())
    }

    /// SMTP backend configuration for these credentials
    #[must_use]
    pub fn smtp_config(&self, tls: TlsMode) -> SmtpConfig {
        SmtpConfig::new(&self.hostname, self.port, &self.username, &self.password).with_tls(tls)
    }
}

impl fmt::Debug for SendForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendForm")
            .field("username", &self.username)
            .field("hostname", &self.hostname)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .finish()
    }
}

/// The resolved payload and recipient list, held until the user submits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbox {
    format: MessageFormat,
    body: Vec<u8>,
    recipients: Vec<String>,
}

impl Outbox {
    /// Create an outbox from an already resolved payload
    #[must_use]
    pub const fn new(format: MessageFormat, body: Vec<u8>, recipients: Vec<String>) -> Self {
        Self {
            format,
            body,
            recipients,
        }
    }

    /// Load the message for `format`, resolve it once and load the recipients
    ///
    /// # Errors
    ///
    /// Returns `MailError::FileRead`, `MailError::TemplateParse` or
    /// `MailError::TemplateExecution`
    pub fn prepare(format: MessageFormat, config: &AppConfig) -> Result<Self, MailError> {
        let body = MessageBody::load(format, &config.files, config.template.strict)?.resolve()?;
        let recipients = read_recipients(&config.files.recipients)?;

        info!(
            format = %format,
            bytes = body.len(),
            recipients = recipients.len(),
            "Message prepared"
        );

        Ok(Self::new(format, body, recipients))
    }

    /// Format the body was built from
    #[must_use]
    pub const fn format(&self) -> MessageFormat {
        self.format
    }

    /// Resolved payload
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Recipients, in file order
    #[must_use]
    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    /// The mail this outbox sends from `from`
    #[must_use]
    pub fn mail(&self, from: &str) -> Mail {
        Mail::new()
            .from(from)
            .to_multiple(&self.recipients)
            .body(self.body.clone())
    }

    /// Submit handler: one send to every recipient
    ///
    /// # Errors
    ///
    /// Returns whatever error the sender reports
    pub async fn submit(&self, from: &str, sender: &dyn MailSender) -> Result<(), MailError> {
        sender.send(self.mail(from)).await?;

        info!(from = %from, recipients = self.recipients.len(), "Mail sent");
        Ok(())
    }
}
