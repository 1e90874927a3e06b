//! Error types
//!
//! Every error in this crate is fatal: operations return [`MailError`] and the
//! binary logs it once and exits. Nothing is retried.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while preparing or sending the mail
#[derive(Debug, Error)]
pub enum MailError {
    /// A message or recipient file is missing or unreadable
    #[error("failed to read {}: {source}", .path.display())]
    FileRead {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The HTML template could not be parsed
    #[error("failed to parse email template: {0}")]
    TemplateParse(#[from] handlebars::TemplateError),

    /// The HTML template failed while rendering
    #[error("failed to render email template: {0}")]
    TemplateExecution(#[from] handlebars::RenderError),

    /// SMTP transport error (connection, authentication, rejected recipients)
    #[error("SMTP error: {0}")]
    MailTransport(String),

    /// An envelope address the transport cannot encode
    #[error("invalid email address: {0:?}")]
    InvalidAddress(String),

    /// Mail has no recipients
    #[error("mail must have at least one recipient")]
    NoRecipients,

    /// Mail has no envelope sender
    #[error("mail must have a from address")]
    NoSender,

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl MailError {
    /// Create a file read error for `path`
    #[must_use]
    pub fn file_read<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Create an SMTP transport error from a string message
    #[must_use]
    pub fn transport<T: Into<String>>(msg: T) -> Self {
        Self::MailTransport(msg.into())
    }

    /// Create a configuration error from a string message
    #[must_use]
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }
}
