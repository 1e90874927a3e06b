//! Message bodies and their resolution to bytes
//!
//! The user picks one of two formats. `html` loads a Handlebars template and
//! renders it against an empty context; `plaintxt` sends a file verbatim.
//! Either way the result is a byte payload handed unchanged to the sender.
//!
//! # Examples
//!
//! ```rust
//! use bulk_email_sender::message::{HtmlTemplate, MessageBody};
//!
//! # fn example() -> Result<(), bulk_email_sender::MailError> {
//! let text = MessageBody::Literal(b"Hello".to_vec());
//! assert_eq!(text.resolve()?, b"Hello");
//!
//! let html = MessageBody::Template(HtmlTemplate::parse("<b>Hello</b>", true)?);
//! assert_eq!(html.resolve()?, b"<b>Hello</b>");
//! # Ok(())
//! # }
//! ```

mod template;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::FileSettings;
use crate::MailError;

pub use template::HtmlTemplate;

/// Message format offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MessageFormat {
    /// Render the HTML template
    Html,
    /// Send the plain text file as-is
    Plaintxt,
}

impl MessageFormat {
    /// All formats, in the order they are offered
    pub const ALL: [Self; 2] = [Self::Html, Self::Plaintxt];

    /// Label shown to the user
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Plaintxt => "plaintxt",
        }
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The email content to send
#[derive(Debug, Clone)]
pub enum MessageBody {
    /// Raw bytes sent verbatim
    Literal(Vec<u8>),
    /// Template executed against an empty context
    Template(HtmlTemplate),
}

impl MessageBody {
    /// Build the body for `format` from the configured files
    ///
    /// # Errors
    ///
    /// Returns `MailError::FileRead` if the source file cannot be read and
    /// `MailError::TemplateParse` if the HTML template is malformed
    pub fn load(format: MessageFormat, files: &FileSettings, strict: bool) -> Result<Self, MailError> {
        match format {
            MessageFormat::Html => {
                HtmlTemplate::from_file(&files.html_template, strict).map(Self::Template)
            }
            MessageFormat::Plaintxt => std::fs::read(&files.plain_text)
                .map(Self::Literal)
                .map_err(|e| MailError::file_read(&files.plain_text, e)),
        }
    }

    /// Resolve the body to the bytes that go on the wire
    ///
    /// # Errors
    ///
    /// Returns `MailError::TemplateExecution` if the template fails to render
    pub fn resolve(&self) -> Result<Vec<u8>, MailError> {
        match self {
            Self::Literal(bytes) => Ok(bytes.clone()),
            Self::Template(template) => template.render().map(String::into_bytes),
        }
    }

    /// The format this body was built from
    #[must_use]
    pub const fn format(&self) -> MessageFormat {
        match self {
            Self::Literal(_) => MessageFormat::Plaintxt,
            Self::Template(_) => MessageFormat::Html,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn files_in(dir: &TempDir) -> FileSettings {
        FileSettings {
            html_template: dir.path().join("email.html"),
            plain_text: dir.path().join("email.txt"),
            recipients: dir.path().join("recipients.txt"),
        }
    }

    proptest! {
        #[test]
        fn literal_resolves_to_itself(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let body = MessageBody::Literal(bytes.clone());
            prop_assert_eq!(body.resolve().unwrap(), bytes);
        }
    }

    #[test]
    fn test_empty_literal_resolves_to_empty() {
        let body = MessageBody::Literal(Vec::new());
        assert!(body.resolve().unwrap().is_empty());
    }

    #[test]
    fn test_template_resolution_is_deterministic() {
        let body = MessageBody::Template(
            HtmlTemplate::parse("<p>{{#if true}}yes{{else}}no{{/if}}</p>", true).unwrap(),
        );

        let first = body.resolve().unwrap();
        let second = body.resolve().unwrap();
        assert_eq!(first, b"<p>yes</p>");
        assert_eq!(first, second);
    }

    #[test]
    fn test_template_with_undefined_variable_is_fatal() {
        let body = MessageBody::Template(HtmlTemplate::parse("Dear {{ first_name }}", true).unwrap());
        assert!(matches!(body.resolve(), Err(MailError::TemplateExecution(_))));
    }

    #[test]
    fn test_load_plaintxt_reads_verbatim() {
        let dir = TempDir::new().unwrap();
        let files = files_in(&dir);
        fs::write(&files.plain_text, "Hello").unwrap();

        let body = MessageBody::load(MessageFormat::Plaintxt, &files, true).unwrap();

        assert_eq!(body.format(), MessageFormat::Plaintxt);
        assert_eq!(body.resolve().unwrap(), b"Hello");
    }

    #[test]
    fn test_load_plaintxt_does_not_interpret_braces() {
        let dir = TempDir::new().unwrap();
        let files = files_in(&dir);
        fs::write(&files.plain_text, "Hi {{ name }}").unwrap();

        let body = MessageBody::load(MessageFormat::Plaintxt, &files, true).unwrap();
        assert_eq!(body.resolve().unwrap(), b"Hi {{ name }}");
    }

    #[test]
    fn test_load_html_static_page() {
        let dir = TempDir::new().unwrap();
        let files = files_in(&dir);
        let page = "<html><body><h1>Newsletter</h1></body></html>\n";
        fs::write(&files.html_template, page).unwrap();

        let body = MessageBody::load(MessageFormat::Html, &files, true).unwrap();

        assert_eq!(body.format(), MessageFormat::Html);
        assert_eq!(body.resolve().unwrap(), page.as_bytes());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let files = files_in(&dir);

        let result = MessageBody::load(MessageFormat::Plaintxt, &files, true);
        assert!(matches!(result, Err(MailError::FileRead { .. })));

        let result = MessageBody::load(MessageFormat::Html, &files, true);
        assert!(matches!(result, Err(MailError::FileRead { .. })));
    }

    #[test]
    fn test_format_labels() {
        assert_eq!(MessageFormat::Html.to_string(), "html");
        assert_eq!(MessageFormat::Plaintxt.to_string(), "plaintxt");
        assert_eq!(MessageFormat::ALL, [MessageFormat::Html, MessageFormat::Plaintxt]);
    }
}
