//! Handlebars-backed HTML email template
//!
//! The template is parsed once when loaded and rendered against an empty
//! (null) context. No variables are ever bound.

use std::path::Path;

use handlebars::Handlebars;
use serde_json::Value;

use crate::MailError;

/// Name the template is registered under in its private registry
const TEMPLATE_NAME: &str = "email";

/// A parsed HTML email template
///
/// Holds its own [`Handlebars`] registry with exactly one template in it.
///
/// # Examples
///
/// ```rust
/// use bulk_email_sender::message::HtmlTemplate;
///
/// # fn example() -> Result<(), bulk_email_sender::MailError> {
/// let template = HtmlTemplate::parse("<h1>Hello!</h1>", true)?;
/// assert_eq!(template.render()?, "<h1>Hello!</h1>");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HtmlTemplate {
    registry: Handlebars<'static>,
}

impl HtmlTemplate {
    /// Parse a template from source
    ///
    /// With `strict` set, rendering fails on any reference to a variable
    /// that is not in the (empty) context instead of producing empty output.
    ///
    /// # Errors
    ///
    /// Returns `MailError::TemplateParse` if the source is not a valid template
    pub fn parse(source: &str, strict: bool) -> Result<Self, MailError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(strict);
        registry.register_template_string(TEMPLATE_NAME, source)?;

        Ok(Self { registry })
    }

    /// Read and parse a template file
    ///
    /// # Errors
    ///
    /// Returns `MailError::FileRead` if the file cannot be read and
    /// `MailError::TemplateParse` if it is not a valid template
    pub fn from_file(path: &Path, strict: bool) -> Result<Self, MailError> {
        let source =
            std::fs::read_to_string(path).map_err(|e| MailError::file_read(path, e))?;
        Self::parse(&source, strict)
    }

    /// Execute the template against an empty context
    ///
    /// # Errors
    ///
    /// Returns `MailError::TemplateExecution` if rendering fails
    pub fn render(&self) -> Result<String, MailError> {
        Ok(self.registry.render(TEMPLATE_NAME, &Value::Null)?)
    }

    /// Whether undefined references are rendering errors
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.registry.strict_mode()
    }
}
