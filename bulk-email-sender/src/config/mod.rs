//! Configuration management
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `BULK_EMAIL_` prefix, `__` for nesting)
//! 2. `./config.toml` (working directory)
//! 3. `~/.config/bulk-email-sender/config.toml` (user config, XDG)
//! 4. `/etc/bulk-email-sender/config.toml` (system config)
//! 5. Hardcoded defaults (fallback)
//!
//! Example: `BULK_EMAIL_SMTP__PORT=2525` sets `smtp.port`.
//!
//! The SMTP password is never read from configuration files.
//!
//! # Example Configuration
//!
//! ```toml
//! [files]
//! html_template = "html/email.html"
//! plain_text = "message/email.txt"
//! recipients = "recipients.txt"
//!
//! [smtp]
//! host = "smtp.example.com"
//! port = 587
//! username = "me@example.com"
//! tls = "opportunistic"
//!
//! [template]
//! strict = true
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::backend::smtp::TlsMode;

/// Name used for config directories
pub const APP_NAME: &str = "bulk-email-sender";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "BULK_EMAIL_";

/// Input file locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    /// HTML template used for the `html` format
    pub html_template: PathBuf,

    /// Message sent verbatim for the `plaintxt` format
    pub plain_text: PathBuf,

    /// Newline-delimited recipient list
    pub recipients: PathBuf,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            html_template: PathBuf::from("html/email.html"),
            plain_text: PathBuf::from("message/email.txt"),
            recipients: PathBuf::from("recipients.txt"),
        }
    }
}

/// Defaults offered in the SMTP form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpSettings {
    /// Server hostname
    pub host: String,

    /// Server port
    pub port: u16,

    /// Login name
    pub username: String,

    /// Envelope sender; empty means "use the username"
    pub from: String,

    /// Connection security
    pub tls: TlsMode,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 587,
            username: String::new(),
            from: String::new(),
            tls: TlsMode::default(),
        }
    }
}

/// Template engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Fail on references to undefined variables
    pub strict: bool,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self { strict: true }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input files
    #[serde(default)]
    pub files: FileSettings,

    /// SMTP form defaults
    #[serde(default)]
    pub smtp: SmtpSettings,

    /// Template engine settings
    #[serde(default)]
    pub template: TemplateSettings,
}

impl AppConfig {
    /// Load configuration from the standard search path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - A configuration file cannot be parsed
    /// - A value fails type conversion
    pub fn load() -> anyhow::Result<Self> {
        Self::load_layered(&Self::search_path())
    }

    /// Config files consulted by [`load`](Self::load), lowest precedence first
    #[must_use]
    pub fn search_path() -> Vec<PathBuf> {
        vec![
            PathBuf::from("/etc").join(APP_NAME).join("config.toml"),
            Self::recommended_path(),
            PathBuf::from("./config.toml"),
        ]
    }

    /// Load defaults, then each existing file in `paths` in order, then the
    /// environment
    ///
    /// Missing files are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be parsed or a value fails type
    /// conversion
    pub fn load_layered(paths: &[PathBuf]) -> anyhow::Result<Self> {
        let figment = paths
            .iter()
            .filter(|path| path.exists())
            .fold(Self::defaults()?, |figment, path| figment.merge(Toml::file(path)));

        Ok(Self::with_env(figment).extract()?)
    }

    /// Load configuration from a specific file
    ///
    /// Only defaults, `path` and the environment are consulted.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist
    /// - The file contains invalid TOML syntax
    /// - A value fails type conversion
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let figment = Self::defaults()?.merge(Toml::file(path));
        Ok(Self::with_env(figment).extract()?)
    }

    /// Get the recommended XDG config path
    #[must_use]
    pub fn recommended_path() -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from("./config.toml"),
            |config_dir| config_dir.join(APP_NAME).join("config.toml"),
        )
    }

    /// Envelope sender for a given login name
    #[must_use]
    pub fn envelope_from<'a>(&'a self, username: &'a str) -> &'a str {
        if self.smtp.from.is_empty() {
            username
        } else {
            &self.smtp.from
        }
    }

    fn defaults() -> anyhow::Result<Figment> {
        Ok(Figment::new().merge(Toml::string(&toml::to_string(&Self::default())?)))
    }

    fn with_env(figment: Figment) -> Figment {
        figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true))
    }
}
