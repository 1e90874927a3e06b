//! Console backend for dry runs
//!
//! Prints the envelope and a preview of the body instead of sending.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::{Mail, MailError, MailSender};

const WIDTH: usize = 51;
const PREVIEW_LINES: usize = 10;

/// Console mail backend
///
/// Logs the mail instead of delivering it, so a recipient list and message
/// can be checked without SMTP credentials.
///
/// # Examples
///
/// ```rust
/// use bulk_email_sender::{ConsoleBackend, Mail, MailSender};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = ConsoleBackend::new();
///
/// let mail = Mail::new()
///     .from("me@example.com")
///     .to("user@example.com")
///     .body(b"Hello, World!".to_vec());
///
/// backend.send(mail).await?; // Prints to console
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConsoleBackend {
    /// Whether to print the whole body
    verbose: bool,
}

impl ConsoleBackend {
    /// Create a new console backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a verbose console backend that prints the full body
    #[must_use]
    pub const fn verbose() -> Self {
        Self { verbose: true }
    }
}

#[async_trait]
impl MailSender for ConsoleBackend {
    async fn send(&self, mail: Mail) -> Result<(), MailError> {
        mail.validate()?;

        info!(
            from = %mail.from,
            to = ?mail.to,
            bytes = mail.body.len(),
            "Console mail sent"
        );

        let body = String::from_utf8_lossy(&mail.body);
        debug!(body = %body, "Mail body");

        let limit = if self.verbose { usize::MAX } else { PREVIEW_LINES };

        println!("\n╭─────────────────────────────────────────────────────╮");
        println!("│ Dry run: nothing was sent                           │");
        println!("├─────────────────────────────────────────────────────┤");
        println!("│ From:    {:<43} │", truncate(&mail.from, 43));
        for (index, recipient) in mail.to.iter().enumerate() {
            let label = if index == 0 { "To:" } else { "" };
            println!("│ {label:<8} {:<43} │", truncate(recipient, 43));
        }
        println!("│ Size:    {:<43} │", format!("{} bytes", mail.body.len()));
        println!("├─────────────────────────────────────────────────────┤");
        for line in body.lines().take(limit) {
            println!("│ {:<width$} │", truncate(line, WIDTH), width = WIDTH);
        }
        if body.lines().count() > limit {
            println!("│ ... (truncated)                                     │");
        }
        println!("╰─────────────────────────────────────────────────────╯\n");

        Ok(())
    }
}

/// Shorten `line` to `width` characters, marking the cut with `...`
fn truncate(line: &str, width: usize) -> String {
    if line.chars().count() > width {
        let kept: String = line.chars().take(width.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        line.to_string()
    }
}
