//! Recipient list loading
//!
//! One address per line, in file order. Addresses are not validated here;
//! whatever the file holds is handed to the transport.

use std::path::Path;

use tracing::{debug, warn};

use crate::MailError;

/// Read the recipient list from `path`
///
/// # Errors
///
/// Returns `MailError::FileRead` if the file cannot be read
pub fn read_recipients(path: &Path) -> Result<Vec<String>, MailError> {
    let contents = std::fs::read_to_string(path).map_err(|e| MailError::file_read(path, e))?;
    let recipients = parse_recipients(&contents);

    debug!(path = %path.display(), count = recipients.len(), "Loaded recipients");
    Ok(recipients)
}

/// Split recipient file contents into addresses
///
/// Line endings are stripped and a final newline does not add an entry.
/// Blank lines are skipped with a warning.
#[must_use]
pub fn parse_recipients(contents: &str) -> Vec<String> {
    contents
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            if line.trim().is_empty() {
                warn!(line = index + 1, "Skipping blank line in recipient list");
                None
            } else {
                Some(line.to_string())
            }
        })
        .collect()
}
