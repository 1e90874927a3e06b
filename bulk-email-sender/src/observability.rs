//! Logging
//!
//! Structured logging through `tracing`, pretty in debug builds and JSON in
//! release builds. `RUST_LOG` overrides the default filter.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset
#[must_use]
pub const fn default_filter(verbose: bool) -> &'static str {
    if verbose || cfg!(debug_assertions) {
        "debug,bulk_email_sender=trace"
    } else {
        "info"
    }
}

/// Initialize logging
///
/// Logs go to stderr so they do not interleave with the form on stdout.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
///
/// # Example
///
/// ```rust,no_run
/// # fn main() -> anyhow::Result<()> {
/// bulk_email_sender::observability::init(false)?;
/// tracing::info!("Application started");
/// # Ok(())
/// # }
/// ```
pub fn init(verbose: bool) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init()?;
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    }

    Ok(())
}
