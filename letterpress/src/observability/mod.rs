//! Structured logging
//!
//! Pretty, human readable output in debug builds and one JSON object per
//! line in release builds. `RUST_LOG` overrides the default filter.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global `tracing` subscriber
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
///
/// # Example
///
/// ```rust,no_run
/// use letterpress::observability;
///
/// # fn main() -> anyhow::Result<()> {
/// observability::init()?;
/// tracing::info!("letterpress started");
/// # Ok(())
/// # }
/// ```
pub fn init() -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(default_filter());

    #[cfg(debug_assertions)]
    registry
        .with(tracing_subscriber::fmt::layer().pretty())
        .try_init()?;

    #[cfg(not(debug_assertions))]
    registry
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()?;

    Ok(())
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            EnvFilter::new("debug,letterpress=trace")
        } else {
            EnvFilter::new("info")
        }
    })
}
