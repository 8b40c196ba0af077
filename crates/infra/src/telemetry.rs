//! Tracing bootstrap and logging helpers

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static INIT: OnceCell<()> = OnceCell::new();

/// Install the global tracing subscriber.
///
/// Safe to call more than once; later calls are no-ops. The filter is read
/// from `CIVICLINK_LOG` and falls back to `info`.
pub fn init() {
    INIT.get_or_init(|| {
        let filter =
            EnvFilter::try_from_env("CIVICLINK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init();
    });
}

/// Mask a bearer token for logging: short tokens are fully hidden, longer
/// ones keep an 8-character prefix.
#[must_use]
pub fn mask_token(token: &str) -> String {
    match token.get(..8) {
        Some(prefix) if token.len() > 12 => format!("{prefix}..."),
        _ => "***".to_string(),
    }
}
