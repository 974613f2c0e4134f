//! HTTP adapters backed by `reqwest`.

mod probe;
mod transport;

pub use probe::{HEALTH_PATH, HttpHealthProbe};
pub use transport::{DEFAULT_INVOKE_PATH, HttpToolTransport};

use std::time::Duration;

/// Builds the shared downstream client.
///
/// Per-request timeouts are applied by each adapter; the connect timeout
/// only bounds connection setup.
///
/// # Errors
///
/// Returns [`reqwest::Error`] when the TLS backend cannot be initialised.
pub fn build_client(connect_timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .user_agent(concat!("mcp-registry/", env!("CARGO_PKG_VERSION")))
        .build()
}

fn describe(err: reqwest::Error) -> String {
    err.without_url().to_string()
}
