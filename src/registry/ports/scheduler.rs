//! Probe scheduling port.

use crate::registry::domain::ServerName;

/// Starts and stops background probing for registered servers.
///
/// Both operations are idempotent and must not block.
pub trait ProbeScheduler: Send + Sync {
    /// Starts (or restarts) probing the named server.
    fn schedule(&self, name: &ServerName);

    /// Stops probing the named server.
    fn cancel(&self, name: &ServerName);
}
