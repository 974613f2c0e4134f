//! Scheduler that never probes.

use crate::registry::{domain::ServerName, ports::ProbeScheduler};

/// Probe scheduler that ignores every request.
///
/// Used when background probing is disabled and in tests that drive probes
/// explicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProbeScheduler;

impl ProbeScheduler for NoopProbeScheduler {
    fn schedule(&self, _name: &ServerName) {}

    fn cancel(&self, _name: &ServerName) {}
}
