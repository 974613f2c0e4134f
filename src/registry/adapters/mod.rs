//! Adapter implementations for registry ports.

pub mod http;
pub mod memory;

mod scheduler;

pub use scheduler::NoopProbeScheduler;
