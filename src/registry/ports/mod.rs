//! Port contracts for registry persistence, health probing, probe scheduling
//! and tool invocation.

mod probe;
mod scheduler;
mod store;
mod transport;

pub use probe::{HealthProbe, ProbeError, ProbeResult};
pub use scheduler::ProbeScheduler;
pub use store::{DescriptorStore, DescriptorStoreError, DescriptorStoreResult};
pub use transport::{ToolTransport, TransportError, TransportResult};
