//! Application services for registration, health probing and invocation
//! routing.

mod probe;
mod registry;
mod router;

pub use probe::{HealthProbeSupervisor, ProbeReport, ProbeSettings};
pub use registry::{
    HealthCounts, RegistryService, RegistryServiceError, RegistryServiceResult, RegistryStats,
    ServerCounts,
};
pub use router::{InvocationRouter, InvocationRouterError, InvocationRouterResult, RouterSettings};
