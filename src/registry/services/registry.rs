//! Service layer for registration and discovery.

use crate::registry::{
    domain::{
        CapabilityEntry, CapabilityKind, HealthStatus, RegisterServerRequest, RegistryDomainError,
        ServerDescriptor, ServerKind, ServerName,
    },
    ports::{DescriptorStore, DescriptorStoreError, ProbeScheduler},
};
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Service-level errors for registration and discovery.
#[derive(Debug, Error)]
pub enum RegistryServiceError {
    /// Registration input failed validation.
    #[error(transparent)]
    Validation(#[from] RegistryDomainError),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] DescriptorStoreError),
    /// No server is registered under the given name.
    #[error("server '{0}' is not registered")]
    NotFound(String),
}

/// Result type for registry service operations.
pub type RegistryServiceResult<T> = Result<T, RegistryServiceError>;

/// Server totals by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ServerCounts {
    /// All registered servers.
    pub total: usize,
    /// Servers of kind `tool`.
    pub tool: usize,
    /// Servers of kind `resource`.
    pub resource: usize,
    /// Servers of kind `hybrid`.
    pub hybrid: usize,
}

/// Server totals by advisory health status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HealthCounts {
    /// Servers whose last probe succeeded.
    pub healthy: usize,
    /// Servers whose last probe failed.
    pub unhealthy: usize,
    /// Servers not yet probed.
    pub unknown: usize,
}

/// Aggregate registry statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    /// Server totals by kind.
    pub servers: ServerCounts,
    /// Capabilities of kind `tool` across all servers.
    pub tools: usize,
    /// Capabilities of kind `resource` across all servers.
    pub resources: usize,
    /// Server totals by health.
    pub health: HealthCounts,
}

impl RegistryStats {
    fn tally(servers: &[ServerDescriptor]) -> Self {
        servers.iter().fold(Self::default(), |mut stats, server| {
            stats.servers.total += 1;
            match server.kind() {
                ServerKind::Tool => stats.servers.tool += 1,
                ServerKind::Resource => stats.servers.resource += 1,
                ServerKind::Hybrid => stats.servers.hybrid += 1,
            }
            stats.tools += server.capabilities().count_of(CapabilityKind::Tool);
            stats.resources += server.capabilities().count_of(CapabilityKind::Resource);
            match server.health_status() {
                HealthStatus::Healthy => stats.health.healthy += 1,
                HealthStatus::Unhealthy => stats.health.unhealthy += 1,
                HealthStatus::Unknown => stats.health.unknown += 1,
            }
            stats
        })
    }
}

/// Registration lifecycle and discovery service.
///
/// The scheduler may be unsized, so `dyn ProbeScheduler` can be chosen at
/// runtime.
pub struct RegistryService<S, Q, C>
where
    S: DescriptorStore,
    Q: ProbeScheduler + ?Sized,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    scheduler: Arc<Q>,
    clock: Arc<C>,
}

impl<S, Q, C> Clone for RegistryService<S, Q, C>
where
    S: DescriptorStore,
    Q: ProbeScheduler + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            scheduler: Arc::clone(&self.scheduler),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, Q, C> RegistryService<S, Q, C>
where
    S: DescriptorStore,
    Q: ProbeScheduler + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new registry service.
    #[must_use]
    pub const fn new(store: Arc<S>, scheduler: Arc<Q>, clock: Arc<C>) -> Self {
        Self {
            store,
            scheduler,
            clock,
        }
    }

    /// Registers a server, replacing any existing registration of the name.
    ///
    /// The stored descriptor starts with unknown health and gets a fresh
    /// registration identifier; probing is (re)started.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Validation`] for malformed input or
    /// [`RegistryServiceError::Store`] when persistence fails.
    pub async fn register(
        &self,
        request: RegisterServerRequest,
    ) -> RegistryServiceResult<ServerDescriptor> {
        let spec = request.validate()?;
        let descriptor = ServerDescriptor::register(spec, &*self.clock);
        self.store.put(&descriptor).await?;
        self.scheduler.schedule(descriptor.name());

        info!(
            server = %descriptor.name(),
            kind = %descriptor.kind(),
            capabilities = descriptor.capabilities().len(),
            registration_id = %descriptor.id(),
            "server registered"
        );
        Ok(descriptor)
    }

    /// Removes a server and stops probing it.
    ///
    /// Returns whether a registration was removed. Unknown or malformed names
    /// are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Store`] when persistence fails.
    pub async fn deregister(&self, name: &str) -> RegistryServiceResult<bool> {
        let Ok(server_name) = ServerName::new(name) else {
            return Ok(false);
        };

        self.scheduler.cancel(&server_name);
        let removed = self.store.remove(&server_name).await?.is_some();
        if removed {
            info!(server = %server_name, "server deregistered");
        }
        Ok(removed)
    }

    /// Lists servers in registration order, optionally filtered by kind.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Store`] when persistence fails.
    pub async fn list_servers(
        &self,
        kind: Option<ServerKind>,
    ) -> RegistryServiceResult<Vec<ServerDescriptor>> {
        Ok(self.store.list(kind).await?)
    }

    /// Returns the descriptor registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::NotFound`] when no such server exists.
    pub async fn get_server(&self, name: &str) -> RegistryServiceResult<ServerDescriptor> {
        let not_found = || RegistryServiceError::NotFound(name.trim().to_owned());
        let server_name = ServerName::new(name).map_err(|_| not_found())?;
        self.store.get(&server_name).await?.ok_or_else(not_found)
    }

    /// Lists every tool capability across all servers.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Store`] when persistence fails.
    pub async fn list_tools(&self) -> RegistryServiceResult<Vec<CapabilityEntry>> {
        self.capabilities_of(CapabilityKind::Tool, None).await
    }

    /// Lists every resource capability across all servers.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Store`] when persistence fails.
    pub async fn list_resources(&self) -> RegistryServiceResult<Vec<CapabilityEntry>> {
        self.capabilities_of(CapabilityKind::Resource, None).await
    }

    /// Finds tools whose name or description contains `query`,
    /// ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Store`] when persistence fails.
    pub async fn search_tools(&self, query: &str) -> RegistryServiceResult<Vec<CapabilityEntry>> {
        self.capabilities_of(CapabilityKind::Tool, Some(query)).await
    }

    /// Finds resources whose name or description contains `query`,
    /// ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Store`] when persistence fails.
    pub async fn search_resources(
        &self,
        query: &str,
    ) -> RegistryServiceResult<Vec<CapabilityEntry>> {
        self.capabilities_of(CapabilityKind::Resource, Some(query))
            .await
    }

    /// Computes registry-wide totals.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Store`] when persistence fails.
    pub async fn stats(&self) -> RegistryServiceResult<RegistryStats> {
        let servers = self.store.list(None).await?;
        Ok(RegistryStats::tally(&servers))
    }

    async fn capabilities_of(
        &self,
        kind: CapabilityKind,
        query: Option<&str>,
    ) -> RegistryServiceResult<Vec<CapabilityEntry>> {
        let servers = self.store.list(None).await?;
        Ok(servers
            .iter()
            .flat_map(|server| server.capability_entries(kind))
            .filter(|entry| query.is_none_or(|needle| entry.matches(needle)))
            .collect())
    }
}
