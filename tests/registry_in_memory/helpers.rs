//! Shared fixtures and fakes for in-memory registry tests.

use async_trait::async_trait;
use mcp_registry::registry::{
    adapters::{NoopProbeScheduler, memory::InMemoryDescriptorStore},
    domain::{CapabilityDefinition, RegisterServerRequest, SchemaNode, ServerDescriptor, ServerKind},
    ports::{HealthProbe, ProbeError, ProbeResult},
    services::{HealthProbeSupervisor, ProbeSettings, RegistryService},
};
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::{Clock, DefaultClock};
use rstest::fixture;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Registry service that never probes.
pub type PassiveRegistry = RegistryService<InMemoryDescriptorStore, NoopProbeScheduler, DefaultClock>;

/// Probe supervisor driven by a [`ScriptedProbe`].
pub type TestSupervisor = HealthProbeSupervisor<InMemoryDescriptorStore, ScriptedProbe, DefaultClock>;

/// Clock that moves one second forward every time it is read.
#[derive(Debug, Default)]
pub struct SteppingClock {
    ticks: AtomicI64,
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        DateTime::UNIX_EPOCH + TimeDelta::seconds(tick)
    }
}

/// Probe that replays queued outcomes, then repeats a fallback outcome.
#[derive(Debug)]
pub struct ScriptedProbe {
    queued: Mutex<VecDeque<ProbeResult>>,
    fallback: ProbeResult,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    /// Creates a probe that always succeeds.
    pub fn healthy() -> Self {
        Self::with_fallback(Ok(()))
    }

    /// Creates a probe that always fails with the given status.
    pub fn failing(status: u16) -> Self {
        Self::with_fallback(Err(ProbeError::UnhealthyStatus(status)))
    }

    fn with_fallback(fallback: ProbeResult) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Queues outcomes returned before the fallback.
    #[must_use]
    pub fn then(self, outcomes: impl IntoIterator<Item = ProbeResult>) -> Self {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(outcomes);
        self
    }

    /// Delays every answer.
    #[must_use]
    pub const fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of probes issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HealthProbe for ScriptedProbe {
    async fn probe(&self, _server: &ServerDescriptor) -> ProbeResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self
            .queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Provides a fresh in-memory store.
#[fixture]
pub fn store() -> Arc<InMemoryDescriptorStore> {
    Arc::new(InMemoryDescriptorStore::new())
}

/// Provides a registry service without background probing.
#[fixture]
pub fn registry(store: Arc<InMemoryDescriptorStore>) -> PassiveRegistry {
    RegistryService::new(store, Arc::new(NoopProbeScheduler), Arc::new(DefaultClock))
}

/// Builds a supervisor over `store` with the given probe.
pub fn supervisor(
    store: &Arc<InMemoryDescriptorStore>,
    probe: &Arc<ScriptedProbe>,
    settings: ProbeSettings,
) -> TestSupervisor {
    HealthProbeSupervisor::new(
        Arc::clone(store),
        Arc::clone(probe),
        Arc::new(DefaultClock),
        settings,
    )
}

/// Registration request for a GitHub-style tool server.
pub fn github_request() -> RegisterServerRequest {
    let schema: SchemaNode = serde_json::from_value(json!({
        "type": "object",
        "properties": {
            "operation": {
                "type": "string",
                "enum": ["create_issue", "create_pr", "get_repo", "list_issues"]
            },
            "repository": {"type": "string"}
        },
        "required": ["operation", "repository"]
    }))
    .expect("schema should deserialize");

    RegisterServerRequest::new("github-mcp", ServerKind::Tool, "http://mcp-github:7000")
        .with_capability(
            "github_operation",
            CapabilityDefinition::tool(schema).with_description("Perform GitHub operations"),
        )
}

/// Registration request for a resource server with no capabilities.
pub fn resource_request(name: &str) -> RegisterServerRequest {
    RegisterServerRequest::new(name, ServerKind::Resource, "http://qdrant:6333")
}
