//! HTTP surface of the registry.
//!
//! Routes:
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | `GET` | `/health` | Registry liveness |
//! | `POST` | `/register` | Register or replace a server |
//! | `GET` | `/servers` | List servers, optionally `?kind=` |
//! | `GET`/`DELETE` | `/servers/{name}` | Fetch or deregister a server |
//! | `GET` | `/servers/{name}/capabilities` | Capabilities of one server |
//! | `POST` | `/invoke` | Route a tool call |
//! | `GET` | `/tools`, `/resources` | Flattened capability listings |
//! | `GET` | `/search/tools`, `/search/resources` | Substring search, `?q=` |
//! | `GET` | `/stats` | Aggregate counts |

mod error;
mod handlers;

pub use error::ApiError;

use crate::config::RegistryConfig;
use crate::registry::{
    adapters::{
        NoopProbeScheduler,
        http::{HttpHealthProbe, HttpToolTransport, build_client},
        memory::InMemoryDescriptorStore,
    },
    ports::ProbeScheduler,
    services::{HealthProbeSupervisor, InvocationRouter, RegistryService},
};
use axum::{
    Router,
    routing::{get, post},
};
use mockable::DefaultClock;
use std::sync::Arc;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Probe supervisor used by the server.
pub type AppSupervisor = HealthProbeSupervisor<InMemoryDescriptorStore, HttpHealthProbe, DefaultClock>;

/// Registry service used by the server.
pub type AppRegistry = RegistryService<InMemoryDescriptorStore, dyn ProbeScheduler, DefaultClock>;

/// Invocation router used by the server.
pub type AppRouter = InvocationRouter<InMemoryDescriptorStore, HttpToolTransport>;

/// Shared handler state.
pub struct AppState {
    registry: AppRegistry,
    router: AppRouter,
    supervisor: Option<AppSupervisor>,
}

impl AppState {
    /// Assembles state from prebuilt services.
    #[must_use]
    pub const fn new(
        registry: AppRegistry,
        router: AppRouter,
        supervisor: Option<AppSupervisor>,
    ) -> Self {
        Self {
            registry,
            router,
            supervisor,
        }
    }

    /// Wires the in-memory store, HTTP adapters and services from
    /// configuration.
    ///
    /// Background probing only starts once servers are registered.
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] when the HTTP client cannot be built.
    pub fn from_config(config: &RegistryConfig) -> reqwest::Result<Self> {
        let client = build_client(CONNECT_TIMEOUT)?;
        let store = Arc::new(InMemoryDescriptorStore::new());
        let clock = Arc::new(DefaultClock);

        let probe_settings = config.probe.settings();
        let supervisor = config.probe.enabled.then(|| {
            HealthProbeSupervisor::new(
                Arc::clone(&store),
                Arc::new(HttpHealthProbe::new(client.clone(), probe_settings.timeout)),
                Arc::clone(&clock),
                probe_settings,
            )
        });
        let scheduler: Arc<dyn ProbeScheduler> = match &supervisor {
            Some(active) => Arc::new(active.clone()),
            None => Arc::new(NoopProbeScheduler),
        };

        let router_settings = config.invocation.settings();
        let transport = HttpToolTransport::new(
            client,
            config.invocation.invoke_path.clone(),
            router_settings.invoke_timeout,
        );

        Ok(Self::new(
            RegistryService::new(Arc::clone(&store), scheduler, clock),
            InvocationRouter::new(store, Arc::new(transport), router_settings),
            supervisor,
        ))
    }

    /// Returns the registry service.
    #[must_use]
    pub const fn registry(&self) -> &AppRegistry {
        &self.registry
    }

    /// Returns the invocation router.
    #[must_use]
    pub const fn router(&self) -> &AppRouter {
        &self.router
    }

    /// Returns the probe supervisor, when probing is enabled.
    #[must_use]
    pub const fn supervisor(&self) -> Option<&AppSupervisor> {
        self.supervisor.as_ref()
    }

    /// Stops background probing and waits for probe tasks to finish.
    pub async fn shutdown(&self) {
        if let Some(supervisor) = &self.supervisor {
            supervisor.shutdown().await;
        }
    }
}

/// Builds the HTTP router.
#[must_use]
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/register", post(handlers::register))
        .route("/servers", get(handlers::list_servers))
        .route(
            "/servers/{name}",
            get(handlers::get_server).delete(handlers::deregister),
        )
        .route("/servers/{name}/capabilities", get(handlers::get_capabilities))
        .route("/invoke", post(handlers::invoke))
        .route("/tools", get(handlers::list_tools))
        .route("/resources", get(handlers::list_resources))
        .route("/search/tools", get(handlers::search_tools))
        .route("/search/resources", get(handlers::search_resources))
        .route("/stats", get(handlers::stats))
        .with_state(state)
}
