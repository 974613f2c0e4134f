//! Background health probing of registered servers.
//!
//! Every watched server gets its own task, driven by a fixed interval and
//! cancelled through a child of the supervisor's root token. Probe results
//! are written back with compare-and-swap on the registration identifier,
//! so a probe that raced a re-registration is discarded.

use crate::registry::{
    domain::{HealthStatus, ServerName},
    ports::{DescriptorStore, DescriptorStoreResult, HealthProbe, ProbeError, ProbeScheduler},
};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Timing and eviction policy for background probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    /// Delay between probe cycles of one server.
    pub interval: Duration,
    /// Upper bound on a single probe.
    pub timeout: Duration,
    /// Remove a server after this many consecutive failures; `None` keeps it.
    pub evict_after_failures: Option<u32>,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(5),
            evict_after_failures: None,
        }
    }
}

/// Outcome of a single probe cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeReport {
    /// The probe result was stored.
    Recorded(HealthStatus),
    /// The server reached the failure limit and was removed.
    Evicted,
    /// The server was re-registered or removed while the probe ran; the
    /// result was discarded.
    Superseded,
    /// No server is registered under the name.
    Missing,
}

struct WatchedTask {
    task_id: u64,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

struct SupervisorInner<S, P, C> {
    store: Arc<S>,
    probe: Arc<P>,
    clock: Arc<C>,
    settings: ProbeSettings,
    root: CancellationToken,
    tasks: Mutex<HashMap<ServerName, WatchedTask>>,
    next_task_id: AtomicU64,
}

/// Owns one probe task per watched server.
pub struct HealthProbeSupervisor<S, P, C> {
    inner: Arc<SupervisorInner<S, P, C>>,
}

impl<S, P, C> Clone for HealthProbeSupervisor<S, P, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, P, C> HealthProbeSupervisor<S, P, C>
where
    S: DescriptorStore + 'static,
    P: HealthProbe + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a supervisor with no watched servers.
    #[must_use]
    pub fn new(store: Arc<S>, probe: Arc<P>, clock: Arc<C>, settings: ProbeSettings) -> Self {
        Self {
            inner: Arc::new(SupervisorInner {
                store,
                probe,
                clock,
                settings,
                root: CancellationToken::new(),
                tasks: Mutex::new(HashMap::new()),
                next_task_id: AtomicU64::new(0),
            }),
        }
    }

    /// Returns the probe settings.
    #[must_use]
    pub fn settings(&self) -> ProbeSettings {
        self.inner.settings
    }

    /// Runs one probe cycle for `name`.
    ///
    /// A failed or timed-out probe marks the server unhealthy; the error is
    /// logged and never returned.
    ///
    /// # Errors
    ///
    /// Returns a store error when the descriptor cannot be read or written.
    pub async fn probe_once(&self, name: &ServerName) -> DescriptorStoreResult<ProbeReport> {
        self.inner.probe_once(name).await
    }

    /// Starts probing `name`, replacing any task already watching it.
    ///
    /// Does nothing after [`Self::shutdown`] or outside a Tokio runtime.
    pub fn watch(&self, name: &ServerName) {
        if self.inner.root.is_cancelled() {
            debug!(server = %name, "supervisor stopped; not watching");
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(server = %name, "no async runtime available; probing disabled");
            return;
        };

        let task_id = self.inner.next_task_id.fetch_add(1, Ordering::Relaxed);
        let token = self.inner.root.child_token();
        let inner = Arc::clone(&self.inner);
        let task_name = name.clone();
        let task_token = token.clone();

        let mut tasks = self.inner.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        let handle = runtime.spawn(async move {
            inner.run(&task_name, task_token).await;
            inner.forget(&task_name, task_id);
        });
        if let Some(previous) = tasks.insert(
            name.clone(),
            WatchedTask {
                task_id,
                token,
                handle,
            },
        ) {
            previous.token.cancel();
        }
        debug!(server = %name, task_id, "watching server health");
    }

    /// Stops probing `name`. Idempotent.
    pub fn unwatch(&self, name: &ServerName) {
        let removed = self
            .inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
        if let Some(task) = removed {
            task.token.cancel();
            debug!(server = %name, "stopped watching server health");
        }
    }

    /// Returns whether a probe task currently watches `name`.
    #[must_use]
    pub fn is_watching(&self, name: &ServerName) -> bool {
        self.inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Cancels every probe task and waits for them to finish.
    pub async fn shutdown(&self) {
        self.inner.root.cancel();
        let drained: Vec<WatchedTask> = self
            .inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, task)| task)
            .collect();

        for task in drained {
            if let Err(err) = task.handle.await {
                warn!(error = %err, "probe task ended abnormally");
            }
        }
        info!("health probing stopped");
    }
}

impl<S, P, C> ProbeScheduler for HealthProbeSupervisor<S, P, C>
where
    S: DescriptorStore + 'static,
    P: HealthProbe + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn schedule(&self, name: &ServerName) {
        self.watch(name);
    }

    fn cancel(&self, name: &ServerName) {
        self.unwatch(name);
    }
}

impl<S, P, C> SupervisorInner<S, P, C>
where
    S: DescriptorStore,
    P: HealthProbe,
    C: Clock + Send + Sync,
{
    async fn run(&self, name: &ServerName, token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let report = tokio::select! {
                () = token.cancelled() => break,
                report = self.probe_once(name) => report,
            };

            match report {
                Ok(ProbeReport::Recorded(_)) => {}
                Ok(ProbeReport::Evicted | ProbeReport::Superseded | ProbeReport::Missing) => break,
                Err(err) => warn!(server = %name, error = %err, "failed to record probe result"),
            }
        }
    }

    async fn probe_once(&self, name: &ServerName) -> DescriptorStoreResult<ProbeReport> {
        let Some(mut descriptor) = self.store.get(name).await? else {
            return Ok(ProbeReport::Missing);
        };

        let outcome = tokio::time::timeout(self.settings.timeout, self.probe.probe(&descriptor))
            .await
            .unwrap_or(Err(ProbeError::TimedOut(self.settings.timeout)));
        if let Err(err) = &outcome {
            warn!(server = %name, error = %err, "health probe failed");
        }
        descriptor.record_probe(outcome.is_ok(), &*self.clock);

        let limit_reached = self
            .settings
            .evict_after_failures
            .is_some_and(|limit| descriptor.consecutive_failures() >= limit);
        if limit_reached {
            if self.store.remove_if_current(name, descriptor.id()).await? {
                info!(
                    server = %name,
                    failures = descriptor.consecutive_failures(),
                    "evicted server after repeated probe failures"
                );
                return Ok(ProbeReport::Evicted);
            }
            return Ok(ProbeReport::Superseded);
        }

        if self.store.update_if_current(&descriptor).await? {
            debug!(server = %name, status = %descriptor.health_status(), "recorded probe result");
            Ok(ProbeReport::Recorded(descriptor.health_status()))
        } else {
            Ok(ProbeReport::Superseded)
        }
    }

    fn forget(&self, name: &ServerName, task_id: u64) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if tasks.get(name).is_some_and(|task| task.task_id == task_id) {
            tasks.remove(name);
        }
    }
}
