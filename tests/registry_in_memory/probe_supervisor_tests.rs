//! Health probe supervisor tests.

use super::helpers::{ScriptedProbe, SteppingClock, github_request, registry, store, supervisor};
use mcp_registry::registry::{
    adapters::memory::InMemoryDescriptorStore,
    domain::{HealthStatus, ServerName},
    ports::{DescriptorStore, ProbeError},
    services::{HealthProbeSupervisor, ProbeReport, ProbeSettings, RegistryService},
};
use mockable::DefaultClock;
use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;

fn github() -> ServerName {
    ServerName::new("github-mcp").expect("valid name")
}

async fn seed(store: &Arc<InMemoryDescriptorStore>) {
    registry(Arc::clone(store))
        .register(github_request())
        .await
        .expect("registration should succeed");
}

async fn stored_status(store: &InMemoryDescriptorStore) -> Option<(HealthStatus, u32)> {
    store
        .get(&github())
        .await
        .expect("lookup should succeed")
        .map(|server| (server.health_status(), server.consecutive_failures()))
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn successful_probe_marks_server_healthy(store: Arc<InMemoryDescriptorStore>) {
    seed(&store).await;
    let probe = Arc::new(ScriptedProbe::healthy());
    let supervisor = supervisor(&store, &probe, ProbeSettings::default());

    let report = supervisor
        .probe_once(&github())
        .await
        .expect("probe cycle should succeed");

    assert_eq!(report, ProbeReport::Recorded(HealthStatus::Healthy));
    let server = store
        .get(&github())
        .await
        .expect("lookup should succeed")
        .expect("server should exist");
    assert!(server.last_probed_at().is_some());
    assert_eq!(server.consecutive_failures(), 0);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn slow_probe_times_out_as_unhealthy(store: Arc<InMemoryDescriptorStore>) {
    seed(&store).await;
    let probe = Arc::new(ScriptedProbe::healthy().slow(Duration::from_secs(10)));
    let supervisor = supervisor(
        &store,
        &probe,
        ProbeSettings {
            timeout: Duration::from_secs(1),
            ..ProbeSettings::default()
        },
    );

    let report = supervisor
        .probe_once(&github())
        .await
        .expect("probe cycle should succeed");

    assert_eq!(report, ProbeReport::Recorded(HealthStatus::Unhealthy));
    assert_eq!(stored_status(&store).await, Some((HealthStatus::Unhealthy, 1)));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn recovery_resets_failure_count(store: Arc<InMemoryDescriptorStore>) {
    seed(&store).await;
    let probe = Arc::new(ScriptedProbe::healthy().then([
        Err(ProbeError::Unreachable("connection refused".to_owned())),
        Err(ProbeError::UnhealthyStatus(503)),
    ]));
    let supervisor = supervisor(&store, &probe, ProbeSettings::default());

    for _ in 0..2 {
        supervisor
            .probe_once(&github())
            .await
            .expect("probe cycle should succeed");
    }
    assert_eq!(stored_status(&store).await, Some((HealthStatus::Unhealthy, 2)));

    supervisor
        .probe_once(&github())
        .await
        .expect("probe cycle should succeed");
    assert_eq!(stored_status(&store).await, Some((HealthStatus::Healthy, 0)));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn alternating_health_flips_status_and_advances_timestamps(
    store: Arc<InMemoryDescriptorStore>,
) {
    seed(&store).await;
    let probe = Arc::new(ScriptedProbe::failing(500).then([
        Err(ProbeError::UnhealthyStatus(500)),
        Ok(()),
    ]));
    let supervisor = HealthProbeSupervisor::new(
        Arc::clone(&store),
        Arc::clone(&probe),
        Arc::new(SteppingClock::default()),
        ProbeSettings::default(),
    );

    let mut statuses = Vec::new();
    let mut probed_at = Vec::new();
    for _ in 0..3 {
        supervisor
            .probe_once(&github())
            .await
            .expect("probe cycle should succeed");
        let server = store
            .get(&github())
            .await
            .expect("lookup should succeed")
            .expect("server should exist");
        statuses.push(server.health_status());
        probed_at.push(server.last_probed_at().expect("server should have been probed"));
    }

    assert_eq!(
        statuses,
        [
            HealthStatus::Unhealthy,
            HealthStatus::Healthy,
            HealthStatus::Unhealthy
        ]
    );
    assert!(
        probed_at.windows(2).all(|pair| matches!(pair, [earlier, later] if earlier < later)),
        "probe timestamps should strictly increase: {probed_at:?}"
    );
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn repeated_failures_evict_when_configured(store: Arc<InMemoryDescriptorStore>) {
    seed(&store).await;
    let probe = Arc::new(ScriptedProbe::failing(500));
    let supervisor = supervisor(
        &store,
        &probe,
        ProbeSettings {
            evict_after_failures: Some(3),
            ..ProbeSettings::default()
        },
    );

    let mut reports = Vec::new();
    for _ in 0..3 {
        reports.push(
            supervisor
                .probe_once(&github())
                .await
                .expect("probe cycle should succeed"),
        );
    }

    assert_eq!(
        reports,
        [
            ProbeReport::Recorded(HealthStatus::Unhealthy),
            ProbeReport::Recorded(HealthStatus::Unhealthy),
            ProbeReport::Evicted,
        ]
    );
    assert_eq!(stored_status(&store).await, None);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn failures_never_evict_by_default(store: Arc<InMemoryDescriptorStore>) {
    seed(&store).await;
    let probe = Arc::new(ScriptedProbe::failing(500));
    let supervisor = supervisor(&store, &probe, ProbeSettings::default());

    for _ in 0..10 {
        supervisor
            .probe_once(&github())
            .await
            .expect("probe cycle should succeed");
    }

    assert_eq!(stored_status(&store).await, Some((HealthStatus::Unhealthy, 10)));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn probe_racing_reregistration_is_discarded(store: Arc<InMemoryDescriptorStore>) {
    seed(&store).await;
    let probe = Arc::new(ScriptedProbe::failing(500).slow(Duration::from_secs(2)));
    let supervisor = supervisor(&store, &probe, ProbeSettings::default());
    let service = registry(Arc::clone(&store));
    let name = github();

    let (report, replacement) = tokio::join!(supervisor.probe_once(&name), async {
        tokio::task::yield_now().await;
        service.register(github_request()).await
    });

    assert_eq!(report.expect("probe cycle should succeed"), ProbeReport::Superseded);
    let replacement = replacement.expect("re-registration should succeed");
    let stored = store
        .get(&github())
        .await
        .expect("lookup should succeed")
        .expect("server should exist");
    assert_eq!(stored, replacement);
    assert_eq!(stored.health_status(), HealthStatus::Unknown);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn missing_server_is_not_probed(store: Arc<InMemoryDescriptorStore>) {
    let probe = Arc::new(ScriptedProbe::healthy());
    let supervisor = supervisor(&store, &probe, ProbeSettings::default());

    let report = supervisor
        .probe_once(&github())
        .await
        .expect("probe cycle should succeed");

    assert_eq!(report, ProbeReport::Missing);
    assert_eq!(probe.calls(), 0);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn watched_server_is_probed_every_interval(store: Arc<InMemoryDescriptorStore>) {
    seed(&store).await;
    let probe = Arc::new(ScriptedProbe::healthy());
    let supervisor = supervisor(&store, &probe, ProbeSettings::default());

    supervisor.watch(&github());
    tokio::time::sleep(Duration::from_secs(65)).await;

    assert_eq!(probe.calls(), 3);
    assert!(supervisor.is_watching(&github()));
    supervisor.shutdown().await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn unwatch_stops_probing(store: Arc<InMemoryDescriptorStore>) {
    seed(&store).await;
    let probe = Arc::new(ScriptedProbe::healthy());
    let supervisor = supervisor(&store, &probe, ProbeSettings::default());

    supervisor.watch(&github());
    tokio::time::sleep(Duration::from_secs(1)).await;
    supervisor.unwatch(&github());
    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(probe.calls(), 1);
    assert!(!supervisor.is_watching(&github()));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn slow_probe_does_not_delay_other_servers(store: Arc<InMemoryDescriptorStore>) {
    seed(&store).await;
    let service = registry(Arc::clone(&store));
    let mut other = github_request();
    other.name = "filesystem".to_owned();
    service
        .register(other)
        .await
        .expect("registration should succeed");
    let probe = Arc::new(ScriptedProbe::healthy().slow(Duration::from_secs(20)));
    let supervisor = supervisor(
        &store,
        &probe,
        ProbeSettings {
            timeout: Duration::from_secs(25),
            ..ProbeSettings::default()
        },
    );

    supervisor.watch(&github());
    supervisor.watch(&ServerName::new("filesystem").expect("valid name"));
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(probe.calls(), 2);
    supervisor.shutdown().await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn eviction_ends_the_probe_task(store: Arc<InMemoryDescriptorStore>) {
    seed(&store).await;
    let probe = Arc::new(ScriptedProbe::failing(503));
    let supervisor = supervisor(
        &store,
        &probe,
        ProbeSettings {
            evict_after_failures: Some(1),
            ..ProbeSettings::default()
        },
    );

    supervisor.watch(&github());
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(stored_status(&store).await, None);
    assert!(!supervisor.is_watching(&github()));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn shutdown_cancels_tasks_and_refuses_new_watches(store: Arc<InMemoryDescriptorStore>) {
    seed(&store).await;
    let probe = Arc::new(ScriptedProbe::healthy());
    let supervisor = supervisor(&store, &probe, ProbeSettings::default());

    supervisor.watch(&github());
    supervisor.shutdown().await;
    supervisor.watch(&github());

    assert!(!supervisor.is_watching(&github()));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn registration_lifecycle_drives_watching(store: Arc<InMemoryDescriptorStore>) {
    let probe = Arc::new(ScriptedProbe::healthy());
    let supervisor = supervisor(&store, &probe, ProbeSettings::default());
    let service = RegistryService::new(
        Arc::clone(&store),
        Arc::new(supervisor.clone()),
        Arc::new(DefaultClock),
    );

    service
        .register(github_request())
        .await
        .expect("registration should succeed");
    assert!(supervisor.is_watching(&github()));
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(stored_status(&store).await, Some((HealthStatus::Healthy, 0)));

    service
        .deregister("github-mcp")
        .await
        .expect("deregistration should succeed");
    assert!(!supervisor.is_watching(&github()));
}
