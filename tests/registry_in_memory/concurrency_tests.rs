//! Concurrent access tests.

use super::helpers::{github_request, registry, resource_request, store};
use mcp_registry::registry::{
    adapters::memory::InMemoryDescriptorStore,
    domain::{RegisterServerRequest, ServerKind},
};
use std::collections::HashSet;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_distinct_registrations_all_land() {
    let store = store();
    let service = Arc::new(registry(Arc::clone(&store)));

    let mut handles = Vec::new();
    for index in 0..32 {
        let task_service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            task_service
                .register(resource_request(&format!("indexer-{index}")))
                .await
        }));
    }
    for handle in handles {
        handle
            .await
            .expect("task should not panic")
            .expect("registration should succeed");
    }

    let servers = service.list_servers(None).await.expect("listing");
    let names: HashSet<String> = servers
        .iter()
        .map(|server| server.name().to_string())
        .collect();
    assert_eq!(names.len(), 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reregistrations_leave_exactly_one_winner() {
    let store: Arc<InMemoryDescriptorStore> = store();
    let service = Arc::new(registry(Arc::clone(&store)));

    let mut handles = Vec::new();
    for port in 7000..7016 {
        let task_service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            let mut request: RegisterServerRequest = github_request();
            request.base_url = format!("http://mcp-github:{port}");
            task_service.register(request).await
        }));
    }
    let mut submitted = Vec::new();
    for handle in handles {
        submitted.push(
            handle
                .await
                .expect("task should not panic")
                .expect("registration should succeed"),
        );
    }

    let servers = service.list_servers(None).await.expect("listing");
    let winner = servers.first().expect("one server expected");
    assert_eq!(servers.len(), 1);
    assert!(submitted.contains(winner));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn listing_during_writes_sees_whole_descriptors() {
    let store = store();
    let service = Arc::new(registry(Arc::clone(&store)));

    let writer_service = Arc::clone(&service);
    let writer = tokio::spawn(async move {
        let mut as_tool_server = true;
        for _ in 0..50 {
            let request = if as_tool_server {
                github_request()
            } else {
                resource_request("github-mcp")
            };
            writer_service.register(request).await?;
            as_tool_server = !as_tool_server;
        }
        writer_service.deregister("github-mcp").await.map(|_| ())
    });

    for _ in 0..50 {
        let servers = service.list_servers(None).await.expect("listing");
        assert!(servers.len() <= 1);
        for server in servers {
            let has_tool = server.capabilities().contains("github_operation");
            let is_tool_server = server.kind() == ServerKind::Tool;
            assert_eq!(has_tool, is_tool_server, "torn descriptor observed");
        }
        tokio::task::yield_now().await;
    }

    writer
        .await
        .expect("writer should not panic")
        .expect("writes should succeed");
}
