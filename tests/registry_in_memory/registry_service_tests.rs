//! Registration and discovery tests.

use super::helpers::{PassiveRegistry, github_request, registry, resource_request};
use mcp_registry::registry::{
    domain::{
        CapabilityDefinition, HealthStatus, RegisterServerRequest, RegistryDomainError,
        SchemaNode, ServerKind,
    },
    services::RegistryServiceError,
};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registered_descriptor_round_trips(registry: PassiveRegistry) {
    let registered = registry
        .register(github_request())
        .await
        .expect("registration should succeed");

    let fetched = registry
        .get_server("github-mcp")
        .await
        .expect("lookup should succeed");

    assert_eq!(fetched, registered);
    assert_eq!(fetched.base_url().as_str(), "http://mcp-github:7000");
    assert_eq!(fetched.health_status(), HealthStatus::Unknown);
    assert!(fetched.capabilities().contains("github_operation"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reregistration_replaces_without_merging(registry: PassiveRegistry) {
    let first = registry
        .register(github_request())
        .await
        .expect("registration should succeed");

    let replacement = RegisterServerRequest::new(
        "github-mcp",
        ServerKind::Hybrid,
        "http://mcp-github-v2:7000",
    )
    .with_capability("list_issues", CapabilityDefinition::default());
    let second = registry
        .register(replacement)
        .await
        .expect("re-registration should succeed");

    let servers = registry
        .list_servers(None)
        .await
        .expect("listing should succeed");
    assert_eq!(servers, vec![second.clone()]);
    assert_ne!(first.id(), second.id());
    assert!(!second.capabilities().contains("github_operation"));
    assert_eq!(second.kind(), ServerKind::Hybrid);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deregistration_is_idempotent(registry: PassiveRegistry) {
    registry
        .register(github_request())
        .await
        .expect("registration should succeed");

    let first = registry.deregister("github-mcp").await.expect("deregister");
    let second = registry.deregister("github-mcp").await.expect("deregister");

    assert!(first);
    assert!(!second);
    assert!(matches!(
        registry.get_server("github-mcp").await,
        Err(RegistryServiceError::NotFound(_))
    ));
}

#[rstest]
#[case(RegisterServerRequest::new("", ServerKind::Tool, "http://a:1"))]
#[case(RegisterServerRequest::new("bad name", ServerKind::Tool, "http://a:1"))]
#[case(RegisterServerRequest::new("github-mcp", ServerKind::Tool, "mcp-github:7000"))]
#[case(RegisterServerRequest::new("github-mcp", ServerKind::Tool, "/relative/path"))]
#[case(RegisterServerRequest::new("github-mcp", ServerKind::Tool, "ftp://mcp-github"))]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_registrations_are_rejected(
    registry: PassiveRegistry,
    #[case] request: RegisterServerRequest,
) {
    let result = registry.register(request).await;

    assert!(matches!(result, Err(RegistryServiceError::Validation(_))));
    let servers = registry
        .list_servers(None)
        .await
        .expect("listing should succeed");
    assert!(servers.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn inconsistent_schema_is_rejected(registry: PassiveRegistry) {
    let schema: SchemaNode = serde_json::from_value(json!({
        "type": "object",
        "properties": {},
        "required": ["path"]
    }))
    .expect("schema should deserialize");
    let request = RegisterServerRequest::new("filesystem", ServerKind::Tool, "http://fs:7001")
        .with_capability("read_file", CapabilityDefinition::tool(schema));

    let result = registry.register(request).await;

    assert!(matches!(
        result,
        Err(RegistryServiceError::Validation(
            RegistryDomainError::UndefinedRequiredProperty { .. }
        ))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn kind_filter_and_order(registry: PassiveRegistry) {
    registry
        .register(resource_request("vector-db"))
        .await
        .expect("registration should succeed");
    registry
        .register(github_request())
        .await
        .expect("registration should succeed");
    registry
        .register(resource_request("docs-indexer"))
        .await
        .expect("registration should succeed");

    let names = |servers: Vec<mcp_registry::registry::domain::ServerDescriptor>| {
        servers
            .iter()
            .map(|server| server.name().to_string())
            .collect::<Vec<_>>()
    };
    let all = registry.list_servers(None).await.expect("listing");
    let resources = registry
        .list_servers(Some(ServerKind::Resource))
        .await
        .expect("listing");

    assert_eq!(names(all), ["vector-db", "github-mcp", "docs-indexer"]);
    assert_eq!(names(resources), ["vector-db", "docs-indexer"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn capability_listings_are_annotated(registry: PassiveRegistry) {
    registry
        .register(github_request())
        .await
        .expect("registration should succeed");
    registry
        .register(
            resource_request("vector-db").with_capability(
                "embeddings",
                CapabilityDefinition::resource(SchemaNode::empty_object())
                    .with_description("Stored document embeddings"),
            ),
        )
        .await
        .expect("registration should succeed");

    let tools = registry.list_tools().await.expect("tool listing");
    let resources = registry.search_resources("EMBED").await.expect("search");

    let tool = tools.first().expect("one tool expected");
    assert_eq!(tools.len(), 1);
    assert_eq!(tool.server.as_str(), "github-mcp");
    assert_eq!(tool.server_url, "http://mcp-github:7000");
    assert_eq!(resources.len(), 1);
    assert_eq!(
        resources.first().map(|entry| entry.server_kind),
        Some(ServerKind::Resource)
    );
}
