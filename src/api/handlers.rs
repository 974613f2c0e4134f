//! Request handlers.

use super::{AppState, error::ApiError};
use crate::registry::{
    domain::{
        CapabilityEntry, RegisterServerRequest, ServerDescriptor, ServerKind, ToolCallRequest,
        ToolCallResponse,
    },
    services::RegistryStats,
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Query string of `GET /servers`.
#[derive(Debug, Deserialize)]
pub struct ListServersQuery {
    kind: Option<String>,
}

/// Query string of the search endpoints.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
}

/// Body returned by `DELETE /servers/{name}`.
#[derive(Debug, Serialize)]
pub struct DeregisterResponse {
    status: &'static str,
    name: String,
    removed: bool,
}

pub(super) async fn health(State(state): State<Arc<AppState>>) -> ApiResult<Value> {
    let servers = state.registry.list_servers(None).await?;
    Ok(Json(json!({
        "status": "healthy",
        "service": "mcp-registry",
        "servers_count": servers.len(),
    })))
}

pub(super) async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterServerRequest>, JsonRejection>,
) -> ApiResult<ServerDescriptor> {
    let Json(request) = payload?;
    Ok(Json(state.registry.register(request).await?))
}

pub(super) async fn deregister(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<DeregisterResponse> {
    let removed = state.registry.deregister(&name).await?;
    Ok(Json(DeregisterResponse {
        status: "deregistered",
        name,
        removed,
    }))
}

pub(super) async fn list_servers(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListServersQuery>, QueryRejection>,
) -> ApiResult<Vec<ServerDescriptor>> {
    let Query(ListServersQuery { kind }) = query?;
    let filter = kind
        .as_deref()
        .map(ServerKind::try_from)
        .transpose()
        .map_err(|err| ApiError::validation(err.to_string()))?;
    Ok(Json(state.registry.list_servers(filter).await?))
}

pub(super) async fn get_server(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<ServerDescriptor> {
    Ok(Json(state.registry.get_server(&name).await?))
}

pub(super) async fn get_capabilities(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Value> {
    let server = state.registry.get_server(&name).await?;
    Ok(Json(json!({
        "name": server.name(),
        "kind": server.kind(),
        "capabilities": server.capabilities(),
    })))
}

pub(super) async fn invoke(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ToolCallRequest>, JsonRejection>,
) -> ApiResult<ToolCallResponse> {
    let Json(request) = payload?;
    Ok(Json(state.router.invoke(request).await?))
}

pub(super) async fn list_tools(State(state): State<Arc<AppState>>) -> ApiResult<Vec<CapabilityEntry>> {
    Ok(Json(state.registry.list_tools().await?))
}

pub(super) async fn list_resources(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<CapabilityEntry>> {
    Ok(Json(state.registry.list_resources().await?))
}

pub(super) async fn search_tools(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Vec<CapabilityEntry>> {
    let Query(SearchQuery { q }) = query?;
    Ok(Json(state.registry.search_tools(&q).await?))
}

pub(super) async fn search_resources(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Vec<CapabilityEntry>> {
    let Query(SearchQuery { q }) = query?;
    Ok(Json(state.registry.search_resources(&q).await?))
}

pub(super) async fn stats(State(state): State<Arc<AppState>>) -> ApiResult<RegistryStats> {
    Ok(Json(state.registry.stats().await?))
}
