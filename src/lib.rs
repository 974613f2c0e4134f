//! MCP registry: discovery and invocation routing for MCP tool servers.
//!
//! The registry keeps a directory of tool and resource servers, probes their
//! health in the background, and forwards tool calls after checking them
//! against each server's advertised capability schemas.
//!
//! # Architecture
//!
//! The registry follows hexagonal architecture principles:
//!
//! - **Domain**: validated descriptors, capabilities and schemas
//! - **Ports**: store, probe, scheduler and transport traits
//! - **Adapters**: in-memory store and `reqwest`-backed HTTP adapters
//! - **Services**: registration, health probing and invocation routing
//!
//! # Modules
//!
//! - [`registry`]: domain, ports, adapters and services
//! - [`api`]: `axum` HTTP surface
//! - [`config`]: YAML configuration
//! - [`telemetry`]: logging setup

pub mod api;
pub mod config;
pub mod registry;
pub mod telemetry;
