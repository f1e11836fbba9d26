//! MCP server for Google Cloud Platform.
//!
//! Exposes GCP inspection operations (list/describe GKE clusters, Cloud
//! projects, and Cloud Run services) as MCP tools behind a JSON-RPC 2.0
//! dispatch surface, served over stdio or SSE.
//!
//! # Architecture
//!
//! Capability groups are selected at startup and register their tool
//! descriptors and handlers into a [`registry::RegistryBuilder`]; the built
//! [`registry::Registry`] is frozen for the serving lifetime. Incoming
//! `tools/call` invocations are validated against the descriptor, routed to
//! the bound handler, and the handler result is normalized into the uniform
//! envelope in [`envelope`].

pub mod config;
pub mod envelope;
pub mod registry;
pub mod server;
pub mod sse;
pub mod tools;

pub use server::McpServer;
pub use server::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use server::{INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR};
