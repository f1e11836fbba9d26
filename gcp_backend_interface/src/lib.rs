//! Backend client interfaces for the Google Cloud services exposed by the
//! MCP server.
//!
//! Each cloud service is reached through a connector/client pair: the
//! connector opens a client scoped to a single invocation, and dropping the
//! client releases it. List calls return explicit [`Page`] values; an absent
//! `next_page_token` marks the end of the stream, so exhaustion and failure
//! are distinct conditions at the type level.
//!
//! The [`rest`] module implements these interfaces against the public REST
//! endpoints; the [`mock`] module provides scriptable in-memory fakes for
//! tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod mock;
pub mod rest;

/// Result alias for backend operations.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Errors produced by backend connectors and clients.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The client could not be constructed.
    #[error("failed to connect to the {service} API: {reason}")]
    Connection {
        /// Human-readable service name.
        service: &'static str,
        /// Why the connection failed.
        reason: String,
    },

    /// The API answered with a non-success status.
    #[error("{service} API returned status {status}: {message}")]
    Api {
        /// Human-readable service name.
        service: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body or error description.
        message: String,
    },

    /// The requested resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The HTTP request itself failed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One page of a list response.
///
/// `next_page_token` is the continuation handle for the next fetch; `None`
/// means the stream is exhausted. Errors never travel through the token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page<T> {
    /// Items in backend-returned order.
    pub items: Vec<T>,
    /// Continuation token, absent on the final page.
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    /// A final page with no continuation.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_token: None,
        }
    }

    /// A page followed by more data.
    pub fn partial(items: Vec<T>, next_page_token: impl Into<String>) -> Self {
        Self {
            items,
            next_page_token: Some(next_page_token.into()),
        }
    }
}

/// A GKE cluster (Cluster Manager API v1, inspection subset).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Cluster name.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Zone or region the cluster lives in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Public endpoint of the cluster master.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_master_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_node_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
}

/// A Google Cloud project (Resource Manager API v3, inspection subset).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Full resource name, e.g. `projects/415104041262`.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Parent resource, e.g. `organizations/123456`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

/// A Cloud Run service (Cloud Run API v2, inspection subset).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunService {
    /// Full resource name, e.g.
    /// `projects/p/locations/europe-west1/services/api`.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Serving URL of the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_ready_revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

/// Opens Cluster Manager clients.
#[async_trait]
pub trait ClusterManagerConnector: Send + Sync {
    /// Open a client scoped to one invocation. Dropping the client releases
    /// it.
    async fn connect(&self) -> BackendResult<Box<dyn ClusterManagerClient>>;
}

/// One invocation-scoped Cluster Manager client.
#[async_trait]
pub trait ClusterManagerClient: Send + Sync {
    /// Fetch a single cluster by full resource name
    /// (`projects/{project}/locations/{location}/clusters/{name}`).
    async fn get_cluster(&self, name: &str) -> BackendResult<Cluster>;

    /// Fetch one page of clusters under
    /// `projects/{project}/locations/{location}`. `*` is accepted for
    /// either path segment and matches all.
    async fn list_clusters(
        &self,
        parent: &str,
        page_token: Option<&str>,
    ) -> BackendResult<Page<Cluster>>;
}

/// Opens Resource Manager project clients.
#[async_trait]
pub trait ProjectsConnector: Send + Sync {
    /// Open a client scoped to one invocation.
    async fn connect(&self) -> BackendResult<Box<dyn ProjectsClient>>;
}

/// One invocation-scoped Resource Manager client.
#[async_trait]
pub trait ProjectsClient: Send + Sync {
    /// Fetch a single project by resource name (`projects/{name}`).
    async fn get_project(&self, name: &str) -> BackendResult<Project>;

    /// Fetch one page of projects under `organizations/{organization}`.
    async fn list_projects(
        &self,
        parent: &str,
        page_token: Option<&str>,
    ) -> BackendResult<Page<Project>>;
}

/// Opens Cloud Run service clients.
#[async_trait]
pub trait RunServicesConnector: Send + Sync {
    /// Open a client scoped to one invocation.
    async fn connect(&self) -> BackendResult<Box<dyn RunServicesClient>>;
}

/// One invocation-scoped Cloud Run client.
#[async_trait]
pub trait RunServicesClient: std::fmt::Debug + Send + Sync {
    /// Fetch a single service by full resource name
    /// (`projects/{project}/locations/{location}/services/{name}`).
    async fn get_service(&self, name: &str) -> BackendResult<RunService>;

    /// Fetch one page of services under
    /// `projects/{project}/locations/{location}`.
    async fn list_services(
        &self,
        parent: &str,
        page_token: Option<&str>,
    ) -> BackendResult<Page<RunService>>;
}
