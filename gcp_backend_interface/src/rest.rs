//! REST implementations of the backend interfaces.
//!
//! Each connector opens a fresh HTTP client per invocation and authenticates
//! with an OAuth2 bearer token. Endpoints are overridable so tests can point
//! a backend at a local server.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{
    BackendError, BackendResult, Cluster, ClusterManagerClient, ClusterManagerConnector, Page,
    Project, ProjectsClient, ProjectsConnector, RunService, RunServicesClient,
    RunServicesConnector,
};

const CONTAINER_ENDPOINT: &str = "https://container.googleapis.com/v1";
const RESOURCE_MANAGER_ENDPOINT: &str = "https://cloudresourcemanager.googleapis.com/v3";
const RUN_ENDPOINT: &str = "https://run.googleapis.com/v2";

/// Invocation-scoped HTTP client shared by the three backends.
#[derive(Debug)]
struct RestClient {
    http: reqwest::Client,
    token: Arc<str>,
    endpoint: String,
    service: &'static str,
}

impl RestClient {
    fn connect(
        service: &'static str,
        token: Arc<str>,
        endpoint: String,
    ) -> BackendResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| BackendError::Connection {
                service,
                reason: err.to_string(),
            })?;
        Ok(Self {
            http,
            token,
            endpoint,
            service,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> BackendResult<T> {
        let mut request = self.http.get(self.url(path)).bearer_auth(&self.token);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(BackendError::Api {
                service: self.service,
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}

fn token_query<'a>(page_token: Option<&'a str>) -> Vec<(&'static str, &'a str)> {
    match page_token {
        Some(token) => vec![("pageToken", token)],
        None => Vec::new(),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListClustersResponse {
    #[serde(default)]
    clusters: Vec<Cluster>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListProjectsResponse {
    #[serde(default)]
    projects: Vec<Project>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListServicesResponse {
    #[serde(default)]
    services: Vec<RunService>,
    next_page_token: Option<String>,
}

macro_rules! rest_connector {
    ($(#[$doc:meta])* $connector:ident, $default_endpoint:expr) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $connector {
            token: Arc<str>,
            endpoint: String,
        }

        impl $connector {
            /// Backend against the public Google endpoint.
            pub fn new(token: impl Into<String>) -> Self {
                Self::with_endpoint(token, $default_endpoint)
            }

            /// Backend against a custom endpoint (testing).
            pub fn with_endpoint(token: impl Into<String>, endpoint: impl Into<String>) -> Self {
                Self {
                    token: token.into().into(),
                    endpoint: endpoint.into().trim_end_matches('/').to_string(),
                }
            }
        }
    };
}

rest_connector!(
    /// Cluster Manager API backend.
    RestClusterManager,
    CONTAINER_ENDPOINT
);

rest_connector!(
    /// Resource Manager API backend.
    RestProjects,
    RESOURCE_MANAGER_ENDPOINT
);

rest_connector!(
    /// Cloud Run API backend.
    RestRunServices,
    RUN_ENDPOINT
);

#[async_trait]
impl ClusterManagerConnector for RestClusterManager {
    async fn connect(&self) -> BackendResult<Box<dyn ClusterManagerClient>> {
        Ok(Box::new(RestClusterManagerClient {
            inner: RestClient::connect(
                "cluster manager",
                self.token.clone(),
                self.endpoint.clone(),
            )?,
        }))
    }
}

struct RestClusterManagerClient {
    inner: RestClient,
}

#[async_trait]
impl ClusterManagerClient for RestClusterManagerClient {
    async fn get_cluster(&self, name: &str) -> BackendResult<Cluster> {
        self.inner.get_json(name, &[]).await
    }

    // The v1 list endpoint is unpaginated; everything arrives on one final
    // page.
    async fn list_clusters(
        &self,
        parent: &str,
        _page_token: Option<&str>,
    ) -> BackendResult<Page<Cluster>> {
        let response: ListClustersResponse = self
            .inner
            .get_json(&format!("{parent}/clusters"), &[])
            .await?;
        Ok(Page::last(response.clusters))
    }
}

#[async_trait]
impl ProjectsConnector for RestProjects {
    async fn connect(&self) -> BackendResult<Box<dyn ProjectsClient>> {
        Ok(Box::new(RestProjectsClient {
            inner: RestClient::connect(
                "resource manager",
                self.token.clone(),
                self.endpoint.clone(),
            )?,
        }))
    }
}

struct RestProjectsClient {
    inner: RestClient,
}

#[async_trait]
impl ProjectsClient for RestProjectsClient {
    async fn get_project(&self, name: &str) -> BackendResult<Project> {
        self.inner.get_json(name, &[]).await
    }

    async fn list_projects(
        &self,
        parent: &str,
        page_token: Option<&str>,
    ) -> BackendResult<Page<Project>> {
        let mut query = token_query(page_token);
        query.push(("parent", parent));
        let response: ListProjectsResponse = self.inner.get_json("projects", &query).await?;
        Ok(Page {
            items: response.projects,
            next_page_token: response.next_page_token,
        })
    }
}

#[async_trait]
impl RunServicesConnector for RestRunServices {
    async fn connect(&self) -> BackendResult<Box<dyn RunServicesClient>> {
        Ok(Box::new(RestRunServicesClient {
            inner: RestClient::connect(
                "Cloud Run services",
                self.token.clone(),
                self.endpoint.clone(),
            )?,
        }))
    }
}

#[derive(Debug)]
struct RestRunServicesClient {
    inner: RestClient,
}

#[async_trait]
impl RunServicesClient for RestRunServicesClient {
    async fn get_service(&self, name: &str) -> BackendResult<RunService> {
        self.inner.get_json(name, &[]).await
    }

    async fn list_services(
        &self,
        parent: &str,
        page_token: Option<&str>,
    ) -> BackendResult<Page<RunService>> {
        let query = token_query(page_token);
        let response: ListServicesResponse = self
            .inner
            .get_json(&format!("{parent}/services"), &query)
            .await?;
        Ok(Page {
            items: response.services,
            next_page_token: response.next_page_token,
        })
    }
}
