//! GKE cluster inspection tools.

use std::sync::Arc;

use async_trait::async_trait;

use gcp_backend_interface::{Cluster, ClusterManagerConnector};

use crate::envelope::{ToolError, ToolOutcome};
use crate::registry::{
    ParamSpec, RegistryBuilder, RegistryError, ToolArguments, ToolDescriptor, ToolHandler,
};

/// Register the container capability group.
pub fn register_container_tools(
    builder: &mut RegistryBuilder,
    clusters: Arc<dyn ClusterManagerConnector>,
) -> Result<(), RegistryError> {
    builder.register(
        cluster_list_descriptor(),
        Arc::new(ClusterListTool {
            clusters: clusters.clone(),
        }),
    )?;
    builder.register(
        cluster_describe_descriptor(),
        Arc::new(ClusterDescribeTool { clusters }),
    )?;
    Ok(())
}

fn cluster_list_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        "cluster_list",
        "List existing GKE Kubernetes clusters with running containers.",
    )
    .param(ParamSpec::required(
        "project",
        "The GCP project name. '*' matches all projects.",
    ))
    .param(ParamSpec::required(
        "location",
        "Compute zone or region (e.g. europe-west4 or europe-north1) for the clusters. \
         '*' matches all locations.",
    ))
}

fn cluster_describe_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        "cluster_describe",
        "Get and describe a GKE Kubernetes cluster.",
    )
    .param(ParamSpec::required(
        "name",
        "The name of the cluster to describe.",
    ))
    .param(ParamSpec::required("project", "The GCP project name."))
    .param(ParamSpec::required(
        "location",
        "Compute zone or region (e.g. europe-west4 or europe-north1) for the clusters.",
    ))
}

struct ClusterListTool {
    clusters: Arc<dyn ClusterManagerConnector>,
}

#[async_trait]
impl ToolHandler for ClusterListTool {
    async fn call(&self, args: ToolArguments) -> Result<ToolOutcome, ToolError> {
        let project = args.require("project")?;
        let location = args.require("location")?;

        let client = self
            .clusters
            .connect()
            .await
            .map_err(|err| ToolError::backend("unable to create cluster manager client.", err))?;

        let parent = format!("projects/{project}/locations/{location}");
        let mut clusters: Vec<Cluster> = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = client
                .list_clusters(&parent, page_token.as_deref())
                .await
                .map_err(|err| ToolError::backend("unable to list clusters.", err))?;
            clusters.extend(page.items);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        if clusters.is_empty() {
            return Ok(ToolOutcome::Empty("No clusters found."));
        }
        ToolOutcome::json(&clusters)
    }
}

struct ClusterDescribeTool {
    clusters: Arc<dyn ClusterManagerConnector>,
}

#[async_trait]
impl ToolHandler for ClusterDescribeTool {
    async fn call(&self, args: ToolArguments) -> Result<ToolOutcome, ToolError> {
        let name = args.require("name")?;
        let project = args.require("project")?;
        let location = args.require("location")?;

        let client = self
            .clusters
            .connect()
            .await
            .map_err(|err| ToolError::backend("unable to create cluster manager client.", err))?;

        let path = format!("projects/{project}/locations/{location}/clusters/{name}");
        let cluster = client
            .get_cluster(&path)
            .await
            .map_err(|err| ToolError::backend("unable to describe cluster.", err))?;

        ToolOutcome::json(&cluster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcp_backend_interface::mock::MockClusterManager;
    use serde_json::json;

    fn cluster(name: &str) -> Cluster {
        Cluster {
            name: name.to_string(),
            status: Some("RUNNING".to_string()),
            ..Default::default()
        }
    }

    fn list_args() -> ToolArguments {
        ToolArguments::from_pairs([("project", "p1"), ("location", "*")])
    }

    #[tokio::test]
    async fn list_drains_pages_preserving_backend_order() {
        let mock = MockClusterManager::with_pages(vec![
            vec![cluster("alpha")],
            vec![cluster("beta")],
        ]);
        let tool = ClusterListTool {
            clusters: Arc::new(mock),
        };

        let outcome = tool.call(list_args()).await.unwrap();
        let ToolOutcome::Success(value) = outcome else {
            panic!("expected a structured payload");
        };
        let names: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["alpha", "beta"]);
    }

    #[tokio::test]
    async fn list_with_no_clusters_yields_the_sentinel() {
        let tool = ClusterListTool {
            clusters: Arc::new(MockClusterManager::new()),
        };
        let outcome = tool.call(list_args()).await.unwrap();
        assert_eq!(outcome, ToolOutcome::Empty("No clusters found."));
    }

    #[tokio::test]
    async fn mid_drain_error_discards_partial_results() {
        let mock =
            MockClusterManager::failing_on_page(vec![vec![cluster("alpha")], vec![]], 1);
        let tool = ClusterListTool {
            clusters: Arc::new(mock),
        };

        let err = tool.call(list_args()).await.expect_err("drain should abort");
        assert!(matches!(
            err,
            ToolError::Backend {
                message: "unable to list clusters.",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn connect_failure_is_reported_with_the_client_message() {
        let tool = ClusterListTool {
            clusters: Arc::new(MockClusterManager::failing_connect()),
        };
        let err = tool.call(list_args()).await.expect_err("connect should fail");
        assert!(matches!(
            err,
            ToolError::Backend {
                message: "unable to create cluster manager client.",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn describe_fetches_by_full_resource_name() {
        let mock = MockClusterManager::with_item(
            "projects/p1/locations/europe-west4/clusters/alpha",
            cluster("alpha"),
        );
        let tool = ClusterDescribeTool {
            clusters: Arc::new(mock),
        };

        let args = ToolArguments::from_pairs([
            ("name", "alpha"),
            ("project", "p1"),
            ("location", "europe-west4"),
        ]);
        let outcome = tool.call(args).await.unwrap();
        let ToolOutcome::Success(value) = outcome else {
            panic!("expected a structured payload");
        };
        assert_eq!(value["name"], json!("alpha"));
        assert_eq!(value["status"], json!("RUNNING"));
    }

    #[tokio::test]
    async fn describe_miss_surfaces_the_describe_message() {
        let tool = ClusterDescribeTool {
            clusters: Arc::new(MockClusterManager::new()),
        };
        let args = ToolArguments::from_pairs([
            ("name", "alpha"),
            ("project", "p1"),
            ("location", "europe-west4"),
        ]);
        let err = tool.call(args).await.expect_err("get should miss");
        assert!(matches!(
            err,
            ToolError::Backend {
                message: "unable to describe cluster.",
                ..
            }
        ));
    }
}
