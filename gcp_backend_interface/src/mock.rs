//! Scriptable in-memory fakes of the backend interfaces.
//!
//! Each mock is cheaply cloneable and shares its fixture, so a test can keep
//! one handle for assertions while the server under test holds another. The
//! fixtures support canned get responses keyed by resource name, scripted
//! page sequences for list calls, and failure injection for both the connect
//! step and individual pages.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    BackendError, BackendResult, Cluster, ClusterManagerClient, ClusterManagerConnector, Page,
    Project, ProjectsClient, ProjectsConnector, RunService, RunServicesClient,
    RunServicesConnector,
};

/// Shared scripted state behind one mock backend.
#[derive(Debug, Default)]
struct Fixture<T> {
    items: HashMap<String, T>,
    pages: Vec<Vec<T>>,
    fail_connect: bool,
    fail_on_page: Option<usize>,
    connects: AtomicUsize,
}

impl<T: Clone> Fixture<T> {
    fn connect(&self, service: &'static str) -> BackendResult<()> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect {
            return Err(BackendError::Connection {
                service,
                reason: "mock connect failure".to_string(),
            });
        }
        Ok(())
    }

    fn get(&self, name: &str) -> BackendResult<T> {
        self.items
            .get(name)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(name.to_string()))
    }

    // Page tokens are the page index; `None` requests page zero.
    fn page(&self, service: &'static str, page_token: Option<&str>) -> BackendResult<Page<T>> {
        let index = page_token
            .and_then(|token| token.parse::<usize>().ok())
            .unwrap_or(0);
        if self.fail_on_page == Some(index) {
            return Err(BackendError::Api {
                service,
                status: 503,
                message: "backend unavailable".to_string(),
            });
        }
        let items = self.pages.get(index).cloned().unwrap_or_default();
        let next_page_token = if index + 1 < self.pages.len() {
            Some((index + 1).to_string())
        } else {
            None
        };
        Ok(Page {
            items,
            next_page_token,
        })
    }

    fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

macro_rules! mock_backend {
    ($(#[$doc:meta])* $mock:ident, $item:ty, $connector:ident, $client:ident, $service:literal,
     get = $get:ident, list = $list:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, Default)]
        pub struct $mock {
            fixture: Arc<Fixture<$item>>,
        }

        impl $mock {
            /// An empty backend: every list yields zero pages, every get
            /// misses.
            pub fn new() -> Self {
                Self::default()
            }

            /// Script the list response as a sequence of pages, served in
            /// order and followed by stream exhaustion.
            pub fn with_pages(pages: Vec<Vec<$item>>) -> Self {
                Self {
                    fixture: Arc::new(Fixture {
                        pages,
                        ..Default::default()
                    }),
                }
            }

            /// Serve one canned item for gets by resource name.
            pub fn with_item(name: impl Into<String>, item: $item) -> Self {
                let mut items = HashMap::new();
                items.insert(name.into(), item);
                Self {
                    fixture: Arc::new(Fixture {
                        items,
                        ..Default::default()
                    }),
                }
            }

            /// Fail every connect attempt.
            pub fn failing_connect() -> Self {
                Self {
                    fixture: Arc::new(Fixture {
                        fail_connect: true,
                        ..Default::default()
                    }),
                }
            }

            /// Serve the scripted pages but fail when the page at `index`
            /// is fetched.
            pub fn failing_on_page(pages: Vec<Vec<$item>>, index: usize) -> Self {
                Self {
                    fixture: Arc::new(Fixture {
                        pages,
                        fail_on_page: Some(index),
                        ..Default::default()
                    }),
                }
            }

            /// How many clients have been opened against this backend.
            pub fn connect_count(&self) -> usize {
                self.fixture.connect_count()
            }
        }

        #[async_trait]
        impl $connector for $mock {
            async fn connect(&self) -> BackendResult<Box<dyn $client>> {
                self.fixture.connect($service)?;
                Ok(Box::new(self.clone()))
            }
        }

        #[async_trait]
        impl $client for $mock {
            async fn $get(&self, name: &str) -> BackendResult<$item> {
                self.fixture.get(name)
            }

            async fn $list(
                &self,
                _parent: &str,
                page_token: Option<&str>,
            ) -> BackendResult<Page<$item>> {
                self.fixture.page($service, page_token)
            }
        }
    };
}

mock_backend!(
    /// Scripted Cluster Manager backend.
    MockClusterManager,
    Cluster,
    ClusterManagerConnector,
    ClusterManagerClient,
    "cluster manager",
    get = get_cluster,
    list = list_clusters
);

mock_backend!(
    /// Scripted Resource Manager backend.
    MockProjects,
    Project,
    ProjectsConnector,
    ProjectsClient,
    "resource manager",
    get = get_project,
    list = list_projects
);

mock_backend!(
    /// Scripted Cloud Run backend.
    MockRunServices,
    RunService,
    RunServicesConnector,
    RunServicesClient,
    "Cloud Run services",
    get = get_service,
    list = list_services
);

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(name: &str) -> Cluster {
        Cluster {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn pages_are_served_in_order_then_exhausted() {
        let mock = MockClusterManager::with_pages(vec![
            vec![cluster("a")],
            vec![cluster("b"), cluster("c")],
        ]);
        let client = mock.connect().await.unwrap();

        let first = client.list_clusters("projects/p/locations/l", None).await.unwrap();
        assert_eq!(first.items, vec![cluster("a")]);
        let token = first.next_page_token.expect("more pages expected");

        let second = client
            .list_clusters("projects/p/locations/l", Some(&token))
            .await
            .unwrap();
        assert_eq!(second.items, vec![cluster("b"), cluster("c")]);
        assert!(second.next_page_token.is_none());
    }

    #[tokio::test]
    async fn empty_backend_serves_one_final_empty_page() {
        let mock = MockProjects::new();
        let client = mock.connect().await.unwrap();
        let page = client.list_projects("organizations/1", None).await.unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[tokio::test]
    async fn connect_failure_is_counted() {
        let mock = MockRunServices::failing_connect();
        let err = mock.connect().await.expect_err("connect should fail");
        assert!(matches!(err, BackendError::Connection { .. }));
        assert_eq!(mock.connect_count(), 1);
    }

    #[tokio::test]
    async fn scripted_page_failure_surfaces_as_api_error() {
        let mock = MockClusterManager::failing_on_page(vec![vec![cluster("a")], vec![]], 1);
        let client = mock.connect().await.unwrap();

        let first = client.list_clusters("projects/p/locations/l", None).await.unwrap();
        let token = first.next_page_token.expect("more pages expected");

        let err = client
            .list_clusters("projects/p/locations/l", Some(&token))
            .await
            .expect_err("second page should fail");
        assert!(matches!(err, BackendError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn get_misses_report_not_found() {
        let mock = MockProjects::with_item(
            "projects/demo",
            Project {
                name: "projects/demo".to_string(),
                ..Default::default()
            },
        );
        let client = mock.connect().await.unwrap();
        assert!(client.get_project("projects/demo").await.is_ok());
        let err = client.get_project("projects/other").await.unwrap_err();
        assert!(matches!(err, BackendError::NotFound(name) if name == "projects/other"));
    }
}
