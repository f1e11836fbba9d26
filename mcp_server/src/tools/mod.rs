//! Capability groups and tool registration.
//!
//! The set of groups is fixed at build time: `container` (GKE clusters),
//! `project` (Cloud projects), and `run` (Cloud Run services). A group is
//! activated by key at startup; the literal key `all` activates every
//! group. Keys are deduplicated before any registrar runs, so overlapping
//! selections never attempt duplicate registration.

pub mod container;
pub mod project;
pub mod run;

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::warn;

use gcp_backend_interface::{ClusterManagerConnector, ProjectsConnector, RunServicesConnector};

use crate::registry::{RegistryBuilder, RegistryError};

/// A bundle of related tools activated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Capability {
    Container,
    Project,
    Run,
}

impl Capability {
    /// Every known capability group.
    pub const ALL: [Capability; 3] = [Capability::Container, Capability::Project, Capability::Run];

    /// Parse a configured group key. Unknown keys yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "container" => Some(Capability::Container),
            "project" => Some(Capability::Project),
            "run" => Some(Capability::Run),
            _ => None,
        }
    }

    /// The configuration key naming this group.
    pub fn key(self) -> &'static str {
        match self {
            Capability::Container => "container",
            Capability::Project => "project",
            Capability::Run => "run",
        }
    }
}

/// Backend connectors shared by the capability groups.
#[derive(Clone)]
pub struct Backends {
    pub clusters: Arc<dyn ClusterManagerConnector>,
    pub projects: Arc<dyn ProjectsConnector>,
    pub services: Arc<dyn RunServicesConnector>,
}

/// Activate the union of the selected capability groups.
///
/// `all` expands to every group. Unknown keys are ignored with a warning so
/// newer configuration keeps working against older servers. Returns the
/// groups that were activated, in stable order.
pub fn register_capabilities(
    builder: &mut RegistryBuilder,
    keys: &[String],
    backends: &Backends,
) -> Result<Vec<Capability>, RegistryError> {
    let mut selected = BTreeSet::new();
    for key in keys {
        if key == "all" {
            selected.extend(Capability::ALL);
            continue;
        }
        match Capability::from_key(key) {
            Some(capability) => {
                selected.insert(capability);
            }
            None => warn!(key = %key, "ignoring unknown capability key"),
        }
    }

    for capability in &selected {
        match capability {
            Capability::Container => {
                container::register_container_tools(builder, backends.clusters.clone())?
            }
            Capability::Project => {
                project::register_project_tools(builder, backends.projects.clone())?
            }
            Capability::Run => run::register_run_tools(builder, backends.services.clone())?,
        }
    }

    Ok(selected.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    use gcp_backend_interface::mock::{MockClusterManager, MockProjects, MockRunServices};

    use crate::config::Defaults;

    fn mock_backends() -> Backends {
        Backends {
            clusters: Arc::new(MockClusterManager::new()),
            projects: Arc::new(MockProjects::new()),
            services: Arc::new(MockRunServices::new()),
        }
    }

    fn keys(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn all_wildcard_activates_every_group() {
        let mut builder = RegistryBuilder::new(Defaults::default());
        let active =
            register_capabilities(&mut builder, &keys(&["all"]), &mock_backends()).unwrap();
        assert_eq!(
            active,
            vec![Capability::Container, Capability::Project, Capability::Run]
        );
        assert_eq!(builder.build().len(), 6);
    }

    #[test]
    fn overlapping_selection_does_not_duplicate_registration() {
        let mut builder = RegistryBuilder::new(Defaults::default());
        let active = register_capabilities(
            &mut builder,
            &keys(&["all", "project", "container"]),
            &mock_backends(),
        )
        .unwrap();
        assert_eq!(active.len(), 3);
        assert_eq!(builder.build().len(), 6);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut builder = RegistryBuilder::new(Defaults::default());
        let active = register_capabilities(
            &mut builder,
            &keys(&["bigquery", "container"]),
            &mock_backends(),
        )
        .unwrap();
        assert_eq!(active, vec![Capability::Container]);
        let registry = builder.build();
        assert_eq!(registry.len(), 2);
        let names: Vec<&str> = registry.descriptors().map(|d| d.name()).collect();
        assert_eq!(names, ["cluster_list", "cluster_describe"]);
    }

    #[test]
    fn empty_selection_registers_nothing() {
        let mut builder = RegistryBuilder::new(Defaults::default());
        let active = register_capabilities(&mut builder, &[], &mock_backends()).unwrap();
        assert!(active.is_empty());
        assert!(builder.build().is_empty());
    }

    #[test]
    fn capability_keys_round_trip() {
        for capability in Capability::ALL {
            assert_eq!(Capability::from_key(capability.key()), Some(capability));
        }
        assert_eq!(Capability::from_key("all"), None);
    }
}
