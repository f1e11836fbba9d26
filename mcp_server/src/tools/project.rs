//! Google Cloud project inspection tools.

use std::sync::Arc;

use async_trait::async_trait;

use gcp_backend_interface::{Project, ProjectsConnector};

use crate::config::DefaultKey;
use crate::envelope::{ToolError, ToolOutcome};
use crate::registry::{
    ParamSpec, RegistryBuilder, RegistryError, ToolArguments, ToolDescriptor, ToolHandler,
};

/// Register the project capability group.
pub fn register_project_tools(
    builder: &mut RegistryBuilder,
    projects: Arc<dyn ProjectsConnector>,
) -> Result<(), RegistryError> {
    builder.register(
        projects_list_descriptor(),
        Arc::new(ProjectsListTool {
            projects: projects.clone(),
        }),
    )?;
    builder.register(
        project_describe_descriptor(),
        Arc::new(ProjectDescribeTool { projects }),
    )?;
    Ok(())
}

fn projects_list_descriptor() -> ToolDescriptor {
    ToolDescriptor::new("projects_list", "List existing Google Cloud Projects.").param(
        ParamSpec::required("organization", "The GCP organization ID.")
            .with_fallback(DefaultKey::Organization),
    )
}

fn project_describe_descriptor() -> ToolDescriptor {
    ToolDescriptor::new("project_describe", "Get and describe a Google Cloud Project.").param(
        ParamSpec::required(
            "name",
            "The name of the project to describe (either project ID or project number).",
        )
        .with_fallback(DefaultKey::Project),
    )
}

struct ProjectsListTool {
    projects: Arc<dyn ProjectsConnector>,
}

#[async_trait]
impl ToolHandler for ProjectsListTool {
    async fn call(&self, args: ToolArguments) -> Result<ToolOutcome, ToolError> {
        let organization = args.require("organization")?;

        let client = self
            .projects
            .connect()
            .await
            .map_err(|err| ToolError::backend("unable to create resource manager client.", err))?;

        let parent = format!("organizations/{organization}");
        let mut projects: Vec<Project> = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = client
                .list_projects(&parent, page_token.as_deref())
                .await
                .map_err(|err| ToolError::backend("unable to list projects.", err))?;
            projects.extend(page.items);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        if projects.is_empty() {
            return Ok(ToolOutcome::Empty("No projects found."));
        }
        ToolOutcome::json(&projects)
    }
}

struct ProjectDescribeTool {
    projects: Arc<dyn ProjectsConnector>,
}

#[async_trait]
impl ToolHandler for ProjectDescribeTool {
    async fn call(&self, args: ToolArguments) -> Result<ToolOutcome, ToolError> {
        let name = args.require("name")?;

        let client = self
            .projects
            .connect()
            .await
            .map_err(|err| ToolError::backend("unable to create resource manager client.", err))?;

        let project = client
            .get_project(&format!("projects/{name}"))
            .await
            .map_err(|err| ToolError::backend("unable to describe project.", err))?;

        ToolOutcome::json(&project)
    }
}
