//! Cloud Run service inspection tools.

use std::sync::Arc;

use async_trait::async_trait;

use gcp_backend_interface::{RunService, RunServicesConnector};

use crate::config::DefaultKey;
use crate::envelope::{ToolError, ToolOutcome};
use crate::registry::{
    ParamSpec, RegistryBuilder, RegistryError, ToolArguments, ToolDescriptor, ToolHandler,
};

/// Register the run capability group.
pub fn register_run_tools(
    builder: &mut RegistryBuilder,
    services: Arc<dyn RunServicesConnector>,
) -> Result<(), RegistryError> {
    builder.register(
        services_list_descriptor(),
        Arc::new(RunServicesListTool {
            services: services.clone(),
        }),
    )?;
    builder.register(
        service_describe_descriptor(),
        Arc::new(RunServiceDescribeTool { services }),
    )?;
    Ok(())
}

fn services_list_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        "run_services_list",
        "List existing Google Cloud Run services.",
    )
    .param(
        ParamSpec::required("project", "The GCP project name.")
            .with_fallback(DefaultKey::Project),
    )
    .param(
        ParamSpec::required(
            "location",
            "Region (e.g. europe-west1) for the services. Use a specific region, \
             as Cloud Run is regional.",
        )
        .with_fallback(DefaultKey::Location),
    )
}

fn service_describe_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        "run_service_describe",
        "Get and describe a Google Cloud Run service.",
    )
    .param(ParamSpec::required(
        "name",
        "The name of the Cloud Run service to describe.",
    ))
    .param(ParamSpec::required("project", "The GCP project name."))
    .param(ParamSpec::required(
        "location",
        "Region (e.g. europe-west1) for the service.",
    ))
}

struct RunServicesListTool {
    services: Arc<dyn RunServicesConnector>,
}

#[async_trait]
impl ToolHandler for RunServicesListTool {
    async fn call(&self, args: ToolArguments) -> Result<ToolOutcome, ToolError> {
        let project = args.require("project")?;
        let location = args.require("location")?;

        let client = self.services.connect().await.map_err(|err| {
            ToolError::backend("unable to create Cloud Run services client.", err)
        })?;

        let parent = format!("projects/{project}/locations/{location}");
        let mut services: Vec<RunService> = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = client
                .list_services(&parent, page_token.as_deref())
                .await
                .map_err(|err| ToolError::backend("unable to list services.", err))?;
            services.extend(page.items);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        if services.is_empty() {
            return Ok(ToolOutcome::Empty("No Cloud Run services found."));
        }
        ToolOutcome::json(&services)
    }
}

struct RunServiceDescribeTool {
    services: Arc<dyn RunServicesConnector>,
}

#[async_trait]
impl ToolHandler for RunServiceDescribeTool {
    async fn call(&self, args: ToolArguments) -> Result<ToolOutcome, ToolError> {
        let name = args.require("name")?;
        let project = args.require("project")?;
        let location = args.require("location")?;

        let client = self.services.connect().await.map_err(|err| {
            ToolError::backend("unable to create Cloud Run services client.", err)
        })?;

        let path = format!("projects/{project}/locations/{location}/services/{name}");
        let service = client
            .get_service(&path)
            .await
            .map_err(|err| ToolError::backend("unable to describe service.", err))?;

        ToolOutcome::json(&service)
    }
}
