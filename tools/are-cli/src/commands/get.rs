//! `get`: fetch one read-only resource and print its body

use crate::output::Outputter;
use anyhow::{Context, Result};
use are_rest_core::ClientConfig;
use are_rest_http::{RequestDispatcher, RestResponse};
use clap::{Args, ValueEnum};
use serde::Serialize;

#[derive(Args)]
pub struct GetArgs {
    /// Resource to fetch
    #[arg(value_enum)]
    pub resource: Resource,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Resource {
    /// Current model state
    ModelState,
    /// Name of the deployed model
    ModelName,
    /// Deployed model as XML
    Model,
    /// Ids of all components in the deployed model
    ComponentIds,
    /// Functions offered by the REST interface
    RestFunctions,
    /// Names of the models in storage
    StoredModels,
}

#[derive(Serialize)]
struct ResponseOutput<'a> {
    status: u16,
    status_text: &'a str,
    body: &'a str,
}

pub async fn execute(args: GetArgs, config: ClientConfig, out: &Outputter) -> Result<()> {
    let rest = RequestDispatcher::from_config(config.server.base_uri.clone(), &config.http)?;
    tracing::info!(resource = ?args.resource, base_uri = %rest.base_uri(), "Fetching resource");

    let response = fetch(&rest, args.resource)
        .await
        .with_context(|| format!("GET {:?} from {}", args.resource, rest.base_uri()))?;

    out.emit(
        &response.body,
        &ResponseOutput {
            status: response.status,
            status_text: &response.status_text,
            body: &response.body,
        },
    )
}

async fn fetch(rest: &RequestDispatcher, resource: Resource) -> are_rest_http::Result<RestResponse> {
    match resource {
        Resource::ModelState => rest.get_model_state().await,
        Resource::ModelName => rest.get_model_name().await,
        Resource::Model => rest.download_deployed_model().await,
        Resource::ComponentIds => rest.get_runtime_component_ids().await,
        Resource::RestFunctions => rest.get_rest_functions().await,
        Resource::StoredModels => rest.list_stored_models().await,
    }
}
