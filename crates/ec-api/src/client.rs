use async_trait::async_trait;
use snafu::Snafu;

use crate::models::{DeploymentTemplate, RemoteResources, ResourceKind};

/// Errors returned by a [`DeploymentApi`] implementation.
///
/// The core never retries. Retry policies belong to the HTTP client behind the
/// trait.
#[derive(Debug, Eq, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum ApiError {
    #[snafu(display("{operation} failed with status {status}: {message}"))]
    Status {
        operation: String,
        status: u16,
        message: String,
    },

    #[snafu(display("{operation} failed: {message}"))]
    Transport { operation: String, message: String },

    #[snafu(display("{kind} resource not found in deployment {deployment_id:?}"))]
    ResourceNotFound {
        kind: ResourceKind,
        deployment_id: String,
    },
}

/// The subset of the platform API the reconciliation core depends on.
///
/// Implementations wrap an HTTP client. Every call is a single fail-fast
/// request, the core performs no caching of its results.
#[async_trait]
pub trait DeploymentApi: Send + Sync {
    /// Fetches a deployment template. Instance configurations are not needed by
    /// the core, so callers pass `hide_instance_configurations = true`.
    async fn get_deployment_template(
        &self,
        template_id: &str,
        region: &str,
        hide_instance_configurations: bool,
    ) -> Result<DeploymentTemplate, ApiError>;

    /// Replaces the remote cluster links of the Elasticsearch resource `ref_id`.
    async fn update_remote_clusters(
        &self,
        deployment_id: &str,
        ref_id: &str,
        remote_resources: &RemoteResources,
    ) -> Result<(), ApiError>;

    /// Discovers the ref id of the first resource of `kind` in a deployment.
    async fn populate_ref_id(
        &self,
        kind: ResourceKind,
        deployment_id: &str,
    ) -> Result<String, ApiError>;

    async fn create_traffic_filter_association(
        &self,
        ruleset_id: &str,
        deployment_id: &str,
    ) -> Result<(), ApiError>;

    async fn delete_traffic_filter_association(
        &self,
        ruleset_id: &str,
        deployment_id: &str,
    ) -> Result<(), ApiError>;
}
