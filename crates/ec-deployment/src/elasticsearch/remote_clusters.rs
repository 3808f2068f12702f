use std::collections::BTreeSet;

use ec_api::{
    ApiError, DeploymentApi,
    models::{RemoteResourceRef, RemoteResources},
};
use snafu::{ResultExt, Snafu};
use tracing::{debug, instrument};

use crate::elasticsearch::{Elasticsearch, RemoteCluster};

/// The ref id Elasticsearch resources get when none is configured.
pub const DEFAULT_ELASTICSEARCH_REF_ID: &str = "main-elasticsearch";

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("cannot update remote clusters"))]
    UpdateRemoteClusters { source: ApiError },
}

pub fn remote_clusters_payload(remote_clusters: &BTreeSet<RemoteCluster>) -> RemoteResources {
    RemoteResources {
        resources: remote_clusters
            .iter()
            .map(|remote| RemoteResourceRef {
                deployment_id: Some(remote.deployment_id.clone()),
                elasticsearch_ref_id: Some(
                    remote
                        .ref_id
                        .clone()
                        .filter(|ref_id| !ref_id.is_empty())
                        .unwrap_or_else(|| DEFAULT_ELASTICSEARCH_REF_ID.to_owned()),
                ),
                alias: Some(remote.alias.clone()),
                skip_unavailable: remote.skip_unavailable,
            })
            .collect(),
    }
}

/// Replaces the remote clusters of a deployment when the configured set
/// differs from the one in state.
///
/// Remote clusters are not part of the deployment update request and need a
/// call of their own.
#[instrument(skip(client, plan, state))]
pub async fn handle_remote_cluster_changes(
    client: &dyn DeploymentApi,
    deployment_id: &str,
    plan: Option<&Elasticsearch>,
    state: Option<&Elasticsearch>,
) -> Result<(), Error> {
    let empty = BTreeSet::new();
    let planned = plan.map_or(&empty, |es| &es.remote_cluster);
    let current = state.map_or(&empty, |es| &es.remote_cluster);

    if planned == current {
        debug!("remote clusters unchanged");
        return Ok(());
    }

    let ref_id = state
        .or(plan)
        .and_then(|es| es.ref_id.as_deref())
        .filter(|ref_id| !ref_id.is_empty())
        .unwrap_or(DEFAULT_ELASTICSEARCH_REF_ID);

    client
        .update_remote_clusters(deployment_id, ref_id, &remote_clusters_payload(planned))
        .await
        .context(UpdateRemoteClustersSnafu)
}
