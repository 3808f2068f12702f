//! Shipping of a deployment's logs and metrics to a monitoring deployment.

use ec_api::{
    DeploymentApi,
    models::{
        DeploymentObservabilitySettings, DeploymentSettings, ObservabilityAbsoluteDeployment,
        ObservabilityDestinationSettings, ResourceKind,
    },
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    diagnostics::{Diagnostic, Diagnostics},
    user_settings::non_empty,
};

/// The deployment id referring to the deployment being managed.
pub const SELF_DEPLOYMENT_ID: &str = "self";

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Observability {
    pub deployment_id: Option<String>,
    pub ref_id: Option<String>,
    pub logs: bool,
    pub metrics: bool,
}

impl Observability {
    pub fn is_self(&self) -> bool {
        self.deployment_id.as_deref() == Some(SELF_DEPLOYMENT_ID)
    }
}

/// Reads the observability settings, [`None`] when neither logs nor metrics
/// are shipped.
pub fn read_observability(settings: Option<&DeploymentSettings>) -> Option<Observability> {
    let settings = settings?.observability.as_ref()?;
    let mut observability = Observability::default();

    for (destination, enabled) in [
        (&settings.logging, &mut observability.logs),
        (&settings.metrics, &mut observability.metrics),
    ] {
        let Some(destination) = destination else {
            continue;
        };
        *enabled = true;
        observability.deployment_id = destination.destination.deployment_id.clone();
        observability.ref_id = destination.destination.ref_id.clone();
    }

    Some(observability).filter(|observability| observability.logs || observability.metrics)
}

/// Builds the observability settings of a request.
///
/// Without an explicit ref id the Elasticsearch ref id of the target
/// deployment is looked up, unless the target is the deployment itself.
pub async fn observability_payload(
    observability: Option<&Observability>,
    client: &dyn DeploymentApi,
) -> Result<Option<DeploymentObservabilitySettings>, Diagnostics> {
    let Some(observability) = observability else {
        return Ok(None);
    };
    let Some(deployment_id) = non_empty(observability.deployment_id.as_ref()) else {
        return Ok(None);
    };

    let ref_id = match non_empty(observability.ref_id.as_ref()) {
        Some(ref_id) => Some(ref_id),
        None if deployment_id == SELF_DEPLOYMENT_ID => None,
        None => {
            let ref_id = client
                .populate_ref_id(ResourceKind::Elasticsearch, &deployment_id)
                .await
                .map_err(|err| {
                    Diagnostic::error("observability ref_id auto discovery", err)
                        .at("observability.ref_id")
                })?;
            debug!(%deployment_id, %ref_id, "discovered observability ref id");
            Some(ref_id)
        }
    };

    let destination = ObservabilityDestinationSettings {
        destination: ObservabilityAbsoluteDeployment {
            deployment_id: Some(deployment_id),
            ref_id,
        },
    };

    Ok(Some(DeploymentObservabilitySettings {
        logging: observability.logs.then(|| destination.clone()),
        metrics: observability.metrics.then_some(destination),
    }))
}
