//! Integrations Server. Besides the shared stateless shape it exposes the
//! URLs of the services it hosts.

use ec_api::models::{
    DeploymentTemplate, IntegrationsServerPayload, IntegrationsServerResourceInfo,
};
use serde::{Deserialize, Serialize};

use crate::{
    diagnostics::Diagnostics,
    endpoints::service_url,
    stateless::{self, StatelessResource},
};

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct IntegrationsServer {
    #[serde(flatten)]
    pub resource: StatelessResource,

    pub endpoints: Option<IntegrationsServerEndpoints>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct IntegrationsServerEndpoints {
    pub apm: Option<String>,
    pub fleet: Option<String>,
    pub profiling: Option<String>,
    pub symbols: Option<String>,
}

impl IntegrationsServerEndpoints {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

pub fn read_integrations_servers(
    resources: &[IntegrationsServerResourceInfo],
) -> Result<Option<IntegrationsServer>, stateless::Error> {
    let Some(resource) = stateless::first_running(resources) else {
        return Ok(None);
    };

    let metadata = resource.info.as_ref().and_then(|info| info.metadata.as_ref());
    let endpoints = IntegrationsServerEndpoints {
        apm: service_url(metadata, "apm"),
        fleet: service_url(metadata, "fleet"),
        profiling: service_url(metadata, "profiling"),
        symbols: service_url(metadata, "symbols"),
    };

    Ok(Some(IntegrationsServer {
        resource: stateless::read_resource(resource)?,
        endpoints: Some(endpoints).filter(|endpoints| !endpoints.is_empty()),
    }))
}

pub fn integrations_server_payload(
    integrations_server: Option<&IntegrationsServer>,
    template: &DeploymentTemplate,
    region: &str,
) -> Result<Option<IntegrationsServerPayload>, Diagnostics> {
    stateless::stateless_payload(
        integrations_server.map(|integrations_server| &integrations_server.resource),
        template.integrations_server(),
        region,
    )
}
