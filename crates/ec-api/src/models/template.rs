use serde::{Deserialize, Serialize};

use crate::models::{
    ApmPayload, DeploymentCreateRequest, ElasticsearchPayload, EnterpriseSearchPayload,
    IntegrationsServerPayload, KibanaPayload,
};

/// A deployment template. Its `deployment_template` holds one default payload
/// per resource kind the template supports. Templates are read-only.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DeploymentTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub deployment_template: DeploymentCreateRequest,
}

impl DeploymentTemplate {
    pub fn elasticsearch(&self) -> Option<&ElasticsearchPayload> {
        self.deployment_template.resources.elasticsearch.first()
    }

    pub fn kibana(&self) -> Option<&KibanaPayload> {
        self.deployment_template.resources.kibana.first()
    }

    pub fn apm(&self) -> Option<&ApmPayload> {
        self.deployment_template.resources.apm.first()
    }

    pub fn enterprise_search(&self) -> Option<&EnterpriseSearchPayload> {
        self.deployment_template.resources.enterprise_search.first()
    }

    pub fn integrations_server(&self) -> Option<&IntegrationsServerPayload> {
        self.deployment_template.resources.integrations_server.first()
    }
}
