use serde::{Deserialize, Serialize};

use crate::models::{
    ApmPayload, ApmResourceInfo, ElasticsearchPayload, ElasticsearchResourceInfo,
    EnterpriseSearchPayload, EnterpriseSearchResourceInfo, IntegrationsServerPayload,
    IntegrationsServerResourceInfo, KibanaPayload, KibanaResourceInfo,
};

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DeploymentGetResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<DeploymentResources>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<DeploymentSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DeploymentMetadata>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DeploymentResources {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elasticsearch: Vec<ElasticsearchResourceInfo>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kibana: Vec<KibanaResourceInfo>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apm: Vec<ApmResourceInfo>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enterprise_search: Vec<EnterpriseSearchResourceInfo>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integrations_server: Vec<IntegrationsServerResourceInfo>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DeploymentSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_filter_settings: Option<TrafficFilterSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observability: Option<DeploymentObservabilitySettings>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TrafficFilterSettings {
    #[serde(default)]
    pub rulesets: Vec<String>,
}

/// Where a deployment ships its own logs and metrics to.
///
/// An empty object (both members absent) disables shipping, which differs from
/// omitting the whole object on update.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DeploymentObservabilitySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<ObservabilityDestinationSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ObservabilityDestinationSettings>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ObservabilityDestinationSettings {
    #[serde(default)]
    pub destination: ObservabilityAbsoluteDeployment,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ObservabilityAbsoluteDeployment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DeploymentMetadata {
    #[serde(default)]
    pub tags: Vec<MetadataItem>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct MetadataItem {
    pub key: String,
    pub value: String,
}

/// A resource as returned by a create or update call. Generated credentials
/// are only part of these responses.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DeploymentResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<ClusterCredentials>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_token: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ClusterCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DeploymentCreateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default)]
    pub resources: DeploymentCreateResources,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<DeploymentCreateSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DeploymentMetadata>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DeploymentCreateResources {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elasticsearch: Vec<ElasticsearchPayload>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kibana: Vec<KibanaPayload>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apm: Vec<ApmPayload>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enterprise_search: Vec<EnterpriseSearchPayload>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integrations_server: Vec<IntegrationsServerPayload>,
}

/// Update requests carry the same resource payloads as create requests.
pub type DeploymentUpdateResources = DeploymentCreateResources;

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DeploymentCreateSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_filter_settings: Option<TrafficFilterSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observability: Option<DeploymentObservabilitySettings>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DeploymentUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Resources missing from `resources` are removed when set.
    #[serde(default)]
    pub prune_orphans: bool,

    #[serde(default)]
    pub resources: DeploymentUpdateResources,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<DeploymentUpdateSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DeploymentMetadata>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DeploymentUpdateSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observability: Option<DeploymentObservabilitySettings>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_observability_is_an_object() {
        let settings = DeploymentUpdateSettings {
            observability: Some(DeploymentObservabilitySettings::default()),
        };

        assert_eq!(
            serde_json::to_value(&settings).expect("settings serialize"),
            json!({ "observability": {} })
        );
        assert_eq!(
            serde_json::to_value(DeploymentUpdateSettings::default())
                .expect("settings serialize"),
            json!({})
        );
    }
}
