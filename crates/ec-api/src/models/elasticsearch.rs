use serde::{Deserialize, Serialize};

use crate::models::{ClusterMetadataInfo, ClusterPlansInfo, STATUS_STOPPED, TopologySize};

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ElasticsearchPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default)]
    pub plan: ElasticsearchClusterPlan,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<ElasticsearchClusterSettings>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ElasticsearchClusterPlan {
    /// An empty topology is omitted from the document, which makes the API
    /// keep the topology it already has.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cluster_topology: Vec<ElasticsearchClusterTopologyElement>,

    #[serde(default)]
    pub elasticsearch: ElasticsearchConfiguration,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_template: Option<DeploymentTemplateReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscaling_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transient: Option<TransientElasticsearchPlanConfiguration>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ElasticsearchClusterTopologyElement {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instance_configuration_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_configuration_version: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<TopologySize>,

    #[serde(default)]
    pub zone_count: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<ElasticsearchNodeType>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_roles: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscaling_min: Option<TopologySize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscaling_max: Option<TopologySize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscaling_policy_override_json: Option<serde_json::Value>,
}

impl ElasticsearchClusterTopologyElement {
    pub fn size_value(&self) -> i32 {
        self.size.as_ref().map(TopologySize::value_or_zero).unwrap_or_default()
    }
}

/// Legacy node type flags, superseded by node roles since 7.10.0.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ElasticsearchNodeType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingest: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ElasticsearchConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_image: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enabled_built_in_plugins: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_bundles: Vec<ElasticsearchUserBundle>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_plugins: Vec<ElasticsearchUserPlugin>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_settings_yaml: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_settings_override_yaml: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_settings_json: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_settings_override_json: Option<serde_json::Value>,

    /// Index curation, deprecated since index lifecycle management exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curation: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ElasticsearchUserBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticsearch_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ElasticsearchUserPlugin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticsearch_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DeploymentTemplateReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TransientElasticsearchPlanConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_snapshot: Option<RestoreSnapshotConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<PlanStrategy>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RestoreSnapshotConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_cluster_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
}

/// How a plan change is rolled out. At most one member is expected to be set.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlanStrategy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autodetect: Option<AutodetectStrategyConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grow_and_shrink: Option<GrowShrinkStrategyConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_grow_and_shrink: Option<RollingGrowShrinkStrategyConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling: Option<RollingStrategyConfig>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AutodetectStrategyConfig {}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct GrowShrinkStrategyConfig {}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RollingGrowShrinkStrategyConfig {}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RollingStrategyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ElasticsearchClusterSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust: Option<ElasticsearchClusterTrustSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curation: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ElasticsearchClusterTrustSettings {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<AccountTrustRelationship>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external: Vec<ExternalTrustRelationship>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AccountTrustRelationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_all: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trust_allowlist: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ExternalTrustRelationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_relationship_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_all: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trust_allowlist: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ElasticsearchResourceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<ElasticsearchClusterInfo>,
}

impl ElasticsearchResourceInfo {
    /// Returns the plan the resource is currently running, if any.
    pub fn current_plan(&self) -> Option<&ElasticsearchClusterPlan> {
        self.info
            .as_ref()
            .and_then(|info| info.plan_info.as_ref())
            .and_then(ClusterPlansInfo::current_plan)
    }

    /// A resource without status information is considered stopped.
    pub fn is_stopped(&self) -> bool {
        self.info
            .as_ref()
            .and_then(|info| info.status.as_deref())
            .is_none_or(|status| status == STATUS_STOPPED)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ElasticsearchClusterInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_info: Option<ClusterPlansInfo<ElasticsearchClusterPlan>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ClusterMetadataInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<ElasticsearchClusterSettings>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RemoteResources {
    #[serde(default)]
    pub resources: Vec<RemoteResourceRef>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RemoteResourceRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticsearch_ref_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_unavailable: Option<bool>,
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn missing_status_is_stopped() {
        let info: ElasticsearchResourceInfo = serde_yaml::from_str(indoc! {"
            ref_id: main-elasticsearch
            info:
              cluster_id: abc
        "})
        .expect("valid resource info");

        assert!(info.is_stopped());
        assert!(info.current_plan().is_none());
    }

    #[test]
    fn empty_topology_is_omitted() {
        let payload = ElasticsearchPayload::default();
        let json = serde_json::to_value(&payload).expect("payload serializes");

        assert_eq!(json["plan"].get("cluster_topology"), None);
        assert_eq!(json.get("settings"), None);
    }
}
