//! Models shared by the resource kinds which do not hold data themselves
//! (Kibana, APM, Enterprise Search and Integrations Server).
//!
//! Their documents only differ in the name of the field holding the kind
//! specific configuration, so the plan types are generated by
//! [`stateless_plan`].

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::models::{
    ClusterMetadataInfo, ClusterPlansInfo, ResourceKind, STATUS_STOPPED, TopologySize,
};

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct StatelessTopologyElement {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instance_configuration_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_configuration_version: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<TopologySize>,

    #[serde(default)]
    pub zone_count: i32,

    /// Only reported for Enterprise Search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<EnterpriseSearchNodeTypes>,
}

impl StatelessTopologyElement {
    pub fn size_value(&self) -> i32 {
        self.size.as_ref().map(TopologySize::value_or_zero).unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EnterpriseSearchNodeTypes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appserver: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct StatelessConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_image: Option<String>,

    /// Only honoured by APM and Integrations Server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_settings: Option<SystemSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_settings_yaml: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_settings_override_yaml: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_settings_json: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_settings_override_json: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SystemSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_enabled: Option<bool>,
}

/// Access to the parts of a stateless plan which are identical across kinds.
pub trait StatelessPlan: Clone + Default + Serialize + DeserializeOwned {
    const KIND: ResourceKind;

    fn cluster_topology(&self) -> &[StatelessTopologyElement];

    fn cluster_topology_mut(&mut self) -> &mut Vec<StatelessTopologyElement>;

    fn configuration(&self) -> &StatelessConfiguration;

    fn configuration_mut(&mut self) -> &mut StatelessConfiguration;
}

/// Generates a plan struct whose kind specific configuration lives under
/// `$field`, together with its [`StatelessPlan`] implementation.
macro_rules! stateless_plan {
    ($name:ident, $field:ident, $kind:expr) => {
        #[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
        pub struct $name {
            #[serde(default, skip_serializing_if = "Vec::is_empty")]
            pub cluster_topology: Vec<StatelessTopologyElement>,

            #[serde(default)]
            pub $field: StatelessConfiguration,
        }

        impl StatelessPlan for $name {
            const KIND: ResourceKind = $kind;

            fn cluster_topology(&self) -> &[StatelessTopologyElement] {
                &self.cluster_topology
            }

            fn cluster_topology_mut(&mut self) -> &mut Vec<StatelessTopologyElement> {
                &mut self.cluster_topology
            }

            fn configuration(&self) -> &StatelessConfiguration {
                &self.$field
            }

            fn configuration_mut(&mut self) -> &mut StatelessConfiguration {
                &mut self.$field
            }
        }
    };
}

stateless_plan!(KibanaClusterPlan, kibana, ResourceKind::Kibana);
stateless_plan!(ApmPlan, apm, ResourceKind::Apm);
stateless_plan!(
    EnterpriseSearchPlan,
    enterprise_search,
    ResourceKind::EnterpriseSearch
);
stateless_plan!(
    IntegrationsServerPlan,
    integrations_server,
    ResourceKind::IntegrationsServer
);

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct StatelessPayload<P> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticsearch_cluster_ref_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    pub plan: P,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct StatelessResourceInfo<P> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticsearch_cluster_ref_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<StatelessClusterInfo<P>>,
}

impl<P> StatelessResourceInfo<P> {
    pub fn current_plan(&self) -> Option<&P> {
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
pub struct StatelessClusterInfo<P> {
    // Kibana reports `cluster_id`, the other kinds report `id`.
    #[serde(default, alias = "id", skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,

    #[serde(default, alias = "cluster_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_info: Option<ClusterPlansInfo<P>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ClusterMetadataInfo>,
}

pub type KibanaPayload = StatelessPayload<KibanaClusterPlan>;
pub type ApmPayload = StatelessPayload<ApmPlan>;
pub type EnterpriseSearchPayload = StatelessPayload<EnterpriseSearchPlan>;
pub type IntegrationsServerPayload = StatelessPayload<IntegrationsServerPlan>;

pub type KibanaResourceInfo = StatelessResourceInfo<KibanaClusterPlan>;
pub type ApmResourceInfo = StatelessResourceInfo<ApmPlan>;
pub type EnterpriseSearchResourceInfo = StatelessResourceInfo<EnterpriseSearchPlan>;
pub type IntegrationsServerResourceInfo = StatelessResourceInfo<IntegrationsServerPlan>;

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn kind_specific_configuration_field() {
        let plan: ApmPlan = serde_yaml::from_str(indoc! {"
            cluster_topology:
              - instance_configuration_id: aws.apm.r5d
                size:
                  value: 512
                  resource: memory
                zone_count: 1
            apm:
              version: 8.4.0
              system_settings:
                debug_enabled: true
        "})
        .expect("valid apm plan");

        assert_eq!(ApmPlan::KIND, ResourceKind::Apm);
        assert_eq!(plan.cluster_topology()[0].size_value(), 512);
        assert_eq!(plan.configuration().version.as_deref(), Some("8.4.0"));

        let json = serde_json::to_value(&plan).expect("plan serializes");
        assert_eq!(json["apm"]["system_settings"]["debug_enabled"], true);
    }

    #[test]
    fn accepts_both_id_spellings() {
        let kibana: KibanaResourceInfo = serde_yaml::from_str(indoc! {"
            ref_id: main-kibana
            info:
              cluster_id: kb-1
              status: started
        "})
        .expect("valid kibana info");
        let apm: ApmResourceInfo = serde_yaml::from_str(indoc! {"
            ref_id: main-apm
            info:
              id: apm-1
              status: stopped
        "})
        .expect("valid apm info");

        assert_eq!(kibana.info.and_then(|info| info.cluster_id).as_deref(), Some("kb-1"));
        assert!(apm.is_stopped());
        assert_eq!(apm.info.and_then(|info| info.cluster_id).as_deref(), Some("apm-1"));
    }
}
