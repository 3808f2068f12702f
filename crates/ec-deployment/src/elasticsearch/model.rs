use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The fixed semantic tiers an Elasticsearch resource is composed of.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    strum::AsRefStr,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Tier {
    Hot,
    Warm,
    Cold,
    Frozen,
    Ml,
    Master,
    Coordinating,
}

impl Tier {
    /// The id of the template topology element backing this tier.
    pub fn topology_id(self) -> &'static str {
        match self {
            Self::Hot => "hot_content",
            Self::Warm => "warm",
            Self::Cold => "cold",
            Self::Frozen => "frozen",
            Self::Ml => "ml",
            Self::Master => "master",
            Self::Coordinating => "coordinating",
        }
    }

    pub fn from_topology_id(id: &str) -> Option<Self> {
        <Self as strum::IntoEnumIterator>::iter().find(|tier| tier.topology_id() == id)
    }
}

/// Persisted state of the Elasticsearch resource of a deployment.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Elasticsearch {
    pub autoscale: Option<bool>,
    pub ref_id: Option<String>,
    pub resource_id: Option<String>,
    pub region: Option<String>,
    pub cloud_id: Option<String>,
    pub http_endpoint: Option<String>,
    pub https_endpoint: Option<String>,

    pub hot: Option<ElasticsearchTopology>,
    pub warm: Option<ElasticsearchTopology>,
    pub cold: Option<ElasticsearchTopology>,
    pub frozen: Option<ElasticsearchTopology>,
    pub ml: Option<ElasticsearchTopology>,
    pub master: Option<ElasticsearchTopology>,
    pub coordinating: Option<ElasticsearchTopology>,

    pub config: Option<ElasticsearchConfig>,
    pub remote_cluster: BTreeSet<RemoteCluster>,
    pub snapshot_source: Option<SnapshotSource>,
    pub extension: BTreeSet<Extension>,
    pub trust_account: BTreeSet<TrustAccount>,
    pub trust_external: BTreeSet<TrustExternal>,
    pub strategy: Option<String>,
}

impl Elasticsearch {
    pub fn tier(&self, tier: Tier) -> Option<&ElasticsearchTopology> {
        match tier {
            Tier::Hot => self.hot.as_ref(),
            Tier::Warm => self.warm.as_ref(),
            Tier::Cold => self.cold.as_ref(),
            Tier::Frozen => self.frozen.as_ref(),
            Tier::Ml => self.ml.as_ref(),
            Tier::Master => self.master.as_ref(),
            Tier::Coordinating => self.coordinating.as_ref(),
        }
    }

    pub fn tier_mut(&mut self, tier: Tier) -> &mut Option<ElasticsearchTopology> {
        match tier {
            Tier::Hot => &mut self.hot,
            Tier::Warm => &mut self.warm,
            Tier::Cold => &mut self.cold,
            Tier::Frozen => &mut self.frozen,
            Tier::Ml => &mut self.ml,
            Tier::Master => &mut self.master,
            Tier::Coordinating => &mut self.coordinating,
        }
    }

    /// The configured tiers, in [`Tier`] order.
    pub fn tiers(&self) -> impl Iterator<Item = (Tier, &ElasticsearchTopology)> {
        <Tier as strum::IntoEnumIterator>::iter()
            .filter_map(|tier| self.tier(tier).map(|topology| (tier, topology)))
    }

    /// Returns whether any tier is still described by legacy node types.
    pub fn has_node_types(&self) -> bool {
        self.tiers().any(|(_, topology)| topology.has_node_type())
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ElasticsearchTopology {
    pub instance_configuration_id: Option<String>,
    pub instance_configuration_version: Option<i32>,
    pub size: Option<String>,
    pub size_resource: Option<String>,
    pub zone_count: Option<i32>,

    pub node_type_data: Option<String>,
    pub node_type_master: Option<String>,
    pub node_type_ingest: Option<String>,
    pub node_type_ml: Option<String>,
    pub node_roles: BTreeSet<String>,

    pub autoscaling: Option<ElasticsearchAutoscaling>,
}

impl ElasticsearchTopology {
    pub fn has_node_type(&self) -> bool {
        [
            &self.node_type_data,
            &self.node_type_master,
            &self.node_type_ingest,
            &self.node_type_ml,
        ]
        .into_iter()
        .any(|flag| flag.as_deref().is_some_and(|flag| !flag.is_empty()))
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ElasticsearchAutoscaling {
    pub min_size: Option<String>,
    pub min_size_resource: Option<String>,
    pub max_size: Option<String>,
    pub max_size_resource: Option<String>,
    pub policy_override_json: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ElasticsearchConfig {
    pub docker_image: Option<String>,
    pub plugins: BTreeSet<String>,
    pub user_settings_json: Option<String>,
    pub user_settings_override_json: Option<String>,
    pub user_settings_yaml: Option<String>,
    pub user_settings_override_yaml: Option<String>,
}

impl ElasticsearchConfig {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct RemoteCluster {
    pub deployment_id: String,
    pub alias: String,
    #[serde(default)]
    pub ref_id: Option<String>,
    #[serde(default)]
    pub skip_unavailable: Option<bool>,
}

/// Snapshot to restore into a new or updated cluster.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SnapshotSource {
    pub source_elasticsearch_cluster_id: String,
    #[serde(default = "SnapshotSource::default_snapshot_name")]
    pub snapshot_name: String,
}

impl SnapshotSource {
    pub const LATEST_SUCCESSFUL: &'static str = "__latest_success__";

    fn default_snapshot_name() -> String {
        Self::LATEST_SUCCESSFUL.to_owned()
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExtensionType {
    Bundle,
    Plugin,
}

#[derive(Clone, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Extension {
    pub name: String,
    #[serde(rename = "type")]
    pub extension_type: ExtensionType,
    pub version: String,
    pub url: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct TrustAccount {
    pub account_id: String,
    #[serde(default)]
    pub trust_all: Option<bool>,
    #[serde(default)]
    pub trust_allowlist: BTreeSet<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct TrustExternal {
    pub relationship_id: String,
    #[serde(default)]
    pub trust_all: Option<bool>,
    #[serde(default)]
    pub trust_allowlist: BTreeSet<String>,
}

/// How plan changes are rolled out.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumString, strum::VariantNames,
)]
#[strum(serialize_all = "snake_case")]
pub enum Strategy {
    Autodetect,
    GrowAndShrink,
    RollingGrowAndShrink,
    RollingAll,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Tier::Hot, "hot_content")]
    #[case(Tier::Warm, "warm")]
    #[case(Tier::Coordinating, "coordinating")]
    fn tier_topology_ids(#[case] tier: Tier, #[case] id: &str) {
        assert_eq!(tier.topology_id(), id);
        assert_eq!(Tier::from_topology_id(id), Some(tier));
    }

    #[test]
    fn tiers_are_ordered() {
        let es = Elasticsearch {
            frozen: Some(ElasticsearchTopology::default()),
            hot: Some(ElasticsearchTopology::default()),
            ..Default::default()
        };
        let tiers: Vec<_> = es.tiers().map(|(tier, _)| tier).collect();
        assert_eq!(tiers, [Tier::Hot, Tier::Frozen]);
    }

    #[test]
    fn empty_node_type_is_not_set() {
        let mut topology = ElasticsearchTopology {
            node_type_data: Some(String::new()),
            ..Default::default()
        };
        assert!(!topology.has_node_type());

        topology.node_type_ml = Some("false".to_owned());
        assert!(topology.has_node_type());
    }
}
