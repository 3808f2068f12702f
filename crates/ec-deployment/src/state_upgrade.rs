//! Upgrades state written by the previous schema generation.
//!
//! That generation stored every resource kind as a list holding at most one
//! element, with topologies as lists keyed by the template's topology id.
//! Only the layout differs, so the conversion is infallible. Topology
//! elements which do not map to a tier are dropped.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use tracing::warn;

use crate::{
    deployment::Deployment,
    elasticsearch::{
        Elasticsearch, ElasticsearchAutoscaling, ElasticsearchConfig, ElasticsearchTopology,
        Extension, RemoteCluster, SnapshotSource, Tier, TrustAccount, TrustExternal,
    },
    enterprise_search::EnterpriseSearch,
    integrations_server::IntegrationsServer,
    observability::Observability,
    stateless::{StatelessConfig, StatelessResource},
};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LegacyDeployment {
    pub id: Option<String>,
    pub alias: Option<String>,
    pub version: Option<String>,
    pub region: Option<String>,
    pub deployment_template_id: Option<String>,
    pub name: Option<String>,
    pub elasticsearch_username: Option<String>,
    pub elasticsearch_password: Option<String>,
    pub apm_secret_token: Option<String>,
    pub traffic_filter: BTreeSet<String>,
    pub tags: BTreeMap<String, String>,

    pub elasticsearch: Vec<LegacyElasticsearch>,
    pub kibana: Vec<LegacyStateless>,
    pub apm: Vec<LegacyStateless>,
    pub integrations_server: Vec<LegacyStateless>,
    pub enterprise_search: Vec<LegacyStateless>,
    pub observability: Vec<Observability>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LegacyElasticsearch {
    /// Kept as `"true"` or `"false"`.
    pub autoscale: Option<String>,
    pub ref_id: Option<String>,
    pub resource_id: Option<String>,
    pub region: Option<String>,
    pub cloud_id: Option<String>,
    pub http_endpoint: Option<String>,
    pub https_endpoint: Option<String>,
    pub topology: Vec<LegacyElasticsearchTopology>,
    pub config: Vec<ElasticsearchConfig>,
    pub remote_cluster: BTreeSet<RemoteCluster>,
    pub snapshot_source: Vec<SnapshotSource>,
    pub extension: BTreeSet<Extension>,
    pub trust_account: BTreeSet<TrustAccount>,
    pub trust_external: BTreeSet<TrustExternal>,
    pub strategy: Vec<LegacyStrategy>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LegacyElasticsearchTopology {
    pub id: String,
    pub instance_configuration_id: Option<String>,
    pub size: Option<String>,
    pub size_resource: Option<String>,
    pub zone_count: Option<i32>,
    pub node_type_data: Option<String>,
    pub node_type_master: Option<String>,
    pub node_type_ingest: Option<String>,
    pub node_type_ml: Option<String>,
    pub node_roles: BTreeSet<String>,
    pub autoscaling: Vec<ElasticsearchAutoscaling>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LegacyStrategy {
    #[serde(rename = "type")]
    pub strategy_type: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LegacyStateless {
    pub elasticsearch_cluster_ref_id: Option<String>,
    pub ref_id: Option<String>,
    pub resource_id: Option<String>,
    pub region: Option<String>,
    pub http_endpoint: Option<String>,
    pub https_endpoint: Option<String>,
    pub topology: Vec<LegacyStatelessTopology>,
    pub config: Vec<StatelessConfig>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LegacyStatelessTopology {
    pub instance_configuration_id: Option<String>,
    pub size: Option<String>,
    pub size_resource: Option<String>,
    pub zone_count: Option<i32>,
}

impl From<LegacyDeployment> for Deployment {
    fn from(legacy: LegacyDeployment) -> Self {
        Self {
            id: legacy.id,
            alias: legacy.alias,
            version: legacy.version,
            region: legacy.region,
            deployment_template_id: legacy.deployment_template_id,
            name: legacy.name,
            elasticsearch_username: legacy.elasticsearch_username,
            elasticsearch_password: legacy.elasticsearch_password,
            apm_secret_token: legacy.apm_secret_token,
            traffic_filter: legacy.traffic_filter,
            tags: legacy.tags,
            elasticsearch: legacy.elasticsearch.into_iter().next().map(Elasticsearch::from),
            kibana: legacy.kibana.into_iter().next().map(StatelessResource::from),
            apm: legacy.apm.into_iter().next().map(StatelessResource::from),
            integrations_server: legacy
                .integrations_server
                .into_iter()
                .next()
                .map(|resource| IntegrationsServer {
                    resource: resource.into(),
                    endpoints: None,
                }),
            enterprise_search: legacy
                .enterprise_search
                .into_iter()
                .next()
                .map(|resource| EnterpriseSearch {
                    resource: resource.into(),
                    ..Default::default()
                }),
            observability: legacy.observability.into_iter().next(),
        }
    }
}

impl From<LegacyElasticsearch> for Elasticsearch {
    fn from(legacy: LegacyElasticsearch) -> Self {
        let mut es = Self {
            autoscale: legacy.autoscale.and_then(|autoscale| autoscale.parse().ok()),
            ref_id: legacy.ref_id,
            resource_id: legacy.resource_id,
            region: legacy.region,
            cloud_id: legacy.cloud_id,
            http_endpoint: legacy.http_endpoint,
            https_endpoint: legacy.https_endpoint,
            config: legacy.config.into_iter().next(),
            remote_cluster: legacy.remote_cluster,
            snapshot_source: legacy.snapshot_source.into_iter().next(),
            extension: legacy.extension,
            trust_account: legacy.trust_account,
            trust_external: legacy.trust_external,
            strategy: legacy
                .strategy
                .into_iter()
                .next()
                .map(|strategy| strategy.strategy_type),
            ..Default::default()
        };

        for topology in legacy.topology {
            let Some(tier) = Tier::from_topology_id(&topology.id) else {
                warn!(id = %topology.id, "dropping topology element without a tier");
                continue;
            };
            *es.tier_mut(tier) = Some(topology.into());
        }

        es
    }
}

impl From<LegacyElasticsearchTopology> for ElasticsearchTopology {
    fn from(legacy: LegacyElasticsearchTopology) -> Self {
        Self {
            instance_configuration_id: legacy.instance_configuration_id,
            instance_configuration_version: None,
            size: legacy.size,
            size_resource: legacy.size_resource,
            zone_count: legacy.zone_count,
            node_type_data: legacy.node_type_data,
            node_type_master: legacy.node_type_master,
            node_type_ingest: legacy.node_type_ingest,
            node_type_ml: legacy.node_type_ml,
            node_roles: legacy.node_roles,
            autoscaling: legacy.autoscaling.into_iter().next(),
        }
    }
}

impl From<LegacyStateless> for StatelessResource {
    fn from(legacy: LegacyStateless) -> Self {
        let topology = legacy.topology.into_iter().next().unwrap_or_default();

        Self {
            elasticsearch_cluster_ref_id: legacy.elasticsearch_cluster_ref_id,
            ref_id: legacy.ref_id,
            resource_id: legacy.resource_id,
            region: legacy.region,
            http_endpoint: legacy.http_endpoint,
            https_endpoint: legacy.https_endpoint,
            instance_configuration_id: topology.instance_configuration_id,
            instance_configuration_version: None,
            size: topology.size,
            size_resource: topology.size_resource,
            zone_count: topology.zone_count,
            config: legacy.config.into_iter().next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn upgrades_list_layout() {
        let legacy: LegacyDeployment = serde_json::from_str(indoc! {r#"
            {
              "id": "123b7b540dfc967a7a649c18e2fce4ed",
              "version": "7.9.2",
              "deployment_template_id": "aws-io-optimized-v2",
              "region": "us-east-1",
              "traffic_filter": ["0.0.0.0/0"],
              "elasticsearch": [{
                "autoscale": "false",
                "ref_id": "main-elasticsearch",
                "topology": [
                  {
                    "id": "hot_content",
                    "size": "8g",
                    "zone_count": 2,
                    "node_type_data": "true",
                    "node_type_master": "true"
                  },
                  { "id": "warm", "size": "4g", "autoscaling": [{ "max_size": "15g" }] },
                  { "id": "unknown", "size": "1g" }
                ],
                "strategy": [{ "type": "rolling_all" }]
              }],
              "kibana": [{
                "ref_id": "main-kibana",
                "topology": [{
                  "instance_configuration_id": "aws.kibana.r5d",
                  "size": "1g",
                  "zone_count": 1
                }]
              }],
              "enterprise_search": [],
              "observability": [{ "deployment_id": "self", "logs": true, "metrics": true }]
            }
        "#})
        .expect("valid legacy state");

        let deployment = Deployment::from(legacy);

        let es = deployment.elasticsearch.expect("elasticsearch");
        assert_eq!(es.autoscale, Some(false));
        assert_eq!(es.strategy.as_deref(), Some("rolling_all"));
        let hot = es.hot.expect("hot tier");
        assert_eq!(hot.size.as_deref(), Some("8g"));
        assert!(hot.has_node_type());
        let warm = es.warm.expect("warm tier");
        assert_eq!(
            warm.autoscaling.and_then(|autoscaling| autoscaling.max_size).as_deref(),
            Some("15g")
        );
        assert_eq!(es.cold, None);

        let kibana = deployment.kibana.expect("kibana");
        assert_eq!(kibana.instance_configuration_id.as_deref(), Some("aws.kibana.r5d"));
        assert_eq!(kibana.zone_count, Some(1));
        assert_eq!(deployment.enterprise_search, None);
        assert!(deployment.observability.is_some_and(|observability| observability.is_self()));
        assert_eq!(deployment.traffic_filter.len(), 1);
    }
}
