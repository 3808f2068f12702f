use std::collections::BTreeSet;

use ec_api::models::{
    ElasticsearchClusterPlan, ElasticsearchClusterSettings, ElasticsearchClusterTopologyElement,
    ElasticsearchConfiguration, ElasticsearchResourceInfo, RemoteResources, TopologySize,
};
use snafu::{OptionExt, ResultExt, Snafu};
use tracing::debug;

use crate::{
    elasticsearch::{
        Elasticsearch, ElasticsearchAutoscaling, ElasticsearchConfig, ElasticsearchTopology,
        Extension, ExtensionType, RemoteCluster, Tier, TrustAccount, TrustExternal,
    },
    endpoints::Endpoints,
    node_roles, size,
};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("elasticsearch topology {id:?} does not map to a known tier"))]
    UnknownTier { id: String },

    #[snafu(display("failed to serialize {field}"))]
    SerializeJson {
        source: serde_json::Error,
        field: &'static str,
    },

    #[snafu(display("{extension_type} extension is missing its {field}"))]
    MissingExtensionField {
        extension_type: ExtensionType,
        field: &'static str,
    },
}

/// Reads the first running Elasticsearch resource which has a current plan.
pub fn read_elasticsearches(
    resources: &[ElasticsearchResourceInfo],
    remotes: Option<&RemoteResources>,
) -> Result<Option<Elasticsearch>> {
    for resource in resources {
        if resource.current_plan().is_none() || resource.is_stopped() {
            continue;
        }
        return read_elasticsearch(resource, remotes).map(Some);
    }
    Ok(None)
}

pub fn read_elasticsearch(
    resource: &ElasticsearchResourceInfo,
    remotes: Option<&RemoteResources>,
) -> Result<Elasticsearch> {
    let info = resource.info.as_ref();
    let plan = resource.current_plan().cloned().unwrap_or_default();
    let metadata = info.and_then(|info| info.metadata.as_ref());
    let endpoints = Endpoints::from_metadata(metadata);

    let mut es = Elasticsearch {
        autoscale: plan.autoscaling_enabled,
        ref_id: resource.ref_id.clone(),
        resource_id: info.and_then(|info| info.cluster_id.clone()),
        region: resource.region.clone(),
        cloud_id: metadata.and_then(|metadata| metadata.cloud_id.clone()),
        http_endpoint: endpoints.http,
        https_endpoint: endpoints.https,
        config: read_config(&plan.elasticsearch)?,
        extension: read_extensions(&plan.elasticsearch)?,
        remote_cluster: remotes.map(read_remote_clusters).unwrap_or_default(),
        ..Default::default()
    };

    read_topologies(&plan, &mut es)?;

    if let Some(settings) = info.and_then(|info| info.settings.as_ref()) {
        read_trust(settings, &mut es);
    }

    Ok(es)
}

/// Returns whether a topology element describes a real node group rather than
/// a template placeholder.
pub fn is_potentially_sized(
    element: &ElasticsearchClusterTopologyElement,
    autoscaling: bool,
) -> bool {
    let sized = |size: Option<&TopologySize>| size.is_some_and(|size| size.value_or_zero() > 0);
    sized(element.size.as_ref()) || (autoscaling && sized(element.autoscaling_max.as_ref()))
}

fn read_topologies(plan: &ElasticsearchClusterPlan, es: &mut Elasticsearch) -> Result<()> {
    let autoscaling = plan.autoscaling_enabled.unwrap_or_default();

    for element in &plan.cluster_topology {
        if !is_potentially_sized(element, autoscaling) {
            debug!(id = %element.id, "skipping unsized topology element");
            continue;
        }

        let tier = Tier::from_topology_id(&element.id).context(UnknownTierSnafu {
            id: element.id.clone(),
        })?;
        *es.tier_mut(tier) = Some(read_topology(element)?);
    }

    Ok(())
}

fn read_topology(element: &ElasticsearchClusterTopologyElement) -> Result<ElasticsearchTopology> {
    let (size, size_resource) = size::size_to_state(element.size.as_ref());

    let mut topology = ElasticsearchTopology {
        instance_configuration_id: Some(element.instance_configuration_id.clone())
            .filter(|id| !id.is_empty()),
        instance_configuration_version: element.instance_configuration_version,
        size,
        size_resource,
        zone_count: Some(element.zone_count),
        autoscaling: read_autoscaling(element)?,
        ..Default::default()
    };
    node_roles::read_node_settings(element, &mut topology);

    Ok(topology)
}

fn read_autoscaling(
    element: &ElasticsearchClusterTopologyElement,
) -> Result<Option<ElasticsearchAutoscaling>> {
    let (min_size, min_size_resource) = size::size_to_state(element.autoscaling_min.as_ref());
    let (max_size, max_size_resource) = size::size_to_state(element.autoscaling_max.as_ref());

    let autoscaling = ElasticsearchAutoscaling {
        min_size,
        min_size_resource,
        max_size,
        max_size_resource,
        policy_override_json: json_to_state(
            element.autoscaling_policy_override_json.as_ref(),
            "policy_override_json",
        )?,
    };

    Ok(Some(autoscaling).filter(|autoscaling| autoscaling != &ElasticsearchAutoscaling::default()))
}

fn json_to_state(value: Option<&serde_json::Value>, field: &'static str) -> Result<Option<String>> {
    value
        .map(serde_json::to_string)
        .transpose()
        .context(SerializeJsonSnafu { field })
}

fn read_config(configuration: &ElasticsearchConfiguration) -> Result<Option<ElasticsearchConfig>> {
    let config = ElasticsearchConfig {
        docker_image: configuration.docker_image.clone(),
        plugins: configuration.enabled_built_in_plugins.iter().cloned().collect(),
        user_settings_json: json_to_state(
            configuration.user_settings_json.as_ref(),
            "user_settings_json",
        )?,
        user_settings_override_json: json_to_state(
            configuration.user_settings_override_json.as_ref(),
            "user_settings_override_json",
        )?,
        user_settings_yaml: configuration.user_settings_yaml.clone(),
        user_settings_override_yaml: configuration.user_settings_override_yaml.clone(),
    };

    Ok(Some(config).filter(|config| !config.is_empty()))
}

fn read_extensions(configuration: &ElasticsearchConfiguration) -> Result<BTreeSet<Extension>> {
    let bundles = configuration.user_bundles.iter().map(|bundle| {
        extension(
            ExtensionType::Bundle,
            bundle.name.as_ref(),
            bundle.elasticsearch_version.as_ref(),
            bundle.url.as_ref(),
        )
    });
    let plugins = configuration.user_plugins.iter().map(|plugin| {
        extension(
            ExtensionType::Plugin,
            plugin.name.as_ref(),
            plugin.elasticsearch_version.as_ref(),
            plugin.url.as_ref(),
        )
    });

    bundles.chain(plugins).collect()
}

fn extension(
    extension_type: ExtensionType,
    name: Option<&String>,
    version: Option<&String>,
    url: Option<&String>,
) -> Result<Extension> {
    let missing = |field| MissingExtensionFieldSnafu {
        extension_type,
        field,
    };

    Ok(Extension {
        name: name.cloned().context(missing("name"))?,
        extension_type,
        version: version.cloned().context(missing("elasticsearch_version"))?,
        url: url.cloned().context(missing("url"))?,
    })
}

pub fn read_remote_clusters(remotes: &RemoteResources) -> BTreeSet<RemoteCluster> {
    remotes
        .resources
        .iter()
        .map(|remote| RemoteCluster {
            deployment_id: remote.deployment_id.clone().unwrap_or_default(),
            alias: remote.alias.clone().unwrap_or_default(),
            ref_id: remote.elasticsearch_ref_id.clone(),
            skip_unavailable: remote.skip_unavailable,
        })
        .collect()
}

fn read_trust(settings: &ElasticsearchClusterSettings, es: &mut Elasticsearch) {
    let Some(trust) = &settings.trust else {
        return;
    };

    es.trust_account = trust
        .accounts
        .iter()
        .map(|account| TrustAccount {
            account_id: account.account_id.clone().unwrap_or_default(),
            trust_all: account.trust_all,
            trust_allowlist: account.trust_allowlist.iter().cloned().collect(),
        })
        .collect();

    es.trust_external = trust
        .external
        .iter()
        .map(|external| TrustExternal {
            relationship_id: external.trust_relationship_id.clone().unwrap_or_default(),
            trust_all: external.trust_all,
            trust_allowlist: external.trust_allowlist.iter().cloned().collect(),
        })
        .collect();
}
