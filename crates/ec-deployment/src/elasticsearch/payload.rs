use ec_api::models::{
    AccountTrustRelationship, AutodetectStrategyConfig, DeploymentTemplate,
    ElasticsearchClusterTopologyElement, ElasticsearchClusterTrustSettings,
    ElasticsearchConfiguration, ElasticsearchPayload, ElasticsearchUserBundle,
    ElasticsearchUserPlugin, ExternalTrustRelationship, GrowShrinkStrategyConfig, PlanStrategy,
    ResourceKind, RestoreSnapshotConfiguration, RollingGrowShrinkStrategyConfig,
    RollingStrategyConfig,
};
use strum::VariantNames;
use tracing::debug;

use crate::{
    diagnostics::{Diagnostic, Diagnostics},
    elasticsearch::{
        Elasticsearch, ElasticsearchAutoscaling, ElasticsearchConfig, ElasticsearchTopology,
        ExtensionType, SnapshotSource, Strategy, Tier,
    },
    node_roles, size, topology,
    user_settings::{non_empty, parse_json},
};

/// Rolling plan changes group by this value to restart all instances at once.
pub const ROLLING_GROUP_BY_ALL: &str = "__all__";

/// Deployment wide inputs of [`elasticsearch_payload`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PayloadOptions<'a> {
    pub template_id: &'a str,
    pub version: &'a str,
    pub region: &'a str,
    /// Whether topology elements are described by node roles instead of the
    /// legacy node types.
    pub use_node_roles: bool,
    /// Leaves the topology out of the payload so the API keeps the current one.
    pub skip_topology: bool,
}

/// Builds the Elasticsearch payload from the template default and the
/// configured resource. Returns [`None`] when Elasticsearch is not configured.
pub fn elasticsearch_payload(
    es: Option<&Elasticsearch>,
    template: &DeploymentTemplate,
    options: PayloadOptions<'_>,
) -> Result<Option<ElasticsearchPayload>, Diagnostics> {
    let Some(es) = es else {
        return Ok(None);
    };
    let Some(template_payload) = template.elasticsearch() else {
        return Err(topology::missing_template_slot(ResourceKind::Elasticsearch).into());
    };

    let mut payload = enrich_template(template_payload.clone(), options);
    let mut diags = Diagnostics::new();

    if let Some(ref_id) = non_empty(es.ref_id.as_ref()) {
        payload.ref_id = Some(ref_id);
    }
    if !options.region.is_empty() {
        payload.region = Some(options.region.to_owned());
    }

    if options.skip_topology {
        debug!("deployment template changed, leaving out the elasticsearch topology");
        payload.plan.cluster_topology.clear();
    } else {
        for (tier, topology) in es.tiers() {
            diags.collect(topology_payload(
                tier,
                topology,
                &mut payload.plan.cluster_topology,
                options.use_node_roles,
            ));
        }
        node_roles::strip_redundant_roles(&mut payload.plan.cluster_topology);
    }

    if let Some(config) = &es.config {
        diags.collect(config_payload(config, &mut payload.plan.elasticsearch));
    }
    extensions_payload(es, &mut payload.plan.elasticsearch);

    // Curation was replaced by index lifecycle management and is rejected by
    // newer versions.
    payload.plan.elasticsearch.curation = None;
    if let Some(settings) = &mut payload.settings {
        settings.curation = None;
    }

    if let Some(autoscale) = es.autoscale {
        payload.plan.autoscaling_enabled = Some(autoscale);
    }

    trust_payload(es, &mut payload);

    if let Some(snapshot_source) = &es.snapshot_source {
        payload
            .plan
            .transient
            .get_or_insert_with(Default::default)
            .restore_snapshot = Some(restore_snapshot_payload(snapshot_source));
    }

    if let Some(strategy) = non_empty(es.strategy.as_ref()) {
        match strategy_payload(&strategy) {
            Ok(strategy) => {
                payload
                    .plan
                    .transient
                    .get_or_insert_with(Default::default)
                    .strategy = Some(strategy);
            }
            Err(diag) => diags.push(diag),
        }
    }

    diags.into_result()?;
    Ok(Some(payload))
}

/// Fills the template default with the deployment wide settings and strips
/// the node representation that is not in use.
fn enrich_template(
    mut payload: ElasticsearchPayload,
    options: PayloadOptions<'_>,
) -> ElasticsearchPayload {
    let reference = payload
        .plan
        .deployment_template
        .get_or_insert_with(Default::default);
    if reference.id.as_deref().is_none_or(str::is_empty) {
        reference.id = Some(options.template_id.to_owned());
    }

    if !options.version.is_empty() {
        payload.plan.elasticsearch.version = Some(options.version.to_owned());
    }

    for element in &mut payload.plan.cluster_topology {
        if options.use_node_roles {
            element.node_type = None;
        } else {
            element.node_roles.clear();
        }
    }

    payload
}

fn topology_payload(
    tier: Tier,
    topology: &ElasticsearchTopology,
    candidates: &mut [ElasticsearchClusterTopologyElement],
    use_node_roles: bool,
) -> Result<(), Diagnostics> {
    let path = format!("elasticsearch.{tier}");

    let index = topology::match_topology_index(tier.topology_id(), candidates).map_err(|err| {
        Diagnostics::from(Diagnostic::error("elasticsearch topology payload error", err).at(&path))
    })?;
    let element = &mut candidates[index];
    let mut diags = Diagnostics::new();

    if let Some(id) = non_empty(topology.instance_configuration_id.as_ref()) {
        element.instance_configuration_id = id;
    }
    if let Some(version) = topology.instance_configuration_version {
        element.instance_configuration_version = Some(version);
    }

    match size::parse_size(topology.size.as_deref(), topology.size_resource.as_deref()) {
        Ok(Some(size)) => element.size = Some(size),
        Ok(None) => {}
        Err(err) => diags.push(Diagnostic::error("invalid size", err).at(format!("{path}.size"))),
    }

    if let Some(zone_count) = topology.zone_count.filter(|zone_count| *zone_count > 0) {
        element.zone_count = zone_count;
    }

    diags.collect(node_roles::apply_node_settings(
        element,
        topology,
        use_node_roles,
        &path,
    ));

    if let Some(autoscaling) = &topology.autoscaling {
        diags.collect(autoscaling_payload(
            autoscaling,
            element,
            &format!("{path}.autoscaling"),
        ));
    }

    diags.into_result()
}

/// Applies configured autoscaling bounds. Bounds which are not configured keep
/// the template value, so empty bounds are never sent as zero.
fn autoscaling_payload(
    autoscaling: &ElasticsearchAutoscaling,
    element: &mut ElasticsearchClusterTopologyElement,
    path: &str,
) -> Result<(), Diagnostics> {
    let mut diags = Diagnostics::new();

    let bounds = [
        (
            "min_size",
            &autoscaling.min_size,
            &autoscaling.min_size_resource,
            &mut element.autoscaling_min,
        ),
        (
            "max_size",
            &autoscaling.max_size,
            &autoscaling.max_size_resource,
            &mut element.autoscaling_max,
        ),
    ];
    for (field, size, resource, target) in bounds {
        match size::parse_size(size.as_deref(), resource.as_deref()) {
            Ok(Some(size)) => *target = Some(size),
            Ok(None) => {}
            Err(err) => {
                diags.push(Diagnostic::error("invalid size", err).at(format!("{path}.{field}")));
            }
        }
    }

    match parse_json(
        autoscaling.policy_override_json.as_deref(),
        &format!("{path}.policy_override_json"),
    ) {
        Ok(Some(policy)) => element.autoscaling_policy_override_json = Some(policy),
        Ok(None) => {}
        Err(diag) => diags.push(diag),
    }

    diags.into_result()
}

fn config_payload(
    config: &ElasticsearchConfig,
    configuration: &mut ElasticsearchConfiguration,
) -> Result<(), Diagnostics> {
    let mut diags = Diagnostics::new();

    configuration.enabled_built_in_plugins = config.plugins.iter().cloned().collect();

    if let Some(docker_image) = non_empty(config.docker_image.as_ref()) {
        configuration.docker_image = Some(docker_image);
    }
    if let Some(yaml) = non_empty(config.user_settings_yaml.as_ref()) {
        configuration.user_settings_yaml = Some(yaml);
    }
    if let Some(yaml) = non_empty(config.user_settings_override_yaml.as_ref()) {
        configuration.user_settings_override_yaml = Some(yaml);
    }

    let json_settings = [
        (
            "elasticsearch.config.user_settings_json",
            &config.user_settings_json,
            &mut configuration.user_settings_json,
        ),
        (
            "elasticsearch.config.user_settings_override_json",
            &config.user_settings_override_json,
            &mut configuration.user_settings_override_json,
        ),
    ];
    for (path, value, target) in json_settings {
        match parse_json(value.as_deref(), path) {
            Ok(Some(value)) => *target = Some(value),
            Ok(None) => {}
            Err(diag) => diags.push(diag),
        }
    }

    diags.into_result()
}

fn extensions_payload(es: &Elasticsearch, configuration: &mut ElasticsearchConfiguration) {
    configuration.user_bundles.clear();
    configuration.user_plugins.clear();

    for extension in &es.extension {
        match extension.extension_type {
            ExtensionType::Bundle => configuration.user_bundles.push(ElasticsearchUserBundle {
                name: Some(extension.name.clone()),
                elasticsearch_version: Some(extension.version.clone()),
                url: Some(extension.url.clone()),
            }),
            ExtensionType::Plugin => configuration.user_plugins.push(ElasticsearchUserPlugin {
                name: Some(extension.name.clone()),
                elasticsearch_version: Some(extension.version.clone()),
                url: Some(extension.url.clone()),
            }),
        }
    }
}

fn trust_payload(es: &Elasticsearch, payload: &mut ElasticsearchPayload) {
    if es.trust_account.is_empty() && es.trust_external.is_empty() {
        return;
    }

    let trust = ElasticsearchClusterTrustSettings {
        accounts: es
            .trust_account
            .iter()
            .map(|account| AccountTrustRelationship {
                account_id: Some(account.account_id.clone()),
                trust_all: account.trust_all,
                trust_allowlist: account.trust_allowlist.iter().cloned().collect(),
            })
            .collect(),
        external: es
            .trust_external
            .iter()
            .map(|external| ExternalTrustRelationship {
                trust_relationship_id: Some(external.relationship_id.clone()),
                trust_all: external.trust_all,
                trust_allowlist: external.trust_allowlist.iter().cloned().collect(),
            })
            .collect(),
    };

    payload.settings.get_or_insert_with(Default::default).trust = Some(trust);
}

fn restore_snapshot_payload(snapshot_source: &SnapshotSource) -> RestoreSnapshotConfiguration {
    let snapshot_name = match snapshot_source.snapshot_name.as_str() {
        "" => SnapshotSource::LATEST_SUCCESSFUL,
        name => name,
    };

    RestoreSnapshotConfiguration {
        source_cluster_id: Some(snapshot_source.source_elasticsearch_cluster_id.clone()),
        snapshot_name: Some(snapshot_name.to_owned()),
        strategy: None,
    }
}

fn strategy_payload(strategy: &str) -> Result<PlanStrategy, Diagnostic> {
    let parsed: Strategy = strategy.parse().map_err(|_| {
        Diagnostic::error(
            "invalid strategy",
            format!(
                "{strategy:?} is not one of {}",
                Strategy::VARIANTS.join(", ")
            ),
        )
        .at("elasticsearch.strategy")
    })?;

    let mut payload = PlanStrategy::default();
    match parsed {
        Strategy::Autodetect => payload.autodetect = Some(AutodetectStrategyConfig {}),
        Strategy::GrowAndShrink => payload.grow_and_shrink = Some(GrowShrinkStrategyConfig {}),
        Strategy::RollingGrowAndShrink => {
            payload.rolling_grow_and_shrink = Some(RollingGrowShrinkStrategyConfig {});
        }
        Strategy::RollingAll => {
            payload.rolling = Some(RollingStrategyConfig {
                group_by: Some(ROLLING_GROUP_BY_ALL.to_owned()),
            });
        }
    }
    Ok(payload)
}
