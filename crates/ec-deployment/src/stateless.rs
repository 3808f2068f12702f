//! Reader and payload builder shared by Kibana, APM, Enterprise Search and
//! Integrations Server.
//!
//! These kinds run a single topology element sized from the template, so
//! their state flattens the topology into the resource itself.

use ec_api::models::{
    ResourceKind, StatelessConfiguration, StatelessPayload, StatelessPlan, StatelessResourceInfo,
    StatelessTopologyElement,
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

use crate::{
    diagnostics::{Diagnostic, Diagnostics},
    endpoints::Endpoints,
    size,
    topology::{self, ProductMinimums},
    user_settings::{non_empty, parse_json},
};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to serialize {kind} {field}"))]
    SerializeJson {
        source: serde_json::Error,
        kind: ResourceKind,
        field: &'static str,
    },
}

/// Persisted state of a stateless resource.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct StatelessResource {
    pub elasticsearch_cluster_ref_id: Option<String>,
    pub ref_id: Option<String>,
    pub resource_id: Option<String>,
    pub region: Option<String>,
    pub http_endpoint: Option<String>,
    pub https_endpoint: Option<String>,

    pub instance_configuration_id: Option<String>,
    pub instance_configuration_version: Option<i32>,
    pub size: Option<String>,
    pub size_resource: Option<String>,
    pub zone_count: Option<i32>,

    pub config: Option<StatelessConfig>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct StatelessConfig {
    pub docker_image: Option<String>,
    /// Only used by APM and Integrations Server.
    pub debug_enabled: Option<bool>,
    pub user_settings_json: Option<String>,
    pub user_settings_override_json: Option<String>,
    pub user_settings_yaml: Option<String>,
    pub user_settings_override_yaml: Option<String>,
}

impl StatelessConfig {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn supports_debug(kind: ResourceKind) -> bool {
    matches!(kind, ResourceKind::Apm | ResourceKind::IntegrationsServer)
}

/// Returns the first resource that runs a plan.
pub fn first_running<P>(
    resources: &[StatelessResourceInfo<P>],
) -> Option<&StatelessResourceInfo<P>> {
    resources
        .iter()
        .find(|resource| resource.current_plan().is_some() && !resource.is_stopped())
}

/// Returns the first sized topology element of a plan.
pub fn sized_topology<P: StatelessPlan>(plan: &P) -> Option<&StatelessTopologyElement> {
    plan.cluster_topology()
        .iter()
        .find(|element| element.size_value() > 0)
}

pub fn read_stateless<P: StatelessPlan>(
    resources: &[StatelessResourceInfo<P>],
) -> Result<Option<StatelessResource>> {
    first_running(resources).map(read_resource).transpose()
}

pub fn read_resource<P: StatelessPlan>(
    resource: &StatelessResourceInfo<P>,
) -> Result<StatelessResource> {
    let info = resource.info.as_ref();
    let endpoints = Endpoints::from_metadata(info.and_then(|info| info.metadata.as_ref()));

    let mut state = StatelessResource {
        elasticsearch_cluster_ref_id: resource.elasticsearch_cluster_ref_id.clone(),
        ref_id: resource.ref_id.clone(),
        resource_id: info.and_then(|info| info.cluster_id.clone()),
        region: resource.region.clone(),
        http_endpoint: endpoints.http,
        https_endpoint: endpoints.https,
        ..Default::default()
    };

    let Some(plan) = resource.current_plan() else {
        return Ok(state);
    };

    if let Some(element) = sized_topology(plan) {
        let (size, size_resource) = size::size_to_state(element.size.as_ref());
        state.instance_configuration_id = non_empty(Some(&element.instance_configuration_id));
        state.instance_configuration_version = element.instance_configuration_version;
        state.size = size;
        state.size_resource = size_resource;
        state.zone_count = Some(element.zone_count);
    }

    state.config = read_config(P::KIND, plan.configuration())?;
    Ok(state)
}

fn read_config(
    kind: ResourceKind,
    configuration: &StatelessConfiguration,
) -> Result<Option<StatelessConfig>> {
    let json = |value: Option<&serde_json::Value>, field| {
        value
            .map(serde_json::to_string)
            .transpose()
            .context(SerializeJsonSnafu { kind, field })
    };

    let config = StatelessConfig {
        docker_image: configuration.docker_image.clone(),
        debug_enabled: configuration
            .system_settings
            .as_ref()
            .and_then(|settings| settings.debug_enabled)
            .filter(|_| supports_debug(kind)),
        user_settings_json: json(configuration.user_settings_json.as_ref(), "user_settings_json")?,
        user_settings_override_json: json(
            configuration.user_settings_override_json.as_ref(),
            "user_settings_override_json",
        )?,
        user_settings_yaml: configuration.user_settings_yaml.clone(),
        user_settings_override_yaml: configuration.user_settings_override_yaml.clone(),
    };

    Ok(Some(config).filter(|config| !config.is_empty()))
}

/// Builds the payload of a stateless resource from the template default.
///
/// Returns [`None`] when the resource is not configured. The configured
/// instance configuration selects the template element, the first element is
/// used when none is configured. Template sizes are raised to the product
/// floors before configured values are applied.
pub fn stateless_payload<P: StatelessPlan>(
    resource: Option<&StatelessResource>,
    template: Option<&StatelessPayload<P>>,
    region: &str,
) -> Result<Option<StatelessPayload<P>>, Diagnostics> {
    let Some(resource) = resource else {
        return Ok(None);
    };
    let Some(template) = template else {
        return Err(topology::missing_template_slot(P::KIND).into());
    };

    let kind = P::KIND;
    let mut payload = template.clone();
    let mut diags = Diagnostics::new();

    if let Some(ref_id) = non_empty(resource.elasticsearch_cluster_ref_id.as_ref()) {
        payload.elasticsearch_cluster_ref_id = Some(ref_id);
    }
    if let Some(ref_id) = non_empty(resource.ref_id.as_ref()) {
        payload.ref_id = Some(ref_id);
    }
    if !region.is_empty() {
        payload.region = Some(region.to_owned());
    }

    match topology_payload(kind, resource, payload.plan.cluster_topology()) {
        Ok(element) => *payload.plan.cluster_topology_mut() = vec![element],
        Err(diag) => diags.append(diag),
    }

    if let Some(config) = &resource.config {
        diags.collect(config_payload(kind, config, payload.plan.configuration_mut()));
    }

    diags.into_result()?;
    Ok(Some(payload))
}

fn topology_payload(
    kind: ResourceKind,
    resource: &StatelessResource,
    candidates: &[StatelessTopologyElement],
) -> Result<StatelessTopologyElement, Diagnostics> {
    let id = resource.instance_configuration_id.as_deref().unwrap_or_default();
    let mut element = topology::match_topology_or_position(id, 0, candidates)
        .map_err(|err| {
            Diagnostics::from(
                Diagnostic::error(format!("{kind} topology payload error"), err)
                    .at(format!("{kind}.instance_configuration_id")),
            )
        })?
        .clone();

    if let Some(minimums) = kind.minimums() {
        topology::apply_minimums(&mut element.size, &mut element.zone_count, minimums);
    }

    if let Some(version) = resource.instance_configuration_version {
        element.instance_configuration_version = Some(version);
    }

    let size = size::parse_size(resource.size.as_deref(), resource.size_resource.as_deref())
        .map_err(|err| {
            Diagnostics::from(Diagnostic::error("invalid size", err).at(format!("{kind}.size")))
        })?;
    if let Some(size) = size {
        element.size = Some(size);
    }

    if let Some(zone_count) = resource.zone_count.filter(|zone_count| *zone_count > 0) {
        element.zone_count = zone_count;
    }

    Ok(element)
}

fn config_payload(
    kind: ResourceKind,
    config: &StatelessConfig,
    configuration: &mut StatelessConfiguration,
) -> Result<(), Diagnostics> {
    let mut diags = Diagnostics::new();

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
            "user_settings_json",
            &config.user_settings_json,
            &mut configuration.user_settings_json,
        ),
        (
            "user_settings_override_json",
            &config.user_settings_override_json,
            &mut configuration.user_settings_override_json,
        ),
    ];
    for (field, value, target) in json_settings {
        match parse_json(value.as_deref(), &format!("{kind}.config.{field}")) {
            Ok(Some(value)) => *target = Some(value),
            Ok(None) => {}
            Err(diag) => diags.push(diag),
        }
    }

    if let Some(debug_enabled) = config.debug_enabled.filter(|_| supports_debug(kind)) {
        configuration
            .system_settings
            .get_or_insert_with(Default::default)
            .debug_enabled = Some(debug_enabled);
    }

    diags.into_result()
}

#[cfg(test)]
mod tests {
    use ec_api::models::{ApmPayload, ApmPlan, ApmResourceInfo, KibanaPayload, TopologySize};
    use indoc::indoc;
    use rstest::rstest;

    use super::*;

    fn kibana_template() -> KibanaPayload {
        serde_yaml::from_str(indoc! {"
            elasticsearch_cluster_ref_id: es-ref-id
            ref_id: kibana-ref-id
            region: us-east-1
            plan:
              kibana: {}
              cluster_topology:
                - instance_configuration_id: aws.kibana.r5d
                  size:
                    value: 0
                    resource: memory
                  zone_count: 0
                - instance_configuration_id: aws.kibana.c5d
                  size:
                    value: 2048
                    resource: memory
                  zone_count: 2
        "})
        .expect("valid kibana template")
    }

    #[test]
    fn defaults_are_raised_to_minimums() {
        let payload = stateless_payload(
            Some(&StatelessResource::default()),
            Some(&kibana_template()),
            "us-east-1",
        )
        .expect("valid payload")
        .expect("configured");

        assert_eq!(payload.elasticsearch_cluster_ref_id.as_deref(), Some("es-ref-id"));
        let topology = payload.plan.cluster_topology();
        assert_eq!(topology.len(), 1);
        assert_eq!(topology[0].instance_configuration_id, "aws.kibana.r5d");
        assert_eq!(topology[0].size, Some(TopologySize::memory(1024)));
        assert_eq!(topology[0].zone_count, 1);
    }

    #[test]
    fn configured_values_win() {
        let resource = StatelessResource {
            elasticsearch_cluster_ref_id: Some("main-elasticsearch".to_owned()),
            ref_id: Some("main-kibana".to_owned()),
            instance_configuration_id: Some("aws.kibana.c5d".to_owned()),
            size: Some("4g".to_owned()),
            zone_count: Some(3),
            ..Default::default()
        };

        let payload = stateless_payload(Some(&resource), Some(&kibana_template()), "us-east-1")
            .expect("valid payload")
            .expect("configured");

        assert_eq!(payload.ref_id.as_deref(), Some("main-kibana"));
        assert_eq!(payload.elasticsearch_cluster_ref_id.as_deref(), Some("main-elasticsearch"));
        let element = &payload.plan.cluster_topology()[0];
        assert_eq!(element.instance_configuration_id, "aws.kibana.c5d");
        assert_eq!(element.size, Some(TopologySize::memory(4096)));
        assert_eq!(element.zone_count, 3);
    }

    #[rstest]
    #[case::unknown_instance_configuration(
        StatelessResource {
            instance_configuration_id: Some("aws.kibana.x".to_owned()),
            ..Default::default()
        },
        "kibana.instance_configuration_id"
    )]
    #[case::invalid_size(
        StatelessResource { size: Some("big".to_owned()), ..Default::default() },
        "kibana.size"
    )]
    #[case::invalid_json(
        StatelessResource {
            config: Some(StatelessConfig {
                user_settings_json: Some("{".to_owned()),
                ..Default::default()
            }),
            ..Default::default()
        },
        "kibana.config.user_settings_json"
    )]
    fn invalid_configuration(#[case] resource: StatelessResource, #[case] path: &str) {
        let diags = stateless_payload(Some(&resource), Some(&kibana_template()), "")
            .expect_err("invalid configuration");
        assert_eq!(diags.iter().next().and_then(|diag| diag.path.as_deref()), Some(path));
    }

    #[test]
    fn missing_template_slot() {
        let diags = stateless_payload::<ApmPlan>(Some(&StatelessResource::default()), None, "")
            .expect_err("no template");
        assert!(
            diags
                .to_string()
                .contains("apm specified but deployment template is not configured for it")
        );
        assert_eq!(stateless_payload::<ApmPlan>(None, None, ""), Ok(None));
    }

    #[test]
    fn debug_setting_only_for_supporting_kinds() {
        let resource = StatelessResource {
            config: Some(StatelessConfig {
                debug_enabled: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        let apm_template: ApmPayload = serde_yaml::from_str(indoc! {"
            plan:
              apm: {}
              cluster_topology:
                - instance_configuration_id: aws.apm.r5d
                  size:
                    value: 512
                  zone_count: 1
        "})
        .expect("valid apm template");

        let apm = stateless_payload(Some(&resource), Some(&apm_template), "")
            .expect("valid payload")
            .expect("configured");
        let kibana = stateless_payload(Some(&resource), Some(&kibana_template()), "")
            .expect("valid payload")
            .expect("configured");

        assert_eq!(
            apm.plan.configuration().system_settings.as_ref().and_then(|s| s.debug_enabled),
            Some(true)
        );
        assert_eq!(kibana.plan.configuration().system_settings, None);
    }

    #[test]
    fn read_first_running_resource() {
        let resources: Vec<ApmResourceInfo> = serde_yaml::from_str(indoc! {"
            - ref_id: stopped-apm
              info:
                id: apm-0
                status: stopped
            - ref_id: main-apm
              elasticsearch_cluster_ref_id: main-elasticsearch
              region: us-east-1
              info:
                id: apm-1
                status: started
                metadata:
                  endpoint: apm.example.com
                  ports:
                    https: 443
                plan_info:
                  current:
                    plan:
                      apm:
                        version: 8.4.3
                        system_settings:
                          debug_enabled: false
                      cluster_topology:
                        - instance_configuration_id: aws.apm.r5d
                          size:
                            value: 0
                            resource: memory
                          zone_count: 1
                        - instance_configuration_id: aws.apm.c5d
                          size:
                            value: 1024
                            resource: memory
                          zone_count: 2
        "})
        .expect("valid resources");

        let apm = read_stateless(&resources).expect("readable").expect("running apm");
        assert_eq!(apm.ref_id.as_deref(), Some("main-apm"));
        assert_eq!(apm.resource_id.as_deref(), Some("apm-1"));
        assert_eq!(apm.https_endpoint.as_deref(), Some("https://apm.example.com:443"));
        assert_eq!(apm.http_endpoint, None);
        assert_eq!(apm.instance_configuration_id.as_deref(), Some("aws.apm.c5d"));
        assert_eq!(apm.size.as_deref(), Some("1g"));
        assert_eq!(apm.zone_count, Some(2));
        assert_eq!(apm.config.and_then(|config| config.debug_enabled), Some(false));
    }
}
