use ec_api::{
    DeploymentApi,
    models::{
        DeploymentCreateRequest, DeploymentCreateResources, DeploymentCreateSettings,
        DeploymentMetadata, DeploymentObservabilitySettings, DeploymentTemplate,
        DeploymentUpdateRequest, DeploymentUpdateSettings, ElasticsearchPayload, MetadataItem,
        TrafficFilterSettings,
    },
};
use tracing::{debug, instrument};

use crate::{
    apm::apm_payload,
    deployment::Deployment,
    diagnostics::{Diagnostic, Diagnostics},
    elasticsearch::{PayloadOptions, elasticsearch_payload},
    enterprise_search::enterprise_search_payload,
    integrations_server::integrations_server_payload,
    kibana::kibana_payload,
    observability::observability_payload,
    version,
};

/// The restore strategy of updates. A full restore is only possible while
/// creating a deployment.
pub const RESTORE_STRATEGY_PARTIAL: &str = "partial";

/// Builds the request creating `deployment`.
#[instrument(skip_all, fields(template_id = deployment.deployment_template_id.as_deref()))]
pub async fn create_request(
    deployment: &Deployment,
    client: &dyn DeploymentApi,
) -> Result<DeploymentCreateRequest, Diagnostics> {
    let mut diags = Diagnostics::new();
    let template = fetch_template(deployment, client).await?;
    let version = deployment.version.as_deref().unwrap_or_default();

    // Without a version the template default applies, which always supports
    // node roles.
    let use_node_roles = version.is_empty()
        || diags
            .collect(version::compatible_with_node_roles(version).map_err(node_roles_error))
            .unwrap_or_default();

    let options = payload_options(deployment, use_node_roles, false);
    let resources = diags.collect(resources_payload(deployment, &template, options));
    let observability =
        diags.collect(observability_payload(deployment.observability.as_ref(), client).await);

    diags.into_result()?;

    let traffic_filter_settings =
        (!deployment.traffic_filter.is_empty()).then(|| TrafficFilterSettings {
            rulesets: deployment.traffic_filter.iter().cloned().collect(),
        });
    let observability = observability.flatten();
    let settings = (traffic_filter_settings.is_some() || observability.is_some()).then_some(
        DeploymentCreateSettings {
            traffic_filter_settings,
            observability,
        },
    );

    Ok(DeploymentCreateRequest {
        name: deployment.name.clone(),
        alias: deployment.alias.clone(),
        resources: resources.unwrap_or_default(),
        settings,
        metadata: Some(tags_payload(deployment)).filter(|metadata| !metadata.tags.is_empty()),
    })
}

/// Builds the request moving the deployment from `state` to `plan`.
///
/// Resources missing from `plan` are removed by the API. Traffic filters and
/// remote clusters are not part of the request, see [`super::TrafficFilterChanges`]
/// and [`crate::elasticsearch::handle_remote_cluster_changes`].
#[instrument(skip_all, fields(deployment_id = state.id.as_deref()))]
pub async fn update_request(
    plan: &Deployment,
    state: &Deployment,
    client: &dyn DeploymentApi,
) -> Result<DeploymentUpdateRequest, Diagnostics> {
    let mut diags = Diagnostics::new();
    let template = fetch_template(plan, client).await?;

    let plan_version = plan.version.as_deref().unwrap_or_default();
    let state_version = state.version.as_deref().unwrap_or_default();
    let has_node_types = state
        .elasticsearch
        .as_ref()
        .is_some_and(|es| es.has_node_types());

    let gate = || -> Result<bool, version::Error> {
        Ok(version::compatible_with_node_roles(plan_version)?
            && version::legacy_to_node_roles(state_version, plan_version, has_node_types)?)
    };
    let use_node_roles = plan_version.is_empty()
        || diags
            .collect(gate().map_err(node_roles_error))
            .unwrap_or_default();

    let options = payload_options(plan, use_node_roles, template_changed(plan, state));
    let resources = diags.collect(resources_payload(plan, &template, options));
    let observability =
        diags.collect(observability_payload(plan.observability.as_ref(), client).await);

    diags.into_result()?;

    let mut resources = resources.unwrap_or_default();
    for es in &mut resources.elasticsearch {
        ensure_partial_snapshot_strategy(es);
    }

    // Leaving the settings out keeps the current observability, an empty
    // object disables it.
    let observability = match observability.flatten() {
        Some(observability) => Some(observability),
        None if state.observability.is_some() => Some(DeploymentObservabilitySettings::default()),
        None => None,
    };

    Ok(DeploymentUpdateRequest {
        name: plan.name.clone(),
        alias: plan.alias.clone(),
        prune_orphans: true,
        resources,
        settings: observability.map(|observability| DeploymentUpdateSettings {
            observability: Some(observability),
        }),
        // Always sent so removing the last tag clears them.
        metadata: Some(tags_payload(plan)),
    })
}

async fn fetch_template(
    deployment: &Deployment,
    client: &dyn DeploymentApi,
) -> Result<DeploymentTemplate, Diagnostics> {
    let template_id = deployment.deployment_template_id.as_deref().unwrap_or_default();
    let region = deployment.region.as_deref().unwrap_or_default();

    client
        .get_deployment_template(template_id, region, true)
        .await
        .map_err(|err| {
            Diagnostic::error("deployment template get error", err)
                .at("deployment_template_id")
                .into()
        })
}

fn node_roles_error(err: version::Error) -> Diagnostics {
    Diagnostic::error("failed to determine the node roles compatibility", err)
        .at("version")
        .into()
}

/// Returns whether the deployment moves to a different template. The
/// topology of the old template does not apply to the new one.
fn template_changed(plan: &Deployment, state: &Deployment) -> bool {
    match (
        plan.deployment_template_id.as_deref(),
        state.deployment_template_id.as_deref(),
    ) {
        (Some(planned), Some(current)) => {
            !planned.is_empty() && !current.is_empty() && planned != current
        }
        _ => false,
    }
}

fn payload_options(
    deployment: &Deployment,
    use_node_roles: bool,
    skip_topology: bool,
) -> PayloadOptions<'_> {
    PayloadOptions {
        template_id: deployment.deployment_template_id.as_deref().unwrap_or_default(),
        version: deployment.version.as_deref().unwrap_or_default(),
        region: deployment.region.as_deref().unwrap_or_default(),
        use_node_roles,
        skip_topology,
    }
}

fn resources_payload(
    deployment: &Deployment,
    template: &DeploymentTemplate,
    options: PayloadOptions<'_>,
) -> Result<DeploymentCreateResources, Diagnostics> {
    let mut diags = Diagnostics::new();
    let region = options.region;

    let elasticsearch = diags.collect(elasticsearch_payload(
        deployment.elasticsearch.as_ref(),
        template,
        options,
    ));
    let kibana = diags.collect(kibana_payload(deployment.kibana.as_ref(), template, region));
    let apm = diags.collect(apm_payload(deployment.apm.as_ref(), template, region));
    let enterprise_search = diags.collect(enterprise_search_payload(
        deployment.enterprise_search.as_ref(),
        template,
        region,
    ));
    let integrations_server = diags.collect(integrations_server_payload(
        deployment.integrations_server.as_ref(),
        template,
        region,
    ));

    diags.into_result()?;

    Ok(DeploymentCreateResources {
        elasticsearch: elasticsearch.flatten().into_iter().collect(),
        kibana: kibana.flatten().into_iter().collect(),
        apm: apm.flatten().into_iter().collect(),
        enterprise_search: enterprise_search.flatten().into_iter().collect(),
        integrations_server: integrations_server.flatten().into_iter().collect(),
    })
}

fn tags_payload(deployment: &Deployment) -> DeploymentMetadata {
    DeploymentMetadata {
        tags: deployment
            .tags
            .iter()
            .map(|(key, value)| MetadataItem {
                key: key.clone(),
                value: value.clone(),
            })
            .collect(),
    }
}

fn ensure_partial_snapshot_strategy(es: &mut ElasticsearchPayload) {
    let restore_snapshot = es
        .plan
        .transient
        .as_mut()
        .and_then(|transient| transient.restore_snapshot.as_mut());
    if let Some(restore_snapshot) = restore_snapshot {
        debug!("forcing a partial snapshot restore on update");
        restore_snapshot.strategy = Some(RESTORE_STRATEGY_PARTIAL.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Some("aws-io-optimized-v2"), Some("aws-io-optimized-v2"), false)]
    #[case(Some("aws-storage-optimized-v2"), Some("aws-io-optimized-v2"), true)]
    #[case(Some("aws-io-optimized-v2"), Some(""), false)]
    #[case(Some(""), Some("aws-io-optimized-v2"), false)]
    #[case(Some("aws-io-optimized-v2"), None, false)]
    fn template_change(
        #[case] planned: Option<&str>,
        #[case] current: Option<&str>,
        #[case] expected: bool,
    ) {
        let deployment = |template_id: Option<&str>| Deployment {
            deployment_template_id: template_id.map(str::to_owned),
            ..Default::default()
        };
        assert_eq!(template_changed(&deployment(planned), &deployment(current)), expected);
    }

    #[test]
    fn tags_are_sorted_by_key() {
        let deployment = Deployment {
            tags: [("owner", "elastic"), ("cost-center", "rnd")]
                .into_iter()
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .collect(),
            ..Default::default()
        };

        let keys: Vec<_> = tags_payload(&deployment).tags.into_iter().map(|tag| tag.key).collect();
        assert_eq!(keys, ["cost-center", "owner"]);
    }
}
