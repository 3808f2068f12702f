use ec_api::models::{
    DeploymentGetResponse, DeploymentResource, DeploymentResources, RemoteResources, ResourceKind,
    StatelessPlan, StatelessResourceInfo,
};
use semver::Version;
use snafu::{OptionExt, ResultExt, Snafu, ensure};
use tracing::instrument;

use crate::{
    apm::read_apms,
    deployment::Deployment,
    elasticsearch::{self, read_elasticsearches},
    enterprise_search::read_enterprise_searches,
    integrations_server::read_integrations_servers,
    kibana::read_kibanas,
    observability::read_observability,
    stateless, version,
};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("deployment response is missing its {field}"))]
    MissingField { field: &'static str },

    #[snafu(display("failed to obtain the deployment template id"))]
    MissingTemplateId,

    #[snafu(display("elasticsearch resources use different deployment templates: {ids:?}"))]
    ConflictingTemplateIds { ids: Vec<String> },

    #[snafu(display("failed to determine the deployment version"))]
    LowestVersion { source: version::Error },

    #[snafu(display("failed to read the elasticsearch resource"))]
    ReadElasticsearch { source: elasticsearch::read::Error },

    #[snafu(display("failed to read the {kind} resource"))]
    ReadStateless {
        source: stateless::Error,
        kind: ResourceKind,
    },
}

/// Builds the deployment state from a get response.
///
/// `remotes` are the remote clusters of the Elasticsearch resource, fetched
/// separately. `deployment_resources` are the resources returned by the create
/// or update call which preceded this read, they carry the generated
/// credentials.
#[instrument(skip_all, fields(deployment_id = response.id.as_deref()))]
pub fn read_deployment(
    response: &DeploymentGetResponse,
    remotes: Option<&RemoteResources>,
    deployment_resources: &[DeploymentResource],
) -> Result<Deployment> {
    let id = response
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .context(MissingFieldSnafu { field: "id" })?;
    let name = response
        .name
        .clone()
        .filter(|name| !name.is_empty())
        .context(MissingFieldSnafu { field: "name" })?;

    let empty = DeploymentResources::default();
    let resources = response.resources.as_ref().unwrap_or(&empty);

    let mut deployment = Deployment {
        id: Some(id),
        alias: response.alias.clone(),
        name: Some(name),
        deployment_template_id: Some(deployment_template_id(resources)?),
        region: resources
            .elasticsearch
            .first()
            .and_then(|resource| resource.region.clone()),
        version: lowest_version(resources)?.map(|version| version.to_string()),
        elasticsearch: read_elasticsearches(&resources.elasticsearch, remotes)
            .context(ReadElasticsearchSnafu)?,
        kibana: read_kibanas(&resources.kibana).context(ReadStatelessSnafu {
            kind: ResourceKind::Kibana,
        })?,
        apm: read_apms(&resources.apm).context(ReadStatelessSnafu {
            kind: ResourceKind::Apm,
        })?,
        enterprise_search: read_enterprise_searches(&resources.enterprise_search).context(
            ReadStatelessSnafu {
                kind: ResourceKind::EnterpriseSearch,
            },
        )?,
        integrations_server: read_integrations_servers(&resources.integrations_server).context(
            ReadStatelessSnafu {
                kind: ResourceKind::IntegrationsServer,
            },
        )?,
        observability: read_observability(response.settings.as_ref()),
        ..Default::default()
    };

    if let Some(traffic_filter) = response
        .settings
        .as_ref()
        .and_then(|settings| settings.traffic_filter_settings.as_ref())
    {
        deployment.traffic_filter = traffic_filter.rulesets.iter().cloned().collect();
    }

    if let Some(metadata) = &response.metadata {
        deployment.tags = metadata
            .tags
            .iter()
            .map(|tag| (tag.key.clone(), tag.value.clone()))
            .collect();
    }

    read_credentials(deployment_resources, &mut deployment);
    Ok(deployment)
}

fn deployment_template_id(resources: &DeploymentResources) -> Result<String> {
    let mut ids: Vec<String> = resources
        .elasticsearch
        .iter()
        .filter_map(|resource| resource.current_plan()?.deployment_template.as_ref()?.id.clone())
        .filter(|id| !id.is_empty())
        .collect();
    ids.sort();
    ids.dedup();

    ensure!(ids.len() <= 1, ConflictingTemplateIdsSnafu { ids });
    ids.pop().context(MissingTemplateIdSnafu)
}

/// Returns the lowest version any running resource runs. An upgrade which
/// only reached some of the resources thereby stays pending. Stopped
/// resources are not read into state and do not count.
fn lowest_version(resources: &DeploymentResources) -> Result<Option<Version>> {
    let elasticsearch = resources
        .elasticsearch
        .iter()
        .filter(|resource| !resource.is_stopped())
        .filter_map(|resource| resource.current_plan()?.elasticsearch.version.clone());

    let versions = elasticsearch
        .chain(stateless_versions(&resources.kibana))
        .chain(stateless_versions(&resources.apm))
        .chain(stateless_versions(&resources.enterprise_search))
        .chain(stateless_versions(&resources.integrations_server))
        .filter(|version| !version.is_empty());

    let mut lowest: Option<Version> = None;
    for input in versions {
        let version = version::parse(&input).context(LowestVersionSnafu)?;
        if lowest.as_ref().is_none_or(|lowest| version < *lowest) {
            lowest = Some(version);
        }
    }
    Ok(lowest)
}

fn stateless_versions<P: StatelessPlan>(
    resources: &[StatelessResourceInfo<P>],
) -> impl Iterator<Item = String> + '_ {
    resources
        .iter()
        .filter(|resource| !resource.is_stopped())
        .filter_map(|resource| resource.current_plan()?.configuration().version.clone())
}

fn read_credentials(resources: &[DeploymentResource], deployment: &mut Deployment) {
    for resource in resources {
        if let Some(credentials) = &resource.credentials {
            if credentials.username.is_some() {
                deployment.elasticsearch_username.clone_from(&credentials.username);
            }
            if credentials.password.is_some() {
                deployment.elasticsearch_password.clone_from(&credentials.password);
            }
        }
        if resource.secret_token.as_deref().is_some_and(|token| !token.is_empty()) {
            deployment.apm_secret_token.clone_from(&resource.secret_token);
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rstest::rstest;

    use super::*;

    const RESPONSE: &str = indoc! {"
        id: 123b7b540dfc967a7a649c18e2fce4ed
        alias: my-deployment
        name: my_deployment_name
        settings:
          traffic_filter_settings:
            rulesets:
              - 0.0.0.0/0
        metadata:
          tags:
            - key: owner
              value: elastic
        resources:
          elasticsearch:
            - ref_id: main-elasticsearch
              region: us-east-1
              info:
                cluster_id: es-1
                status: started
                plan_info:
                  current:
                    plan:
                      deployment_template:
                        id: aws-io-optimized-v2
                      elasticsearch:
                        version: 7.10.1
                      cluster_topology:
                        - id: hot_content
                          instance_configuration_id: aws.data.highio.i3
                          size:
                            value: 4096
                            resource: memory
                          zone_count: 2
                          node_roles: [data_hot, data_content, ingest, master]
          kibana:
            - ref_id: main-kibana
              elasticsearch_cluster_ref_id: main-elasticsearch
              region: us-east-1
              info:
                cluster_id: kb-1
                status: started
                plan_info:
                  current:
                    plan:
                      kibana:
                        version: 7.9.2
                      cluster_topology:
                        - instance_configuration_id: aws.kibana.r5d
                          size:
                            value: 1024
                            resource: memory
                          zone_count: 1
    "};

    fn response() -> DeploymentGetResponse {
        serde_yaml::from_str(RESPONSE).expect("valid response")
    }

    #[test]
    fn reads_deployment() {
        let resources: Vec<DeploymentResource> = serde_yaml::from_str(indoc! {"
            - kind: elasticsearch
              ref_id: main-elasticsearch
              credentials:
                username: elastic
                password: secret
            - kind: apm
              ref_id: main-apm
              secret_token: token
        "})
        .expect("valid resources");

        let deployment =
            read_deployment(&response(), None, &resources).expect("readable deployment");

        assert_eq!(deployment.id.as_deref(), Some("123b7b540dfc967a7a649c18e2fce4ed"));
        assert_eq!(deployment.deployment_template_id.as_deref(), Some("aws-io-optimized-v2"));
        assert_eq!(deployment.region.as_deref(), Some("us-east-1"));
        // Kibana did not finish its upgrade yet.
        assert_eq!(deployment.version.as_deref(), Some("7.9.2"));
        assert_eq!(deployment.elasticsearch_username.as_deref(), Some("elastic"));
        assert_eq!(deployment.elasticsearch_password.as_deref(), Some("secret"));
        assert_eq!(deployment.apm_secret_token.as_deref(), Some("token"));
        assert_eq!(deployment.traffic_filter.len(), 1);
        assert_eq!(deployment.tags.get("owner").map(String::as_str), Some("elastic"));
        assert!(deployment.kibana.is_some());
        assert_eq!(deployment.apm, None);

        let hot = deployment.elasticsearch.and_then(|es| es.hot).expect("hot tier");
        assert_eq!(hot.size.as_deref(), Some("4g"));
    }

    #[test]
    fn missing_name_is_an_error() {
        let mut response = response();
        response.name = None;

        let err = read_deployment(&response, None, &[]).expect_err("name is required");
        assert!(matches!(err, Error::MissingField { field: "name" }));
    }

    #[test]
    fn unparsable_version_is_an_error() {
        let response: DeploymentGetResponse =
            serde_yaml::from_str(&RESPONSE.replace("7.9.2", "seven")).expect("valid response");

        let err = read_deployment(&response, None, &[]).expect_err("invalid version");
        assert!(matches!(err, Error::LowestVersion { .. }));
    }

    #[rstest]
    #[case::stopped("7.9.2")]
    #[case::stopped_with_invalid_version("seven")]
    fn stopped_resources_do_not_lower_the_version(#[case] kibana_version: &str) {
        let mut response: DeploymentGetResponse =
            serde_yaml::from_str(&RESPONSE.replace("7.9.2", kibana_version))
                .expect("valid response");
        let kibana = response
            .resources
            .as_mut()
            .and_then(|resources| resources.kibana.first_mut())
            .and_then(|kibana| kibana.info.as_mut())
            .expect("kibana info");
        kibana.status = Some("stopped".to_owned());

        let deployment = read_deployment(&response, None, &[]).expect("readable deployment");

        assert_eq!(deployment.kibana, None);
        assert_eq!(deployment.version.as_deref(), Some("7.10.1"));
    }
}
