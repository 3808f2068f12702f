use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Mutex,
};

use async_trait::async_trait;
use ec_api::{
    ApiError, DeploymentApi,
    models::{DeploymentTemplate, RemoteResources, ResourceKind},
};
use indoc::indoc;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Call {
    GetTemplate {
        template_id: String,
        region: String,
    },
    UpdateRemoteClusters {
        deployment_id: String,
        ref_id: String,
        remote_resources: RemoteResources,
    },
    PopulateRefId {
        kind: ResourceKind,
        deployment_id: String,
    },
    Associate {
        ruleset_id: String,
        deployment_id: String,
    },
    Disassociate {
        ruleset_id: String,
        deployment_id: String,
    },
}

/// Serves fixed templates and ref ids and records every call.
#[derive(Debug, Default)]
pub struct MockApi {
    pub templates: BTreeMap<String, DeploymentTemplate>,
    /// Elasticsearch ref ids by deployment id.
    pub ref_ids: BTreeMap<String, String>,
    pub failing_rulesets: BTreeSet<String>,
    calls: Mutex<Vec<Call>>,
}

impl MockApi {
    pub fn with_templates(template_ids: &[&str]) -> Self {
        Self {
            templates: template_ids
                .iter()
                .map(|id| ((*id).to_owned(), template(id)))
                .collect(),
            ..Default::default()
        }
    }

    /// Fails associating and disassociating the given rulesets.
    pub fn with_failing_rulesets(ruleset_ids: &[&str]) -> Self {
        Self {
            failing_rulesets: ruleset_ids.iter().map(|id| (*id).to_owned()).collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

#[async_trait]
impl DeploymentApi for MockApi {
    async fn get_deployment_template(
        &self,
        template_id: &str,
        region: &str,
        _hide_instance_configurations: bool,
    ) -> Result<DeploymentTemplate, ApiError> {
        self.record(Call::GetTemplate {
            template_id: template_id.to_owned(),
            region: region.to_owned(),
        });
        self.templates
            .get(template_id)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                operation: "get deployment template".to_owned(),
                status: 404,
                message: format!("template {template_id} not found"),
            })
    }

    async fn update_remote_clusters(
        &self,
        deployment_id: &str,
        ref_id: &str,
        remote_resources: &RemoteResources,
    ) -> Result<(), ApiError> {
        self.record(Call::UpdateRemoteClusters {
            deployment_id: deployment_id.to_owned(),
            ref_id: ref_id.to_owned(),
            remote_resources: remote_resources.clone(),
        });
        Ok(())
    }

    async fn populate_ref_id(
        &self,
        kind: ResourceKind,
        deployment_id: &str,
    ) -> Result<String, ApiError> {
        self.record(Call::PopulateRefId {
            kind,
            deployment_id: deployment_id.to_owned(),
        });
        self.ref_ids
            .get(deployment_id)
            .cloned()
            .ok_or_else(|| ApiError::ResourceNotFound {
                kind,
                deployment_id: deployment_id.to_owned(),
            })
    }

    async fn create_traffic_filter_association(
        &self,
        ruleset_id: &str,
        deployment_id: &str,
    ) -> Result<(), ApiError> {
        self.record(Call::Associate {
            ruleset_id: ruleset_id.to_owned(),
            deployment_id: deployment_id.to_owned(),
        });
        self.fail_for(ruleset_id)
    }

    async fn delete_traffic_filter_association(
        &self,
        ruleset_id: &str,
        deployment_id: &str,
    ) -> Result<(), ApiError> {
        self.record(Call::Disassociate {
            ruleset_id: ruleset_id.to_owned(),
            deployment_id: deployment_id.to_owned(),
        });
        self.fail_for(ruleset_id)
    }
}

impl MockApi {
    fn fail_for(&self, ruleset_id: &str) -> Result<(), ApiError> {
        if self.failing_rulesets.contains(ruleset_id) {
            return Err(ApiError::Transport {
                operation: "traffic filter association".to_owned(),
                message: "connection reset".to_owned(),
            });
        }
        Ok(())
    }
}

/// An io-optimized template with Elasticsearch hot and warm tiers and a
/// single Kibana.
pub fn template(id: &str) -> DeploymentTemplate {
    let mut template: DeploymentTemplate = serde_yaml::from_str(indoc! {"
        deployment_template:
          resources:
            elasticsearch:
              - ref_id: es-ref-id
                region: us-east-1
                plan:
                  autoscaling_enabled: false
                  elasticsearch: {}
                  cluster_topology:
                    - id: hot_content
                      instance_configuration_id: aws.data.highio.i3
                      size:
                        value: 8192
                        resource: memory
                      zone_count: 2
                      node_type:
                        data: true
                        master: true
                        ingest: true
                      node_roles:
                        - master
                        - ingest
                        - remote_cluster_client
                        - data_hot
                        - transform
                        - data_content
                    - id: warm
                      instance_configuration_id: aws.data.highstorage.d3
                      size:
                        value: 0
                        resource: memory
                      zone_count: 2
                      node_type:
                        data: true
                      node_roles: [data_warm, remote_cluster_client]
            kibana:
              - elasticsearch_cluster_ref_id: es-ref-id
                ref_id: kibana-ref-id
                region: us-east-1
                plan:
                  kibana: {}
                  cluster_topology:
                    - instance_configuration_id: aws.kibana.r5d
                      size:
                        value: 1024
                        resource: memory
                      zone_count: 1
    "})
    .expect("valid template");
    template.id = Some(id.to_owned());
    template
}
