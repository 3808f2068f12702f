//! Enterprise Search. On top of the shared stateless shape it reports which
//! node types its sized topology element runs. Those flags are computed by
//! the platform and never sent.

use ec_api::models::{DeploymentTemplate, EnterpriseSearchPayload, EnterpriseSearchResourceInfo};
use serde::{Deserialize, Serialize};

use crate::{
    diagnostics::Diagnostics,
    stateless::{self, StatelessResource},
};

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EnterpriseSearch {
    #[serde(flatten)]
    pub resource: StatelessResource,

    pub node_type_appserver: Option<bool>,
    pub node_type_connector: Option<bool>,
    pub node_type_worker: Option<bool>,
}

pub fn read_enterprise_searches(
    resources: &[EnterpriseSearchResourceInfo],
) -> Result<Option<EnterpriseSearch>, stateless::Error> {
    let Some(resource) = stateless::first_running(resources) else {
        return Ok(None);
    };

    let mut enterprise_search = EnterpriseSearch {
        resource: stateless::read_resource(resource)?,
        ..Default::default()
    };

    let node_types = resource
        .current_plan()
        .and_then(stateless::sized_topology)
        .and_then(|element| element.node_type.as_ref());
    if let Some(node_types) = node_types {
        enterprise_search.node_type_appserver = node_types.appserver;
        enterprise_search.node_type_connector = node_types.connector;
        enterprise_search.node_type_worker = node_types.worker;
    }

    Ok(Some(enterprise_search))
}

pub fn enterprise_search_payload(
    enterprise_search: Option<&EnterpriseSearch>,
    template: &DeploymentTemplate,
    region: &str,
) -> Result<Option<EnterpriseSearchPayload>, Diagnostics> {
    stateless::stateless_payload(
        enterprise_search.map(|enterprise_search| &enterprise_search.resource),
        template.enterprise_search(),
        region,
    )
}

#[cfg(test)]
mod tests {
    use ec_api::models::TopologySize;
    use indoc::indoc;

    use super::*;

    #[test]
    fn reads_node_types() {
        let resources: Vec<EnterpriseSearchResourceInfo> = serde_yaml::from_str(indoc! {"
            - ref_id: main-enterprise_search
              elasticsearch_cluster_ref_id: main-elasticsearch
              info:
                id: ent-1
                status: started
                plan_info:
                  current:
                    plan:
                      enterprise_search:
                        version: 8.4.3
                      cluster_topology:
                        - instance_configuration_id: aws.enterprisesearch.m5d
                          size:
                            value: 2048
                            resource: memory
                          zone_count: 1
                          node_type:
                            appserver: true
                            connector: true
                            worker: true
        "})
        .expect("valid resources");

        let enterprise_search = read_enterprise_searches(&resources)
            .expect("readable")
            .expect("running enterprise search");

        assert_eq!(enterprise_search.resource.resource_id.as_deref(), Some("ent-1"));
        assert_eq!(enterprise_search.resource.size.as_deref(), Some("2g"));
        assert_eq!(enterprise_search.node_type_appserver, Some(true));
        assert_eq!(enterprise_search.node_type_worker, Some(true));

        let state = serde_json::to_value(&enterprise_search).expect("state serializes");
        assert_eq!(state["ref_id"], "main-enterprise_search");
        assert_eq!(state["node_type_connector"], true);
    }

    #[test]
    fn payload_applies_minimums() {
        let template: DeploymentTemplate = serde_yaml::from_str(indoc! {"
            deployment_template:
              resources:
                enterprise_search:
                  - ref_id: main-enterprise_search
                    plan:
                      enterprise_search: {}
                      cluster_topology:
                        - instance_configuration_id: aws.enterprisesearch.m5d
                          size:
                            value: 0
                            resource: memory
                          zone_count: 0
        "})
        .expect("valid template");

        let payload =
            enterprise_search_payload(Some(&EnterpriseSearch::default()), &template, "us-east-1")
                .expect("valid payload")
                .expect("configured");

        let element = &payload.plan.cluster_topology[0];
        assert_eq!(element.size, Some(TopologySize::memory(2048)));
        assert_eq!(element.zone_count, 1);
        assert_eq!(payload.region.as_deref(), Some("us-east-1"));
    }
}
