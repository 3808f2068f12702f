use ec_api::models::{DeploymentTemplate, KibanaPayload, KibanaResourceInfo};

use crate::{
    diagnostics::Diagnostics,
    stateless::{self, StatelessResource},
};

pub type Kibana = StatelessResource;

pub fn read_kibanas(resources: &[KibanaResourceInfo]) -> Result<Option<Kibana>, stateless::Error> {
    stateless::read_stateless(resources)
}

pub fn kibana_payload(
    kibana: Option<&Kibana>,
    template: &DeploymentTemplate,
    region: &str,
) -> Result<Option<KibanaPayload>, Diagnostics> {
    stateless::stateless_payload(kibana, template.kibana(), region)
}
