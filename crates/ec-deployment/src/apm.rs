use ec_api::models::{ApmPayload, ApmResourceInfo, DeploymentTemplate};

use crate::{
    diagnostics::Diagnostics,
    stateless::{self, StatelessResource},
};

pub type Apm = StatelessResource;

pub fn read_apms(resources: &[ApmResourceInfo]) -> Result<Option<Apm>, stateless::Error> {
    stateless::read_stateless(resources)
}

pub fn apm_payload(
    apm: Option<&Apm>,
    template: &DeploymentTemplate,
    region: &str,
) -> Result<Option<ApmPayload>, Diagnostics> {
    stateless::stateless_payload(apm, template.apm(), region)
}
