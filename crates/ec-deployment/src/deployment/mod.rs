//! The deployment as a whole: its persisted state model, the reader building
//! it from API responses and the builders of create and update requests.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    apm::Apm,
    elasticsearch::{Elasticsearch, Tier},
    enterprise_search::EnterpriseSearch,
    integrations_server::IntegrationsServer,
    kibana::Kibana,
    observability::{Observability, SELF_DEPLOYMENT_ID},
    size,
};

mod read;
mod request;
mod traffic_filter;

pub use read::*;
pub use request::*;
pub use traffic_filter::*;

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Deployment {
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

    pub elasticsearch: Option<Elasticsearch>,
    pub kibana: Option<Kibana>,
    pub apm: Option<Apm>,
    pub integrations_server: Option<IntegrationsServer>,
    pub enterprise_search: Option<EnterpriseSearch>,
    pub observability: Option<Observability>,
}

impl Deployment {
    /// Keeps the generated credentials of `prior`. The API only returns them
    /// in the response of the call that generated them.
    pub fn set_credentials_if_empty(&mut self, prior: Option<&Self>) {
        let Some(prior) = prior else {
            return;
        };

        for (credential, previous) in [
            (&mut self.elasticsearch_username, &prior.elasticsearch_username),
            (&mut self.elasticsearch_password, &prior.elasticsearch_password),
            (&mut self.apm_secret_token, &prior.apm_secret_token),
        ] {
            if credential.as_deref().is_none_or(str::is_empty) {
                credential.clone_from(previous);
            }
        }
    }

    /// Drops the zero sized tiers an autoscaling deployment reports for tiers
    /// `plan` does not configure.
    pub fn nullify_unused_es_topologies(&mut self, plan: &Self) {
        let Some(es) = &mut self.elasticsearch else {
            return;
        };
        let planned = plan.elasticsearch.as_ref();
        let zero = size::memory_to_state(0);

        for tier in <Tier as strum::IntoEnumIterator>::iter() {
            if planned.and_then(|planned| planned.tier(tier)).is_some() {
                continue;
            }
            let topology = es.tier_mut(tier);
            if topology
                .as_ref()
                .is_some_and(|topology| topology.size.as_deref() == Some(zero.as_str()))
            {
                *topology = None;
            }
        }
    }

    /// Reports the deployment's own id as `self` when `configured` refers to
    /// the deployment that way.
    pub fn process_self_in_observability(&mut self, configured: Option<&Self>) {
        let uses_self = configured
            .and_then(|configured| configured.observability.as_ref())
            .is_some_and(Observability::is_self);
        if !uses_self {
            return;
        }

        let Some(observability) = &mut self.observability else {
            return;
        };
        if observability.deployment_id.is_some() && observability.deployment_id == self.id {
            observability.deployment_id = Some(SELF_DEPLOYMENT_ID.to_owned());
        }
    }
}
