use std::collections::BTreeSet;

use ec_api::{ApiError, DeploymentApi};
use snafu::{ResultExt, Snafu};
use tracing::{debug, instrument};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display(
        "traffic filter association error: failed to associate ruleset {ruleset_id:?}"
    ))]
    Associate { source: ApiError, ruleset_id: String },

    #[snafu(display("traffic filter association error: failed to remove ruleset {ruleset_id:?}"))]
    Disassociate { source: ApiError, ruleset_id: String },
}

/// The traffic filter rule sets to associate with and remove from a
/// deployment. Associations are managed through their own API calls rather
/// than the update request.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TrafficFilterChanges {
    pub to_add: Vec<String>,
    pub to_remove: Vec<String>,
}

impl TrafficFilterChanges {
    pub fn between(plan: &BTreeSet<String>, state: &BTreeSet<String>) -> Self {
        Self {
            to_add: plan.difference(state).cloned().collect(),
            to_remove: state.difference(plan).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Applies the changes, stopping at the first failing call.
    #[instrument(skip(self, client))]
    pub async fn apply(
        &self,
        client: &dyn DeploymentApi,
        deployment_id: &str,
    ) -> Result<(), Error> {
        for ruleset_id in &self.to_add {
            debug!(%ruleset_id, "associating traffic filter");
            client
                .create_traffic_filter_association(ruleset_id, deployment_id)
                .await
                .context(AssociateSnafu { ruleset_id })?;
        }

        for ruleset_id in &self.to_remove {
            debug!(%ruleset_id, "removing traffic filter association");
            client
                .delete_traffic_filter_association(ruleset_id, deployment_id)
                .await
                .context(DisassociateSnafu { ruleset_id })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rulesets(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| (*id).to_owned()).collect()
    }

    #[test]
    fn changes_between_plan_and_state() {
        let changes = TrafficFilterChanges::between(&rulesets(&["a", "b"]), &rulesets(&["b", "c"]));

        assert_eq!(changes.to_add, ["a"]);
        assert_eq!(changes.to_remove, ["c"]);
        assert!(TrafficFilterChanges::between(&rulesets(&["a"]), &rulesets(&["a"])).is_empty());
    }
}
