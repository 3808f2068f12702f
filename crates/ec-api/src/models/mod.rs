//! Serde models of the deployment API documents.

use serde::{Deserialize, Serialize};

mod common;
mod deployment;
mod elasticsearch;
mod stateless;
mod template;

pub use common::*;
pub use deployment::*;
pub use elasticsearch::*;
pub use stateless::*;
pub use template::*;

/// The resource kinds a deployment can be composed of.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResourceKind {
    Elasticsearch,
    Kibana,
    Apm,
    EnterpriseSearch,
    IntegrationsServer,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("elasticsearch", ResourceKind::Elasticsearch)]
    #[case("kibana", ResourceKind::Kibana)]
    #[case("apm", ResourceKind::Apm)]
    #[case("enterprise_search", ResourceKind::EnterpriseSearch)]
    #[case("integrations_server", ResourceKind::IntegrationsServer)]
    fn resource_kind_names(#[case] input: &str, #[case] expected: ResourceKind) {
        assert_eq!(ResourceKind::from_str(input).expect("known kind"), expected);
        assert_eq!(expected.to_string(), input);
    }
}
