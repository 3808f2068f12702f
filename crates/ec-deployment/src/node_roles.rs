//! Translation between the legacy node type flags and node roles, and the
//! inference of dedicated master and ingest tiers.

use std::collections::BTreeSet;

use ec_api::models::{ElasticsearchClusterTopologyElement, ElasticsearchNodeType};
use snafu::{ResultExt, Snafu};
use tracing::warn;

use crate::{
    diagnostics::{Diagnostic, Diagnostics},
    elasticsearch::ElasticsearchTopology,
};

pub const ROLE_MASTER: &str = "master";
pub const ROLE_INGEST: &str = "ingest";
const DATA_ROLE_PREFIX: &str = "data_";

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed parsing node_type_{flag} value {value:?}"))]
    ParseFlag {
        source: std::str::ParseBoolError,
        flag: &'static str,
        value: String,
    },
}

/// Applies the node settings of a configured tier onto the template element
/// matched for it.
///
/// Exactly one representation ends up on the element. When node roles are in
/// use, configured roles replace the template's roles and legacy flags are
/// ignored. Otherwise the flags are parsed into the element's node type and
/// configured roles are ignored.
pub fn apply_node_settings(
    element: &mut ElasticsearchClusterTopologyElement,
    topology: &ElasticsearchTopology,
    use_node_roles: bool,
    path: &str,
) -> Result<(), Diagnostics> {
    let has_node_type = topology.has_node_type();

    if has_node_type && !topology.node_roles.is_empty() {
        return Err(Diagnostic::error(
            "conflicting node settings",
            "node_type_* and node_roles cannot be set at the same time",
        )
        .at(path)
        .into());
    }

    if use_node_roles {
        if has_node_type {
            warn!(path, "ignoring node_type_* settings, the deployment uses node roles");
        }
        if !topology.node_roles.is_empty() {
            element.node_roles = topology.node_roles.iter().cloned().collect();
        }
        element.node_type = None;
        return Ok(());
    }

    if !topology.node_roles.is_empty() {
        warn!(path, "ignoring node_roles, the deployment uses legacy node types");
    }
    element.node_roles.clear();

    if has_node_type {
        let node_type = element.node_type.get_or_insert_with(Default::default);
        parse_node_type(node_type, topology).map_err(|err| {
            Diagnostics::from(Diagnostic::error("invalid node type", err).at(path))
        })?;
    }

    Ok(())
}

fn parse_node_type(
    node_type: &mut ElasticsearchNodeType,
    topology: &ElasticsearchTopology,
) -> Result<(), Error> {
    let flags = [
        ("data", &topology.node_type_data, &mut node_type.data),
        ("master", &topology.node_type_master, &mut node_type.master),
        ("ingest", &topology.node_type_ingest, &mut node_type.ingest),
        ("ml", &topology.node_type_ml, &mut node_type.ml),
    ];

    for (flag, value, target) in flags {
        let Some(value) = value.as_deref().filter(|value| !value.is_empty()) else {
            continue;
        };
        *target = Some(value.parse().context(ParseFlagSnafu { flag, value })?);
    }

    Ok(())
}

/// Copies the node settings of an API element into a state topology. Node
/// roles take precedence, node types are only read when no roles are present.
pub fn read_node_settings(
    element: &ElasticsearchClusterTopologyElement,
    topology: &mut ElasticsearchTopology,
) {
    if !element.node_roles.is_empty() {
        topology.node_roles = element.node_roles.iter().cloned().collect();
        return;
    }

    if let Some(node_type) = &element.node_type {
        let flag = |value: Option<bool>| value.map(|value| value.to_string());
        topology.node_type_data = flag(node_type.data);
        topology.node_type_master = flag(node_type.master);
        topology.node_type_ingest = flag(node_type.ingest);
        topology.node_type_ml = flag(node_type.ml);
    }
}

#[derive(Debug, Default)]
struct RoleShape {
    data: bool,
    master: bool,
    ingest: bool,
}

impl RoleShape {
    fn of(roles: &[String]) -> Self {
        Self {
            data: roles.iter().any(|role| role.starts_with(DATA_ROLE_PREFIX)),
            master: roles.iter().any(|role| role == ROLE_MASTER),
            ingest: roles.iter().any(|role| role == ROLE_INGEST),
        }
    }
}

/// Removes the master and ingest roles from data tiers when a dedicated tier
/// already covers them.
///
/// Only sized elements are considered. A dedicated master tier has the master
/// role and no data role, a dedicated ingest tier likewise. Every data tier
/// also holding the master role loses the roles taken over by a dedicated
/// tier. Without such a data tier nothing changes.
pub fn strip_redundant_roles(topology: &mut [ElasticsearchClusterTopologyElement]) {
    let shapes: Vec<_> = topology
        .iter()
        .map(|element| (element.size_value() > 0).then(|| RoleShape::of(&element.node_roles)))
        .collect();

    let dedicated_master = shapes
        .iter()
        .flatten()
        .any(|shape| shape.master && !shape.data);
    let dedicated_ingest = shapes
        .iter()
        .flatten()
        .any(|shape| shape.ingest && !shape.data);

    let mut redundant = BTreeSet::new();
    if dedicated_master {
        redundant.insert(ROLE_MASTER);
    }
    if dedicated_ingest {
        redundant.insert(ROLE_INGEST);
    }
    if redundant.is_empty() {
        return;
    }

    for (element, shape) in topology.iter_mut().zip(shapes) {
        let Some(shape) = shape else {
            continue;
        };
        if shape.data && shape.master {
            element
                .node_roles
                .retain(|role| !redundant.contains(role.as_str()));
        }
    }
}

#[cfg(test)]
mod tests {
    use ec_api::models::TopologySize;
    use rstest::rstest;

    use super::*;

    fn element(id: &str, size: i32, roles: &[&str]) -> ElasticsearchClusterTopologyElement {
        ElasticsearchClusterTopologyElement {
            id: id.to_owned(),
            size: Some(TopologySize::memory(size)),
            node_roles: roles.iter().map(ToString::to_string).collect(),
            ..Default::default()
        }
    }

    fn roles(element: &ElasticsearchClusterTopologyElement) -> Vec<&str> {
        element.node_roles.iter().map(String::as_str).collect()
    }

    #[test]
    fn dedicated_ingest_tier() {
        let mut topology = vec![
            element("hot_content", 4096, &["data_hot", "master", "ingest"]),
            element("coordinating", 1024, &["ingest"]),
        ];

        strip_redundant_roles(&mut topology);

        assert_eq!(roles(&topology[0]), ["data_hot", "master"]);
        assert_eq!(roles(&topology[1]), ["ingest"]);
    }

    #[test]
    fn dedicated_master_tier() {
        let mut topology = vec![
            element("hot_content", 4096, &["data_hot", "master", "ingest"]),
            element("warm", 2048, &["data_warm", "master"]),
            element("master", 1024, &["master"]),
        ];

        strip_redundant_roles(&mut topology);

        assert_eq!(roles(&topology[0]), ["data_hot", "ingest"]);
        assert_eq!(roles(&topology[1]), ["data_warm"]);
        assert_eq!(roles(&topology[2]), ["master"]);
    }

    #[rstest]
    #[case::unsized_dedicated_tier(vec![
        element("hot_content", 4096, &["data_hot", "master", "ingest"]),
        element("master", 0, &["master"]),
    ])]
    #[case::no_data_tier(vec![
        element("ml", 1024, &["ml", "master"]),
        element("coordinating", 1024, &["ingest"]),
    ])]
    fn nothing_to_strip(#[case] topology: Vec<ElasticsearchClusterTopologyElement>) {
        let mut stripped = topology.clone();
        strip_redundant_roles(&mut stripped);
        assert_eq!(stripped, topology);
    }

    #[test]
    fn node_roles_replace_node_type() {
        let mut element = ElasticsearchClusterTopologyElement {
            node_type: Some(ElasticsearchNodeType::default()),
            node_roles: vec!["data_hot".to_owned()],
            ..Default::default()
        };
        let topology = ElasticsearchTopology {
            node_roles: ["data_hot", "master"].map(str::to_owned).into(),
            ..Default::default()
        };

        apply_node_settings(&mut element, &topology, true, "elasticsearch.hot")
            .expect("valid node settings");

        assert_eq!(element.node_type, None);
        assert_eq!(roles(&element), ["data_hot", "master"]);
    }

    #[test]
    fn legacy_node_type_flags() {
        let mut element = ElasticsearchClusterTopologyElement {
            node_roles: vec!["data_hot".to_owned()],
            ..Default::default()
        };
        let topology = ElasticsearchTopology {
            node_type_data: Some("true".to_owned()),
            node_type_ml: Some("false".to_owned()),
            ..Default::default()
        };

        apply_node_settings(&mut element, &topology, false, "elasticsearch.hot")
            .expect("valid node settings");

        assert!(element.node_roles.is_empty());
        assert_eq!(
            element.node_type,
            Some(ElasticsearchNodeType {
                data: Some(true),
                ml: Some(false),
                ..Default::default()
            })
        );
    }

    #[test]
    fn invalid_node_type_flag() {
        let topology = ElasticsearchTopology {
            node_type_master: Some("maybe".to_owned()),
            ..Default::default()
        };

        let diags = apply_node_settings(
            &mut ElasticsearchClusterTopologyElement::default(),
            &topology,
            false,
            "elasticsearch.master",
        )
        .expect_err("invalid flag");
        assert!(diags.to_string().contains("node_type_master"));
    }

    #[test]
    fn both_representations_conflict() {
        let topology = ElasticsearchTopology {
            node_type_data: Some("true".to_owned()),
            node_roles: ["data_hot".to_owned()].into(),
            ..Default::default()
        };

        assert!(
            apply_node_settings(
                &mut ElasticsearchClusterTopologyElement::default(),
                &topology,
                true,
                "elasticsearch.hot",
            )
            .is_err()
        );
    }

    #[test]
    fn read_prefers_node_roles() {
        let element = ElasticsearchClusterTopologyElement {
            node_type: Some(ElasticsearchNodeType {
                data: Some(true),
                ..Default::default()
            }),
            node_roles: vec!["data_hot".to_owned()],
            ..Default::default()
        };
        let mut topology = ElasticsearchTopology::default();

        read_node_settings(&element, &mut topology);
        assert_eq!(topology.node_type_data, None);
        assert!(topology.node_roles.contains("data_hot"));

        let element = ElasticsearchClusterTopologyElement {
            node_roles: Vec::new(),
            ..element
        };
        let mut topology = ElasticsearchTopology::default();
        read_node_settings(&element, &mut topology);
        assert_eq!(topology.node_type_data.as_deref(), Some("true"));
    }
}
