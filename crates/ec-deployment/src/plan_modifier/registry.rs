use ec_api::models::ResourceKind;
use strum::IntoEnumIterator;

use crate::{
    elasticsearch::Tier,
    plan_modifier::{
        AttributeModifiers, NodeRolesDefault, NodeTypesDefault, PlanModifier, Trigger,
        UseStateForUnknown, UseStateForUnknownUnlessChanged, UseTopologyStateForUnknown,
    },
    value::AttributePath,
};

const TOPOLOGY_ATTRIBUTES: [&str; 5] = [
    "instance_configuration_id",
    "instance_configuration_version",
    "size",
    "size_resource",
    "zone_count",
];

const AUTOSCALING_ATTRIBUTES: [&str; 4] =
    ["min_size", "min_size_resource", "max_size", "max_size_resource"];

const NODE_TYPE_ATTRIBUTES: [&str; 4] = [
    "node_type_data",
    "node_type_master",
    "node_type_ingest",
    "node_type_ml",
];

/// The plan modifiers of a deployment, keyed by attribute path.
pub fn deployment_plan_modifiers() -> Vec<AttributeModifiers> {
    let mut registry = Registry::default();

    for attribute in [
        "id",
        "alias",
        "elasticsearch_username",
        "elasticsearch_password",
        "apm_secret_token",
    ] {
        registry.add(attribute, UseStateForUnknown);
    }

    elasticsearch_modifiers(&mut registry);
    for kind in [
        ResourceKind::Kibana,
        ResourceKind::Apm,
        ResourceKind::EnterpriseSearch,
        ResourceKind::IntegrationsServer,
    ] {
        stateless_modifiers(&mut registry, kind);
    }

    let enterprise_search_topology = changed_unless(Trigger::Attribute(
        "enterprise_search.instance_configuration_id".into(),
    ));
    for node_type in ["node_type_appserver", "node_type_connector", "node_type_worker"] {
        registry.add(
            format!("enterprise_search.{node_type}"),
            enterprise_search_topology.clone(),
        );
    }
    registry.add("integrations_server.endpoints", UseStateForUnknown);

    registry.0
}

fn elasticsearch_modifiers(registry: &mut Registry) {
    for attribute in [
        "resource_id",
        "ref_id",
        "region",
        "cloud_id",
        "http_endpoint",
        "https_endpoint",
    ] {
        registry.add(format!("elasticsearch.{attribute}"), UseStateForUnknown);
    }

    registry.add(
        "elasticsearch.autoscale",
        changed_unless(Trigger::Topology {
            path: "elasticsearch".into(),
            members: Tier::iter().map(|tier| tier.to_string()).collect(),
        }),
    );

    for tier in Tier::iter() {
        let tier_path = format!("elasticsearch.{tier}");

        for attribute in TOPOLOGY_ATTRIBUTES {
            registry.add(format!("{tier_path}.{attribute}"), UseTopologyStateForUnknown(tier));
        }
        for attribute in AUTOSCALING_ATTRIBUTES {
            registry.add(
                format!("{tier_path}.autoscaling.{attribute}"),
                UseTopologyStateForUnknown(tier),
            );
        }

        registry.add(format!("{tier_path}.node_roles"), NodeRolesDefault(tier));
        for attribute in NODE_TYPE_ATTRIBUTES {
            registry.add(format!("{tier_path}.{attribute}"), NodeTypesDefault(tier));
        }
    }
}

fn stateless_modifiers(registry: &mut Registry, kind: ResourceKind) {
    for attribute in [
        "resource_id",
        "ref_id",
        "region",
        "elasticsearch_cluster_ref_id",
        "http_endpoint",
        "https_endpoint",
    ] {
        registry.add(format!("{kind}.{attribute}"), UseStateForUnknown);
    }

    // Template defaults differ between templates.
    for attribute in TOPOLOGY_ATTRIBUTES {
        registry.add(
            format!("{kind}.{attribute}"),
            changed_unless(Trigger::deployment_template_id()),
        );
    }
}

fn changed_unless(trigger: Trigger) -> UseStateForUnknownUnlessChanged {
    UseStateForUnknownUnlessChanged(trigger)
}

#[derive(Default)]
struct Registry(Vec<AttributeModifiers>);

impl Registry {
    /// Appends `modifier` to the modifiers of `path`.
    fn add(&mut self, path: impl AsRef<str>, modifier: impl PlanModifier + 'static) {
        let path = AttributePath::from(path.as_ref());
        let modifier: Box<dyn PlanModifier> = Box::new(modifier);

        match self.0.iter_mut().find(|attribute| attribute.path == path) {
            Some(attribute) => attribute.modifiers.push(modifier),
            None => self.0.push(AttributeModifiers {
                path,
                modifiers: vec![modifier],
            }),
        }
    }
}
