//! Plan modifiers decide whether an attribute the plan leaves unknown keeps
//! its value from state.
//!
//! Computed attributes are unknown in every plan. Reusing the prior value when
//! nothing relevant changed keeps plans free of changes that will not happen.
//! All modifiers share the same preconditions: the planned value is unknown,
//! the configured value is not, and a prior value exists.

use std::fmt::Debug;

use tracing::debug;

use crate::{
    elasticsearch::Tier,
    value::{self, AttributePath, Value},
    version,
};

mod registry;
mod triggers;

pub use registry::*;
pub use triggers::*;

/// The values a [`PlanModifier`] decides on.
#[derive(Clone, Copy, Debug)]
pub struct ModifyRequest<'a> {
    pub path: &'a AttributePath,
    pub plan_value: &'a Value,
    pub state_value: &'a Value,
    pub config_value: &'a Value,

    /// The whole trees, to look at sibling attributes.
    pub plan: &'a Value,
    pub state: &'a Value,
}

impl ModifyRequest<'_> {
    /// Returns whether the shared preconditions hold.
    fn applies(&self) -> bool {
        self.plan_value.is_unknown() && !self.config_value.is_unknown() && !self.state.is_null()
    }

    fn prior(&self) -> Option<Value> {
        (!self.state_value.is_null() && !self.state_value.is_unknown())
            .then(|| self.state_value.clone())
    }
}

pub trait PlanModifier: Debug + Send + Sync {
    /// Returns the value to plan instead, [`None`] keeps the planned value.
    fn modify(&self, request: &ModifyRequest<'_>) -> Option<Value>;
}

/// Reuses the prior value unconditionally. For values which never change
/// once assigned, such as resource ids.
#[derive(Clone, Copy, Debug, Default)]
pub struct UseStateForUnknown;

impl PlanModifier for UseStateForUnknown {
    fn modify(&self, request: &ModifyRequest<'_>) -> Option<Value> {
        if !request.applies() {
            return None;
        }
        request.prior()
    }
}

/// Reuses the prior value unless `trigger` changed.
#[derive(Clone, Debug)]
pub struct UseStateForUnknownUnlessChanged(pub Trigger);

impl PlanModifier for UseStateForUnknownUnlessChanged {
    fn modify(&self, request: &ModifyRequest<'_>) -> Option<Value> {
        if !request.applies() || self.0.changed(request.plan, request.state) {
            return None;
        }
        request.prior()
    }
}

/// Reuses the prior value of an Elasticsearch tier attribute, as long as the
/// tier existed before and the deployment stays on its template.
#[derive(Clone, Copy, Debug)]
pub struct UseTopologyStateForUnknown(pub Tier);

impl PlanModifier for UseTopologyStateForUnknown {
    fn modify(&self, request: &ModifyRequest<'_>) -> Option<Value> {
        if !request.applies() || !tier_existed(self.0, request.state) {
            return None;
        }
        if Trigger::deployment_template_id().changed(request.plan, request.state) {
            return None;
        }
        request.prior()
    }
}

/// Plans the node roles of a tier: null while the deployment has to stay on
/// node types, the prior roles otherwise.
#[derive(Clone, Copy, Debug)]
pub struct NodeRolesDefault(pub Tier);

impl PlanModifier for NodeRolesDefault {
    fn modify(&self, request: &ModifyRequest<'_>) -> Option<Value> {
        if !request.applies() {
            return None;
        }
        if !use_node_roles(request.plan, request.state)? {
            return Some(Value::Null);
        }
        tier_existed(self.0, request.state).then(|| request.prior()).flatten()
    }
}

/// Plans a node type flag of a tier: null once the deployment uses node
/// roles, the prior flag otherwise.
#[derive(Clone, Copy, Debug)]
pub struct NodeTypesDefault(pub Tier);

impl PlanModifier for NodeTypesDefault {
    fn modify(&self, request: &ModifyRequest<'_>) -> Option<Value> {
        if !request.applies() {
            return None;
        }
        if use_node_roles(request.plan, request.state)? {
            return Some(Value::Null);
        }
        tier_existed(self.0, request.state).then(|| request.prior()).flatten()
    }
}

fn tier_path(tier: Tier) -> AttributePath {
    AttributePath::root().attribute("elasticsearch").attribute(tier.to_string())
}

fn tier_existed(tier: Tier, state: &Value) -> bool {
    state.get(&tier_path(tier)).is_some_and(|tier| !tier.is_null())
}

/// Evaluates the node roles gate on the trees. [`None`] when the versions are
/// not known yet or invalid.
fn use_node_roles(plan: &Value, state: &Value) -> Option<bool> {
    let version_path = AttributePath::from("version");
    let planned = plan.get(&version_path)?.as_str()?;
    let current = state.get(&version_path).and_then(Value::as_str).unwrap_or_default();

    let has_node_types = <Tier as strum::IntoEnumIterator>::iter().any(|tier| {
        ["data", "master", "ingest", "ml"].iter().any(|flag| {
            let path = tier_path(tier).attribute(format!("node_type_{flag}"));
            state
                .get(&path)
                .and_then(Value::as_str)
                .is_some_and(|flag| !flag.is_empty())
        })
    });

    let gate = || -> Result<bool, version::Error> {
        Ok(version::compatible_with_node_roles(planned)?
            && version::legacy_to_node_roles(current, planned, has_node_types)?)
    };
    gate().ok()
}

/// The modifiers planned for one attribute, run in order.
#[derive(Debug)]
pub struct AttributeModifiers {
    pub path: AttributePath,
    pub modifiers: Vec<Box<dyn PlanModifier>>,
}

/// Runs `modifiers` over `plan`. Attributes missing from the plan, e.g. of
/// an unconfigured tier, are skipped.
pub fn apply_plan_modifiers(
    plan: &mut Value,
    state: &Value,
    config: &Value,
    modifiers: &[AttributeModifiers],
) -> Result<(), value::Error> {
    for attribute in modifiers {
        for modifier in &attribute.modifiers {
            let Some(plan_value) = plan.get(&attribute.path) else {
                continue;
            };
            let request = ModifyRequest {
                path: &attribute.path,
                plan_value,
                state_value: state.get(&attribute.path).unwrap_or(&Value::Null),
                config_value: config.get(&attribute.path).unwrap_or(&Value::Null),
                plan,
                state,
            };

            if let Some(value) = modifier.modify(&request) {
                debug!(path = %attribute.path, ?modifier, "planning prior value");
                plan.set(&attribute.path, value)?;
            }
        }
    }
    Ok(())
}
