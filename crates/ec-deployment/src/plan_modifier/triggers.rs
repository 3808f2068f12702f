use std::collections::BTreeMap;

use crate::value::{AttributePath, Value};

/// Attributes in list shaped topologies which identify an element.
const IDENTITY_ATTRIBUTES: [&str; 2] = ["id", "instance_configuration_id"];

/// A sibling attribute whose change invalidates the prior value of the
/// attribute being planned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Trigger {
    Attribute(AttributePath),

    /// A topology collection at `path`. With `members` the collection is the
    /// object holding those members (e.g. the tiers of a resource), without it
    /// is a list whose elements are identified by [`IDENTITY_ATTRIBUTES`].
    Topology {
        path: AttributePath,
        members: Vec<String>,
    },
}

impl Trigger {
    pub fn version() -> Self {
        Self::Attribute("version".into())
    }

    pub fn deployment_template_id() -> Self {
        Self::Attribute("deployment_template_id".into())
    }

    /// Returns whether the trigger differs between `plan` and `state`. An
    /// unknown attribute has changed, unless it is nested in a topology
    /// element.
    pub fn changed(&self, plan: &Value, state: &Value) -> bool {
        match self {
            Self::Attribute(path) => {
                let planned = plan.get(path).unwrap_or(&Value::Null);
                planned.is_unknown() || planned != state.get(path).unwrap_or(&Value::Null)
            }
            Self::Topology { path, members } => {
                let planned = plan.get(path).unwrap_or(&Value::Null);
                if planned.is_unknown() {
                    return true;
                }
                let current = state.get(path).unwrap_or(&Value::Null);

                let (Some(planned), Some(current)) = (
                    topology_elements(planned, members),
                    topology_elements(current, members),
                ) else {
                    return true;
                };
                topology_changed(&planned, &current)
            }
        }
    }
}

/// Keys the elements of a topology collection. Null and absent elements are
/// left out. [`None`] when an element cannot be identified.
fn topology_elements<'a>(
    collection: &'a Value,
    members: &[String],
) -> Option<BTreeMap<String, &'a Value>> {
    if !members.is_empty() {
        let Value::Object(object) = collection else {
            return collection.is_null().then(BTreeMap::new);
        };
        return Some(
            members
                .iter()
                .filter_map(|member| {
                    object
                        .get(member)
                        .filter(|element| !element.is_null())
                        .map(|element| (member.clone(), element))
                })
                .collect(),
        );
    }

    match collection {
        Value::Null => Some(BTreeMap::new()),
        Value::List(elements) => elements
            .iter()
            .map(|element| Some((element_identity(element)?, element)))
            .collect(),
        _ => None,
    }
}

fn element_identity(element: &Value) -> Option<String> {
    let Value::Object(attributes) = element else {
        return None;
    };
    IDENTITY_ATTRIBUTES
        .iter()
        .find_map(|attribute| attributes.get(*attribute)?.as_str())
        .filter(|identity| !identity.is_empty())
        .map(str::to_owned)
}

fn topology_changed(
    planned: &BTreeMap<String, &Value>,
    current: &BTreeMap<String, &Value>,
) -> bool {
    if planned.keys().ne(current.keys()) {
        return true;
    }
    planned.iter().any(|(key, planned)| {
        current
            .get(key)
            .is_none_or(|current| element_changed(planned, current))
    })
}

/// Compares two topology elements, skipping attributes not yet known in the
/// plan.
fn element_changed(planned: &Value, current: &Value) -> bool {
    match (planned, current) {
        (Value::Unknown, _) => false,
        (Value::Object(planned), Value::Object(current)) => {
            planned.keys().chain(current.keys()).any(|key| {
                let planned = planned.get(key).unwrap_or(&Value::Null);
                let current = current.get(key).unwrap_or(&Value::Null);
                element_changed(planned, current)
            })
        }
        (planned, current) => planned != current,
    }
}
