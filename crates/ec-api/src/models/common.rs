use serde::{Deserialize, Serialize};

/// Lifecycle status reported for resources which have been shut down.
pub const STATUS_STOPPED: &str = "stopped";

/// The default resource type of a [`TopologySize`].
pub const SIZE_RESOURCE_MEMORY: &str = "memory";

/// Capacity of a topology element, e.g. `{ "value": 4096, "resource": "memory" }`.
///
/// Values are expressed in the platform's base unit, which is megabytes for
/// memory.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TopologySize {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

impl TopologySize {
    pub fn new(value: i32, resource: impl Into<String>) -> Self {
        Self {
            value: Some(value),
            resource: Some(resource.into()),
        }
    }

    pub fn memory(value: i32) -> Self {
        Self::new(value, SIZE_RESOURCE_MEMORY)
    }

    pub fn value_or_zero(&self) -> i32 {
        self.value.unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ClusterMetadataPortInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ServiceUrl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ClusterMetadataInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<ClusterMetadataPortInfo>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services_urls: Vec<ServiceUrl>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ClusterPlanInfo<P> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<P>,
}

/// The plans known for a resource. Only the `current` plan is reconciled into
/// state, a `pending` plan is still being applied.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ClusterPlansInfo<P> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<ClusterPlanInfo<P>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<ClusterPlanInfo<P>>,
}

impl<P> ClusterPlansInfo<P> {
    pub fn current_plan(&self) -> Option<&P> {
        self.current.as_ref().and_then(|current| current.plan.as_ref())
    }
}
