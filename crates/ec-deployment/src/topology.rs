//! Matching configured topology elements against the candidates a deployment
//! template offers, and the per-kind sizing floors applied to defaulted
//! elements.

use ec_api::models::{
    ElasticsearchClusterTopologyElement, ResourceKind, StatelessTopologyElement, TopologySize,
};
use snafu::Snafu;

use crate::diagnostics::Diagnostic;

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Eq, PartialEq, Snafu)]
pub enum Error {
    #[snafu(display("invalid id ('{id}'): valid topology IDs are {}", quoted(valid)))]
    NotFound { id: String, valid: Vec<String> },

    #[snafu(display("the deployment template does not contain any topology element"))]
    EmptyTemplate,
}

fn quoted(ids: &[String]) -> String {
    ids.iter()
        .map(|id| format!("{id:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The stable key a template uses for one of its topology elements.
pub trait TopologyIdentity {
    fn identity(&self) -> &str;
}

impl TopologyIdentity for ElasticsearchClusterTopologyElement {
    fn identity(&self) -> &str {
        &self.id
    }
}

impl TopologyIdentity for StatelessTopologyElement {
    fn identity(&self) -> &str {
        &self.instance_configuration_id
    }
}

/// Returns the candidate whose identity is `id`.
pub fn match_topology<'a, T: TopologyIdentity>(id: &str, candidates: &'a [T]) -> Result<&'a T> {
    match_topology_index(id, candidates).map(|index| &candidates[index])
}

/// Returns the position of the candidate whose identity is `id`.
pub fn match_topology_index<T: TopologyIdentity>(id: &str, candidates: &[T]) -> Result<usize> {
    candidates
        .iter()
        .position(|candidate| candidate.identity() == id)
        .ok_or_else(|| Error::NotFound {
            id: id.to_owned(),
            valid: candidates
                .iter()
                .map(|candidate| candidate.identity().to_owned())
                .collect(),
        })
}

/// Like [`match_topology`], but an empty `id` selects the candidate at
/// `position` instead.
pub fn match_topology_or_position<'a, T: TopologyIdentity>(
    id: &str,
    position: usize,
    candidates: &'a [T],
) -> Result<&'a T> {
    if id.is_empty() {
        return candidates
            .get(position)
            .or_else(|| candidates.first())
            .ok_or(Error::EmptyTemplate);
    }
    match_topology(id, candidates)
}

/// The error reported when a kind is configured but the template has no
/// default payload for it.
pub fn missing_template_slot(kind: ResourceKind) -> Diagnostic {
    Diagnostic::error(
        format!("{kind} payload error"),
        format!(
            "{kind} specified but deployment template is not configured for it. \
             Use a different template if you wish to add {kind}"
        ),
    )
    .at(kind.to_string())
}

/// Sizing floors of a product kind.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Minimums {
    /// In megabytes.
    pub size: i32,
    pub zone_count: i32,
}

pub trait ProductMinimums {
    /// The floors applied to template defaults, [`None`] when the kind has
    /// none.
    fn minimums(self) -> Option<Minimums>;
}

impl ProductMinimums for ResourceKind {
    fn minimums(self) -> Option<Minimums> {
        let size = match self {
            Self::Elasticsearch => return None,
            Self::Kibana | Self::IntegrationsServer => 1024,
            Self::Apm => 512,
            Self::EnterpriseSearch => 2048,
        };
        Some(Minimums {
            size,
            zone_count: 1,
        })
    }
}

/// Raises a defaulted element's size and zone count to the given floors. The
/// resource of an existing size is kept.
pub fn apply_minimums(
    size: &mut Option<TopologySize>,
    zone_count: &mut i32,
    minimums: Minimums,
) {
    let size = size.get_or_insert_with(|| TopologySize::memory(0));
    if size.value_or_zero() < minimums.size {
        size.value = Some(minimums.size);
    }
    if *zone_count < minimums.zone_count {
        *zone_count = minimums.zone_count;
    }
}
