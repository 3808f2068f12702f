//! Reconciliation core for hosted search deployments.
//!
//! The crate translates between the user facing deployment model
//! ([`deployment::Deployment`]) and the deployment API:
//!
//! - [`deployment::read_deployment`] flattens an API response into state.
//! - [`deployment::create_request`] and [`deployment::update_request`] turn
//!   the desired state into request payloads, starting from the topology the
//!   chosen deployment template provides.
//! - [`plan_modifier`] decides which computed attributes keep their prior
//!   values while planning.
//!
//! Invalid configuration is reported as [`diagnostics::Diagnostics`] instead
//! of aborting at the first problem.

pub mod apm;
pub mod deployment;
pub mod diagnostics;
pub mod elasticsearch;
pub mod endpoints;
pub mod enterprise_search;
pub mod integrations_server;
pub mod kibana;
pub mod logging;
pub mod node_roles;
pub mod observability;
pub mod plan_modifier;
pub mod size;
pub mod state_upgrade;
pub mod stateless;
pub mod topology;
pub mod user_settings;
pub mod value;
pub mod version;
