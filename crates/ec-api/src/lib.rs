//! Wire model of the deployment API together with the collaborator interface
//! the reconciliation core calls into.
//!
//! The structs in [`models`] mirror the JSON documents exchanged with the
//! platform. Optional fields are omitted from serialized output instead of
//! being sent as `null`, because the API treats an absent field as "leave
//! unchanged" while an explicit value is applied.
//!
//! ```
//! use ec_api::models::{ResourceKind, TopologySize};
//!
//! let size = TopologySize::memory(4096);
//! assert_eq!(size.value_or_zero(), 4096);
//! assert_eq!(ResourceKind::IntegrationsServer.to_string(), "integrations_server");
//! ```

mod client;
pub mod models;

pub use client::*;
