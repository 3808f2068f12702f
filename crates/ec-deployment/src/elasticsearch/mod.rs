//! The Elasticsearch resource: its state model, the reader turning API
//! responses into state and the payload builder turning state into requests.

mod model;
pub mod payload;
pub mod read;
pub mod remote_clusters;

pub use model::*;
pub use payload::{PayloadOptions, elasticsearch_payload};
pub use read::{is_potentially_sized, read_elasticsearch, read_elasticsearches};
pub use remote_clusters::{handle_remote_cluster_changes, remote_clusters_payload};
