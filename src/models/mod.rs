// Type aliases used across models
pub type ObjectId = String;
pub type TargetId = String;
pub type ClusterId = String;

// Module declarations
mod data_object;
mod cluster;
mod target;
mod mapping;
mod topology;

// Re-exports
pub use data_object::DataObject;
pub use cluster::MiddlewareCluster;
pub use target::{ReplicationMode, TargetSystem};
pub use mapping::{Mapping, MappingIndex};
pub use topology::Topology;
