use serde::{Deserialize, Serialize};
use super::ClusterId;

/// A middleware runtime with finite shared capacity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiddlewareCluster {
    pub id: ClusterId,
    pub name: String,
    pub max_threads: u32,       // Concurrent processing threads in this runtime
    pub max_queues: u32,        // Queues allowed in this cluster
    pub max_queue_capacity_mb: f64, // Storage for the entire cluster, not per queue
}

impl MiddlewareCluster {
    pub fn new(
        id: impl Into<ClusterId>,
        name: impl Into<String>,
        max_threads: u32,
        max_queues: u32,
        max_queue_capacity_mb: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            max_threads,
            max_queues,
            max_queue_capacity_mb,
        }
    }
}
