use serde::{Deserialize, Serialize};
use super::{DataObject, Mapping, MappingIndex, MiddlewareCluster, TargetSystem};
use crate::PlannerError;

/// A planned replication landscape: what to send, where, and through which runtime
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub data_objects: Vec<DataObject>,
    pub targets: Vec<TargetSystem>,
    pub mappings: Vec<Mapping>,
    pub clusters: Vec<MiddlewareCluster>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_data_object(&mut self, object: DataObject) {
        self.data_objects.push(object);
    }

    pub fn add_target(&mut self, target: TargetSystem) {
        self.targets.push(target);
    }

    pub fn add_cluster(&mut self, cluster: MiddlewareCluster) {
        self.clusters.push(cluster);
    }

    pub fn add_mapping(&mut self, mapping: Mapping) {
        self.mappings.push(mapping);
    }

    pub fn get_data_object(&self, id: &str) -> Option<&DataObject> {
        self.data_objects.iter().find(|o| o.id == id)
    }

    pub fn get_target(&self, id: &str) -> Option<&TargetSystem> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn get_cluster(&self, id: &str) -> Option<&MiddlewareCluster> {
        self.clusters.iter().find(|c| c.id == id)
    }

    /// Whether the first mapping for this pair exists and is active
    pub fn is_mapped(&self, object_id: &str, target_id: &str) -> bool {
        MappingIndex::new(&self.mappings).is_active(object_id, target_id)
    }

    /// Targets that actively receive the given data object, in declaration order
    pub fn active_targets_for<'a>(
        &'a self,
        object_id: &'a str,
    ) -> impl Iterator<Item = &'a TargetSystem> + 'a {
        let index = MappingIndex::new(&self.mappings);
        self.targets
            .iter()
            .filter(move |t| index.is_active(object_id, &t.id))
    }

    /// Pre-flight check for hosts that want to reject a topology before estimating it.
    ///
    /// The engine itself tolerates every problem reported here.
    pub fn validate(&self) -> Result<(), PlannerError> {
        for object in &self.data_objects {
            if object.packet_size == 0 {
                return Err(PlannerError::InvalidTopology(format!(
                    "data object '{}' has a packet size of zero",
                    object.id
                )));
            }
            if object.payload_size_per_record_kb <= 0.0 {
                return Err(PlannerError::InvalidTopology(format!(
                    "data object '{}' has a non-positive record payload ({} KB)",
                    object.id, object.payload_size_per_record_kb
                )));
            }
        }

        for cluster in &self.clusters {
            if cluster.max_threads == 0
                || cluster.max_queues == 0
                || cluster.max_queue_capacity_mb <= 0.0
            {
                return Err(PlannerError::InvalidTopology(format!(
                    "cluster '{}' must have positive thread, queue and storage limits",
                    cluster.id
                )));
            }
        }

        for target in &self.targets {
            if self.get_cluster(&target.cluster_id).is_none() {
                return Err(PlannerError::UnknownCluster {
                    target: target.id.clone(),
                    cluster: target.cluster_id.clone(),
                });
            }
            if target.api_rate_limit_rpm <= 0.0 {
                return Err(PlannerError::InvalidTopology(format!(
                    "target '{}' has a non-positive API rate limit",
                    target.id
                )));
            }
            if target.target_packet_size == Some(0) {
                return Err(PlannerError::InvalidTopology(format!(
                    "target '{}' has a packet size of zero",
                    target.id
                )));
            }
        }

        for mapping in &self.mappings {
            if self.get_data_object(&mapping.object_id).is_none() {
                return Err(PlannerError::UnknownReference {
                    kind: "data object",
                    id: mapping.object_id.clone(),
                });
            }
            if self.get_target(&mapping.target_id).is_none() {
                return Err(PlannerError::UnknownReference {
                    kind: "target",
                    id: mapping.target_id.clone(),
                });
            }
        }

        Ok(())
    }

    /// The stock planning scenario: three master data objects fanned out over two regions
    pub fn sample() -> Self {
        let mut topology = Self::new();

        topology.add_data_object(DataObject::new("1", "Customer Master", 500_000, 100, 1.5));
        topology.add_data_object(DataObject::new("2", "Material Master", 1_200_000, 200, 2.0));
        topology.add_data_object(DataObject::new("3", "Vendor Master", 50_000, 50, 1.2));

        topology.add_cluster(MiddlewareCluster::new("c1", "MuleSoft US Region", 50, 10, 5000.0));
        topology.add_cluster(MiddlewareCluster::new("c2", "SAP CPI EU Region", 20, 5, 2000.0));

        topology.add_target(TargetSystem::new("t1", "c1", "SAP S/4HANA (US)", 3000.0));
        topology.add_target(TargetSystem::new("t2", "c1", "Salesforce CRM", 1000.0).scheduled(15));
        topology.add_target(TargetSystem::new("t3", "c2", "Legacy ERP", 300.0));

        topology.add_mapping(Mapping::active("1", "t1"));
        topology.add_mapping(Mapping::active("1", "t2"));
        topology.add_mapping(Mapping::active("2", "t1"));
        topology.add_mapping(Mapping::active("2", "t3"));
        topology.add_mapping(Mapping::active("3", "t1"));

        topology
    }
}
