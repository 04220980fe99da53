// Replication Capacity Planner
// Estimates whether a middleware layer can carry a planned master data replication load

pub mod models;
pub mod config;
pub mod rates;
pub mod queue;
pub mod aggregator;
pub mod simulation;

pub use models::{DataObject, Mapping, MiddlewareCluster, ReplicationMode, TargetSystem, Topology};
pub use config::{GlobalConfig, IntegrationPattern};
pub use aggregator::{BreachKind, CapacityBreach, ClusterAggregator, ClusterHealth, ClusterUsage};
pub use simulation::{compute, format_duration, RouteResult, SimulationResult, SimulationSummary};

/// Main entry point for estimating a topology under one global configuration
pub struct Planner {
    config: GlobalConfig,
}

impl Planner {
    pub fn new(config: GlobalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// Estimate the topology as given, tolerating dangling references and invalid divisors
    pub fn run(&self, topology: &Topology) -> SimulationResult {
        compute(
            &topology.data_objects,
            &topology.targets,
            &topology.mappings,
            &self.config,
            &topology.clusters,
        )
    }

    /// Reject an invalid topology or configuration before estimating it
    pub fn run_checked(&self, topology: &Topology) -> Result<SimulationResult, PlannerError> {
        self.config.validate()?;
        topology.validate()?;
        Ok(self.run(topology))
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(GlobalConfig::default())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Target '{target}' references unknown cluster '{cluster}'")]
    UnknownCluster { target: String, cluster: String },

    #[error("Unknown {kind} '{id}'")]
    UnknownReference { kind: &'static str, id: String },
}
