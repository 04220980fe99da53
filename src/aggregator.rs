use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;
use crate::config::IntegrationPattern;
use crate::models::{ClusterId, MiddlewareCluster};

/// Resources a set of routes draws from one cluster
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterUsage {
    pub used_threads: f64,
    pub active_queues: u32,
    pub total_storage_mb: f64,
}

impl ClusterUsage {
    /// What a single route contributes to its owning cluster
    pub fn for_route(used_threads: f64, peak_storage_mb: f64, pattern: IntegrationPattern) -> Self {
        match pattern {
            IntegrationPattern::Async => Self {
                used_threads,
                active_queues: 1,
                total_storage_mb: peak_storage_mb,
            },
            IntegrationPattern::Sync => Self {
                used_threads,
                active_queues: 0,
                total_storage_mb: 0.0,
            },
        }
    }
}

impl std::ops::Add for ClusterUsage {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            used_threads: self.used_threads + other.used_threads,
            active_queues: self.active_queues + other.active_queues,
            total_storage_mb: self.total_storage_mb + other.total_storage_mb,
        }
    }
}

impl std::ops::AddAssign for ClusterUsage {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl std::iter::Sum for ClusterUsage {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(ClusterUsage::default(), |acc, usage| acc + usage)
    }
}

/// Which cluster limit was exceeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreachKind {
    Threads,
    Queues,
    Storage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityBreach {
    pub cluster_id: ClusterId,
    pub kind: BreachKind,
    pub used: f64,
    pub limit: f64,
}

impl CapacityBreach {
    pub fn description(&self) -> String {
        match self.kind {
            BreachKind::Threads => format!(
                "Cluster {} needs {} threads (max: {})",
                self.cluster_id, self.used, self.limit
            ),
            BreachKind::Queues => format!(
                "Cluster {} needs {} queues (max: {})",
                self.cluster_id, self.used, self.limit
            ),
            BreachKind::Storage => format!(
                "Cluster {} needs {:.1} MB of queue storage (max: {:.1} MB)",
                self.cluster_id, self.used, self.limit
            ),
        }
    }
}

/// Usage as fractions of capacity (1.0 = full)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterUtilization {
    pub threads: f64,
    pub queues: f64,
    pub storage: f64,
}

impl ClusterUtilization {
    pub fn max_utilization(&self) -> f64 {
        self.threads.max(self.queues).max(self.storage)
    }

    pub fn is_over_threshold(&self, threshold: f64) -> bool {
        self.max_utilization() > threshold
    }
}

fn ratio(used: f64, limit: f64) -> f64 {
    if limit > 0.0 {
        used / limit
    } else if used > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

/// Aggregated load on one cluster compared against its limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterHealth {
    pub cluster_id: ClusterId,
    pub cluster_name: String,
    pub active_queues: u32,
    pub max_queues: u32,
    pub used_threads: u64,
    pub max_threads: u32,
    pub total_storage_used_mb: f64,
    pub max_storage_mb: f64,
    pub is_queue_count_breached: bool,
    pub is_thread_count_breached: bool,
    pub has_storage_warning: bool,
}

impl ClusterHealth {
    pub fn evaluate(cluster: &MiddlewareCluster, usage: &ClusterUsage) -> Self {
        let used_threads = usage.used_threads.max(0.0).ceil() as u64;

        Self {
            cluster_id: cluster.id.clone(),
            cluster_name: cluster.name.clone(),
            active_queues: usage.active_queues,
            max_queues: cluster.max_queues,
            used_threads,
            max_threads: cluster.max_threads,
            total_storage_used_mb: usage.total_storage_mb,
            max_storage_mb: cluster.max_queue_capacity_mb,
            is_queue_count_breached: usage.active_queues > cluster.max_queues,
            is_thread_count_breached: used_threads > cluster.max_threads as u64,
            has_storage_warning: usage.total_storage_mb > cluster.max_queue_capacity_mb,
        }
    }

    pub fn is_breached(&self) -> bool {
        self.is_queue_count_breached || self.is_thread_count_breached || self.has_storage_warning
    }

    pub fn utilization(&self) -> ClusterUtilization {
        ClusterUtilization {
            threads: ratio(self.used_threads as f64, self.max_threads as f64),
            queues: ratio(self.active_queues as f64, self.max_queues as f64),
            storage: ratio(self.total_storage_used_mb, self.max_storage_mb),
        }
    }

    /// Every exceeded limit, threads first
    pub fn breaches(&self) -> Vec<CapacityBreach> {
        let mut breaches = Vec::new();

        if self.is_thread_count_breached {
            breaches.push(CapacityBreach {
                cluster_id: self.cluster_id.clone(),
                kind: BreachKind::Threads,
                used: self.used_threads as f64,
                limit: self.max_threads as f64,
            });
        }
        if self.is_queue_count_breached {
            breaches.push(CapacityBreach {
                cluster_id: self.cluster_id.clone(),
                kind: BreachKind::Queues,
                used: self.active_queues as f64,
                limit: self.max_queues as f64,
            });
        }
        if self.has_storage_warning {
            breaches.push(CapacityBreach {
                cluster_id: self.cluster_id.clone(),
                kind: BreachKind::Storage,
                used: self.total_storage_used_mb,
                limit: self.max_storage_mb,
            });
        }

        breaches
    }
}

/// Running per-cluster totals for a single run
#[derive(Debug, Clone)]
pub struct ClusterAggregator {
    usage: HashMap<ClusterId, ClusterUsage>,
}

impl ClusterAggregator {
    /// Start from zero usage on every known cluster
    pub fn new(clusters: &[MiddlewareCluster]) -> Self {
        Self {
            usage: clusters
                .iter()
                .map(|c| (c.id.clone(), ClusterUsage::default()))
                .collect(),
        }
    }

    /// Fold one route into its cluster. Returns false when the cluster is unknown
    /// and the contribution was dropped.
    pub fn accumulate(&mut self, cluster_id: &str, contribution: ClusterUsage) -> bool {
        match self.usage.get_mut(cluster_id) {
            Some(usage) => {
                *usage += contribution;
                true
            }
            None => {
                warn!(cluster_id, "route references unknown cluster; excluded from cluster totals");
                false
            }
        }
    }

    /// Combine totals gathered over disjoint sets of routes
    pub fn merge(mut self, other: ClusterAggregator) -> Self {
        for (cluster_id, usage) in other.usage {
            *self.usage.entry(cluster_id).or_default() += usage;
        }
        self
    }

    pub fn usage(&self, cluster_id: &str) -> Option<&ClusterUsage> {
        self.usage.get(cluster_id)
    }

    /// Health per configured cluster, in configuration order
    pub fn finish(self, clusters: &[MiddlewareCluster]) -> Vec<ClusterHealth> {
        clusters
            .iter()
            .map(|cluster| {
                let usage = self.usage.get(&cluster.id).copied().unwrap_or_default();
                ClusterHealth::evaluate(cluster, &usage)
            })
            .collect()
    }
}
