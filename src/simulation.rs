use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::aggregator::{ClusterAggregator, ClusterHealth, ClusterUsage};
use crate::config::GlobalConfig;
use crate::models::{
    ClusterId, DataObject, Mapping, MappingIndex, MiddlewareCluster, ObjectId, TargetId,
    TargetSystem,
};
use crate::queue::{self, QueueEstimate};
use crate::rates::{self, RateEstimate, SyncBounds};

/// Projected figures for one active (data object, target) route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub object_id: ObjectId,
    pub object_name: String,
    pub target_id: TargetId,
    pub target_name: String,
    pub cluster_id: ClusterId,

    pub total_records: u64,
    pub total_packets: u64,
    pub payload_per_packet_kb: f64,
    pub total_data_mb: f64,

    pub split_factor: u64,
    pub effective_target_packet_size: u64,

    pub theoretical_inbound_rps: f64,
    pub middleware_limit_rps: Option<f64>,
    pub effective_inbound_rps: f64,
    pub throttled_rps: f64,
    pub is_throttled: bool,
    pub inbound_throughput_records_per_sec: f64,
    pub outbound_records_per_sec: f64,

    pub used_threads: f64,
    pub is_thread_bound: bool,
    pub sync_bounds: Option<SyncBounds>,

    pub completion_time_secs: f64,
    pub max_queue_depth_records: f64,
    pub max_queue_depth_packets: u64,
    pub max_queue_storage_mb: f64,
}

impl RouteResult {
    fn new(
        object: &DataObject,
        target: &TargetSystem,
        rates: RateEstimate,
        queue: QueueEstimate,
    ) -> Self {
        Self {
            object_id: object.id.clone(),
            object_name: object.name.clone(),
            target_id: target.id.clone(),
            target_name: target.name.clone(),
            cluster_id: target.cluster_id.clone(),
            total_records: object.volume,
            total_packets: object.total_packets(),
            payload_per_packet_kb: object.payload_per_packet_kb(),
            total_data_mb: object.total_data_mb(),
            split_factor: rates.split_factor,
            effective_target_packet_size: rates.effective_packet_size,
            theoretical_inbound_rps: rates.theoretical_inbound_rps,
            middleware_limit_rps: rates.middleware_limit_rps,
            effective_inbound_rps: rates.effective_inbound_rps,
            throttled_rps: rates.throttled_rps,
            is_throttled: rates.is_throttled,
            inbound_throughput_records_per_sec: rates.inbound_records_per_sec,
            outbound_records_per_sec: rates.outbound_records_per_sec,
            used_threads: rates.used_threads,
            is_thread_bound: rates.is_thread_bound,
            sync_bounds: rates.sync_bounds,
            completion_time_secs: queue.completion_time_secs,
            max_queue_depth_records: queue.peak_depth_records,
            max_queue_depth_packets: queue.peak_depth_packets,
            max_queue_storage_mb: queue.peak_storage_mb,
        }
    }
}

/// Everything a run projects: per-route figures, per-cluster health and the aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub routes: Vec<RouteResult>,
    pub cluster_health: Vec<ClusterHealth>,
    pub total_api_requests: u64,
    pub peak_inbound_rps: f64,               // Sum of effective inbound rates over all routes
    pub required_network_throughput_mbps: f64,
    pub total_storage_required_mb: f64,      // Raw demand, not capped by any cluster
    pub overall_completion_time_secs: f64,
}

impl SimulationResult {
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn throttled_routes(&self) -> impl Iterator<Item = &RouteResult> {
        self.routes.iter().filter(|r| r.is_throttled)
    }

    pub fn breached_clusters(&self) -> impl Iterator<Item = &ClusterHealth> {
        self.cluster_health.iter().filter(|h| h.is_breached())
    }

    pub fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            route_count: self.routes.len(),
            throttled_route_count: self.throttled_routes().count(),
            thread_bound_route_count: self.routes.iter().filter(|r| r.is_thread_bound).count(),
            breached_cluster_count: self.breached_clusters().count(),
            total_api_requests: self.total_api_requests,
            peak_inbound_rps: self.peak_inbound_rps,
            required_network_throughput_mbps: self.required_network_throughput_mbps,
            total_storage_required_mb: self.total_storage_required_mb,
            overall_completion_time_secs: self.overall_completion_time_secs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub route_count: usize,
    pub throttled_route_count: usize,
    pub thread_bound_route_count: usize,
    pub breached_cluster_count: usize,
    pub total_api_requests: u64,
    pub peak_inbound_rps: f64,
    pub required_network_throughput_mbps: f64,
    pub total_storage_required_mb: f64,
    pub overall_completion_time_secs: f64,
}

impl std::fmt::Display for SimulationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Routes: {} ({} throttled, {} thread-bound), API Requests: {}, Peak Load: {:.1} RPS, Bandwidth: {:.2} MB/s, Storage: {:.1} MB, Duration: {}, Breached Clusters: {}",
            self.route_count,
            self.throttled_route_count,
            self.thread_bound_route_count,
            self.total_api_requests,
            self.peak_inbound_rps,
            self.required_network_throughput_mbps,
            self.total_storage_required_mb,
            format_duration(self.overall_completion_time_secs),
            self.breached_cluster_count
        )
    }
}

/// Human-scale rendering of a duration in seconds
pub fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{:.1} sec", seconds)
    } else if seconds < 3600.0 {
        format!("{:.1} min", seconds / 60.0)
    } else {
        format!("{:.1} hrs", seconds / 3600.0)
    }
}

/// Partial totals over a subset of data objects; combining is associative
struct RunTotals {
    routes: Vec<RouteResult>,
    clusters: ClusterAggregator,
    total_api_requests: u64,
    peak_inbound_rps: f64,
    max_packet_payload_kb: f64,
}

impl RunTotals {
    fn new(clusters: &[MiddlewareCluster]) -> Self {
        Self {
            routes: Vec::new(),
            clusters: ClusterAggregator::new(clusters),
            total_api_requests: 0,
            peak_inbound_rps: 0.0,
            max_packet_payload_kb: 0.0,
        }
    }

    fn combine(mut self, other: RunTotals) -> Self {
        self.routes.extend(other.routes);
        self.clusters = self.clusters.merge(other.clusters);
        self.total_api_requests = self.total_api_requests.saturating_add(other.total_api_requests);
        self.peak_inbound_rps += other.peak_inbound_rps;
        self.max_packet_payload_kb = self.max_packet_payload_kb.max(other.max_packet_payload_kb);
        self
    }
}

fn evaluate_object(
    object: &DataObject,
    targets: &[TargetSystem],
    mappings: &MappingIndex<'_>,
    config: &GlobalConfig,
    clusters: &[MiddlewareCluster],
) -> RunTotals {
    let mut totals = RunTotals::new(clusters);
    totals.max_packet_payload_kb = object.payload_per_packet_kb();

    let mut active_target_count: u64 = 0;

    for target in targets {
        if !mappings.is_active(&object.id, &target.id) {
            continue;
        }
        active_target_count += 1;

        let rates = rates::estimate(object, target, config);
        let queue = queue::estimate(object, &rates, config.integration_pattern);

        debug!(
            object = %object.id,
            target = %target.id,
            cluster = %target.cluster_id,
            split_factor = rates.split_factor,
            inbound_rps = rates.effective_inbound_rps,
            throttled = rates.is_throttled,
            thread_bound = rates.is_thread_bound,
            completion_secs = queue.completion_time_secs,
            peak_storage_mb = queue.peak_storage_mb,
            "evaluated route"
        );

        let contribution = ClusterUsage::for_route(
            rates.used_threads,
            queue.peak_storage_mb,
            config.integration_pattern,
        );
        totals.clusters.accumulate(&target.cluster_id, contribution);
        totals.peak_inbound_rps += rates.effective_inbound_rps;
        totals.routes.push(RouteResult::new(object, target, rates, queue));
    }

    // Saturates instead of wrapping for volumes near u64::MAX
    totals.total_api_requests = object.total_packets().saturating_mul(active_target_count);
    totals
}

#[cfg(any(not(feature = "parallel"), test))]
fn collect_sequential(
    data_objects: &[DataObject],
    targets: &[TargetSystem],
    mappings: &MappingIndex<'_>,
    config: &GlobalConfig,
    clusters: &[MiddlewareCluster],
) -> RunTotals {
    data_objects
        .iter()
        .map(|object| evaluate_object(object, targets, mappings, config, clusters))
        .fold(RunTotals::new(clusters), RunTotals::combine)
}

#[cfg(feature = "parallel")]
fn collect_parallel(
    data_objects: &[DataObject],
    targets: &[TargetSystem],
    mappings: &MappingIndex<'_>,
    config: &GlobalConfig,
    clusters: &[MiddlewareCluster],
) -> RunTotals {
    use rayon::prelude::*;

    data_objects
        .par_iter()
        .map(|object| evaluate_object(object, targets, mappings, config, clusters))
        .reduce(|| RunTotals::new(clusters), RunTotals::combine)
}

fn assemble(totals: RunTotals, clusters: &[MiddlewareCluster]) -> SimulationResult {
    // Conservative: the heaviest packet observed, applied to the whole aggregate rate
    let required_network_throughput_mbps =
        totals.peak_inbound_rps * totals.max_packet_payload_kb / 1024.0;
    let total_storage_required_mb = totals.routes.iter().map(|r| r.max_queue_storage_mb).sum();
    let overall_completion_time_secs = totals
        .routes
        .iter()
        .map(|r| r.completion_time_secs)
        .fold(0.0, f64::max);

    SimulationResult {
        cluster_health: totals.clusters.finish(clusters),
        routes: totals.routes,
        total_api_requests: totals.total_api_requests,
        peak_inbound_rps: totals.peak_inbound_rps,
        required_network_throughput_mbps,
        total_storage_required_mb,
        overall_completion_time_secs,
    }
}

/// Project load, backlog and cluster health for a replication topology.
///
/// Pure and infallible: dangling cluster references are excluded from cluster
/// totals and every divisor is floored.
pub fn compute(
    data_objects: &[DataObject],
    targets: &[TargetSystem],
    mappings: &[Mapping],
    config: &GlobalConfig,
    clusters: &[MiddlewareCluster],
) -> SimulationResult {
    let index = MappingIndex::new(mappings);

    #[cfg(feature = "parallel")]
    let totals = collect_parallel(data_objects, targets, &index, config, clusters);

    #[cfg(not(feature = "parallel"))]
    let totals = collect_sequential(data_objects, targets, &index, config, clusters);

    let result = assemble(totals, clusters);

    info!(
        routes = result.routes.len(),
        peak_inbound_rps = result.peak_inbound_rps,
        total_api_requests = result.total_api_requests,
        breached_clusters = result.breached_clusters().count(),
        "simulation complete"
    );

    result
}
