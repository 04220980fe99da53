use serde::{Deserialize, Serialize};
use crate::config::{GlobalConfig, IntegrationPattern};
use crate::models::{DataObject, TargetSystem};

/// Per-call latency assumed for a target without a usable rate limit (seconds)
pub const FALLBACK_TARGET_LATENCY_SECS: f64 = 0.1;

/// Bottleneck analysis for request-reply delivery
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyncBounds {
    /// Middleware overhead plus every split call to the target
    pub round_trip_secs: f64,
    /// Source requests per second the channel pool can complete
    pub thread_bound_rps: f64,
    /// Source requests per second the target's API limit admits
    pub target_bound_rps: f64,
}

/// Rates for one route, before any queueing is considered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEstimate {
    pub effective_packet_size: u64,
    pub split_factor: u64,             // Target calls per source request
    pub theoretical_inbound_rps: f64,  // Achievable without the middleware ingress cap
    pub middleware_limit_rps: Option<f64>,
    pub effective_inbound_rps: f64,
    pub throttled_rps: f64,
    pub is_throttled: bool,
    pub inbound_records_per_sec: f64,
    pub outbound_records_per_sec: f64,
    pub used_threads: f64,
    pub is_thread_bound: bool,
    pub sync_bounds: Option<SyncBounds>,
}

/// Number of target calls one source request fans out into
pub fn split_factor(source_packet_size: u64, effective_packet_size: u64) -> u64 {
    source_packet_size.max(1).div_ceil(effective_packet_size.max(1))
}

/// Caps a theoretical rate at the ingress limit; the flag is set only when the cap binds
pub fn apply_ingress_limit(theoretical_rps: f64, limit_rps: Option<f64>) -> (f64, bool) {
    match limit_rps {
        Some(limit) if theoretical_rps > limit => (limit, true),
        _ => (theoretical_rps, false),
    }
}

/// Seconds the middleware spends on one target call
pub fn target_latency_secs(api_rate_limit_rpm: f64) -> f64 {
    if api_rate_limit_rpm > 0.0 {
        60.0 / api_rate_limit_rpm
    } else {
        FALLBACK_TARGET_LATENCY_SECS
    }
}

/// Estimate rates for one (data object, target) route
pub fn estimate(object: &DataObject, target: &TargetSystem, config: &GlobalConfig) -> RateEstimate {
    match config.integration_pattern {
        IntegrationPattern::Async => estimate_async(object, target, config),
        IntegrationPattern::Sync => estimate_sync(object, target, config),
    }
}

fn estimate_async(
    object: &DataObject,
    target: &TargetSystem,
    config: &GlobalConfig,
) -> RateEstimate {
    let source_packet_size = object.safe_packet_size();
    let effective_packet_size = target.effective_packet_size(source_packet_size);
    let split_factor = split_factor(source_packet_size, effective_packet_size);
    let concurrency = config.concurrency as f64;

    // Each channel completes one middleware round trip per overhead period
    let theoretical_inbound_rps = (1000.0 / config.safe_overhead_ms()) * concurrency;
    let middleware_limit_rps = target.ingress_limit_rps();
    let (effective_inbound_rps, is_throttled) =
        apply_ingress_limit(theoretical_inbound_rps, middleware_limit_rps);

    let inbound_records_per_sec = effective_inbound_rps * source_packet_size as f64;
    let outbound_records_per_sec =
        (target.api_rate_limit_rpm.max(0.0) / 60.0) * effective_packet_size as f64;

    RateEstimate {
        effective_packet_size,
        split_factor,
        theoretical_inbound_rps,
        middleware_limit_rps,
        effective_inbound_rps,
        throttled_rps: theoretical_inbound_rps - effective_inbound_rps,
        is_throttled,
        inbound_records_per_sec,
        outbound_records_per_sec,
        used_threads: concurrency,
        is_thread_bound: false,
        sync_bounds: None,
    }
}

fn estimate_sync(
    object: &DataObject,
    target: &TargetSystem,
    config: &GlobalConfig,
) -> RateEstimate {
    let source_packet_size = object.safe_packet_size();
    let effective_packet_size = target.effective_packet_size(source_packet_size);
    let split_factor = split_factor(source_packet_size, effective_packet_size);
    let concurrency = config.concurrency as f64;

    // The middleware completes every split call before answering the source
    let target_calls_secs = split_factor as f64 * target_latency_secs(target.api_rate_limit_rpm);
    let round_trip_secs = config.overhead_secs() + target_calls_secs;
    let thread_bound_rps = concurrency / round_trip_secs;
    let target_bound_rps = (target.api_rate_limit_rpm.max(0.0) / 60.0) / split_factor as f64;

    let theoretical_inbound_rps = thread_bound_rps.min(target_bound_rps);
    let is_thread_bound = thread_bound_rps < target_bound_rps;

    let middleware_limit_rps = target.ingress_limit_rps();
    let (effective_inbound_rps, is_throttled) =
        apply_ingress_limit(theoretical_inbound_rps, middleware_limit_rps);

    // No queue decouples the two sides, so the target sees exactly what the source sends
    let inbound_records_per_sec = effective_inbound_rps * source_packet_size as f64;

    RateEstimate {
        effective_packet_size,
        split_factor,
        theoretical_inbound_rps,
        middleware_limit_rps,
        effective_inbound_rps,
        throttled_rps: theoretical_inbound_rps - effective_inbound_rps,
        is_throttled,
        inbound_records_per_sec,
        outbound_records_per_sec: inbound_records_per_sec,
        // A blocked channel holds its thread while waiting on the target
        used_threads: concurrency,
        is_thread_bound,
        sync_bounds: Some(SyncBounds {
            round_trip_secs,
            thread_bound_rps,
            target_bound_rps,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer_master() -> DataObject {
        DataObject::new("1", "Customer Master", 500_000, 100, 1.5)
    }

    fn erp() -> TargetSystem {
        TargetSystem::new("t1", "c1", "SAP S/4HANA (US)", 3000.0)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_split_factor() {
        assert_eq!(split_factor(100, 100), 1);
        assert_eq!(split_factor(100, 30), 4);
        assert_eq!(split_factor(100, 50), 2);
        assert_eq!(split_factor(100, 0), 100);
    }

    #[test]
    fn test_async_rates() {
        let estimate = estimate(&customer_master(), &erp(), &GlobalConfig::default());

        assert_close(estimate.theoretical_inbound_rps, 20.0);
        assert_close(estimate.effective_inbound_rps, 20.0);
        assert_close(estimate.inbound_records_per_sec, 2000.0);
        assert_close(estimate.outbound_records_per_sec, 5000.0);
        assert_eq!(estimate.split_factor, 1);
        assert_eq!(estimate.used_threads, 4.0);
        assert!(!estimate.is_throttled);
        assert!(estimate.sync_bounds.is_none());
    }

    #[test]
    fn test_async_outbound_uses_target_packet_size() {
        let target = erp().with_target_packet_size(25);
        let estimate = estimate(&customer_master(), &target, &GlobalConfig::default());

        assert_eq!(estimate.effective_packet_size, 25);
        assert_eq!(estimate.split_factor, 4);
        assert_close(estimate.outbound_records_per_sec, 50.0 * 25.0);
    }

    #[test]
    fn test_async_ingress_limit_throttles() {
        let target = erp().with_ingress_limit(600.0);
        let estimate = estimate(&customer_master(), &target, &GlobalConfig::default());

        assert!(estimate.is_throttled);
        assert_eq!(estimate.middleware_limit_rps, Some(10.0));
        assert_eq!(estimate.effective_inbound_rps, 10.0);
        assert_close(estimate.throttled_rps, 10.0);
        assert_close(estimate.inbound_records_per_sec, 1000.0);
    }

    #[test]
    fn test_ingress_limit_above_theoretical_does_not_throttle() {
        let target = erp().with_ingress_limit(6000.0);
        let estimate = estimate(&customer_master(), &target, &GlobalConfig::default());

        assert!(!estimate.is_throttled);
        assert_eq!(estimate.middleware_limit_rps, Some(100.0));
        assert_close(estimate.effective_inbound_rps, 20.0);
        assert_eq!(estimate.throttled_rps, 0.0);
    }

    #[test]
    fn test_sync_thread_bound() {
        let estimate = estimate(&customer_master(), &erp(), &GlobalConfig::synchronous());
        let bounds = estimate.sync_bounds.expect("sync bounds");

        assert_close(bounds.round_trip_secs, 0.22);
        assert_close(bounds.thread_bound_rps, 4.0 / 0.22);
        assert_close(bounds.target_bound_rps, 50.0);
        assert_close(estimate.effective_inbound_rps, 4.0 / 0.22);
        assert!(estimate.is_thread_bound);
        assert_eq!(estimate.inbound_records_per_sec, estimate.outbound_records_per_sec);
    }

    #[test]
    fn test_sync_target_bound() {
        let target = TargetSystem::new("t3", "c2", "Legacy ERP", 300.0).with_target_packet_size(10);
        let config = GlobalConfig::synchronous().with_concurrency(50);
        let estimate = estimate(&customer_master(), &target, &config);

        // 10 split calls at 0.2s each plus 0.2s overhead
        let bounds = estimate.sync_bounds.expect("sync bounds");
        assert_close(bounds.round_trip_secs, 2.2);
        assert_close(bounds.target_bound_rps, 0.5);
        assert!(!estimate.is_thread_bound);
        assert_close(estimate.effective_inbound_rps, 0.5);
    }

    #[test]
    fn test_sync_ingress_limit() {
        let target = erp().with_ingress_limit(60.0);
        let estimate = estimate(&customer_master(), &target, &GlobalConfig::synchronous());

        assert!(estimate.is_throttled);
        assert_eq!(estimate.effective_inbound_rps, 1.0);
        assert_close(estimate.outbound_records_per_sec, 100.0);
    }

    #[test]
    fn test_zero_rate_limit_stays_finite() {
        let target = TargetSystem::new("t0", "c1", "Dead", 0.0);

        let sync = estimate(&customer_master(), &target, &GlobalConfig::synchronous());
        let bounds = sync.sync_bounds.expect("sync bounds");
        assert_close(bounds.round_trip_secs, 0.2 + FALLBACK_TARGET_LATENCY_SECS);
        assert_eq!(sync.effective_inbound_rps, 0.0);
        assert!(!sync.is_thread_bound);

        let asynchronous = estimate(&customer_master(), &target, &GlobalConfig::default());
        assert_eq!(asynchronous.outbound_records_per_sec, 0.0);
        assert!(asynchronous.theoretical_inbound_rps.is_finite());
    }
}
