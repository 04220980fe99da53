use serde::{Deserialize, Serialize};
use crate::config::IntegrationPattern;
use crate::models::DataObject;
use crate::rates::RateEstimate;

/// Slowest drain or ingest rate used as a divisor (records/sec)
pub const MIN_RATE_RECORDS_PER_SEC: f64 = 0.001;

/// Backlog and duration figures for one route
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueEstimate {
    pub completion_time_secs: f64,
    pub peak_depth_records: f64,
    pub peak_depth_packets: u64,
    pub peak_storage_mb: f64,
}

fn safe_rate(records_per_sec: f64) -> f64 {
    if records_per_sec > MIN_RATE_RECORDS_PER_SEC {
        records_per_sec
    } else {
        MIN_RATE_RECORDS_PER_SEC
    }
}

/// Translate a route's rate imbalance into a backlog and a completion time
pub fn estimate(
    object: &DataObject,
    rates: &RateEstimate,
    pattern: IntegrationPattern,
) -> QueueEstimate {
    match pattern {
        IntegrationPattern::Async => estimate_async(object, rates),
        IntegrationPattern::Sync => estimate_sync(object, rates),
    }
}

fn estimate_async(object: &DataObject, rates: &RateEstimate) -> QueueEstimate {
    let volume = object.volume as f64;
    let packet_size = object.safe_packet_size();
    let outbound = safe_rate(rates.outbound_records_per_sec);
    let inbound = safe_rate(rates.inbound_records_per_sec);

    // The target's drain rate bounds the run, not the source's push rate
    let completion_time_secs = volume / outbound;

    let peak_depth_records = if inbound > outbound {
        let time_to_ingest = volume / inbound;
        (inbound - outbound) * time_to_ingest
    } else {
        // One packet is always in flight while the queue drains
        packet_size as f64
    };
    let peak_depth_records = peak_depth_records.min(volume).max(0.0);

    QueueEstimate {
        completion_time_secs,
        peak_depth_records,
        peak_depth_packets: (peak_depth_records / packet_size as f64).ceil() as u64,
        peak_storage_mb: peak_depth_records * object.payload_size_per_record_kb.max(0.0) / 1024.0,
    }
}

fn estimate_sync(object: &DataObject, rates: &RateEstimate) -> QueueEstimate {
    QueueEstimate {
        completion_time_secs: object.volume as f64 / safe_rate(rates.inbound_records_per_sec),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GlobalConfig;
    use crate::models::TargetSystem;
    use crate::rates;

    fn route(object: &DataObject, target: &TargetSystem, config: &GlobalConfig) -> QueueEstimate {
        let rates = rates::estimate(object, target, config);
        estimate(object, &rates, config.integration_pattern)
    }

    #[test]
    fn test_draining_queue_holds_one_packet() {
        let object = DataObject::new("1", "Customer Master", 500_000, 100, 1.5);
        let target = TargetSystem::new("t1", "c1", "ERP", 3000.0);
        let queue = route(&object, &target, &GlobalConfig::default());

        assert_eq!(queue.completion_time_secs, 100.0);
        assert_eq!(queue.peak_depth_records, 100.0);
        assert_eq!(queue.peak_depth_packets, 1);
        assert!((queue.peak_storage_mb - 100.0 * 1.5 / 1024.0).abs() < 1e-12);
    }

    #[test]
    fn test_growing_queue() {
        // Inbound 2000 rec/s against an outbound of 5 * 100 = 500 rec/s
        let object = DataObject::new("1", "Customer Master", 500_000, 100, 1.5);
        let target = TargetSystem::new("t2", "c1", "CRM", 300.0);
        let queue = route(&object, &target, &GlobalConfig::default());

        // 250 s to ingest, growing at 1500 rec/s
        assert_eq!(queue.peak_depth_records, 375_000.0);
        assert_eq!(queue.peak_depth_packets, 3750);
        assert_eq!(queue.completion_time_secs, 1000.0);
    }

    #[test]
    fn test_depth_capped_at_volume() {
        let object = DataObject::new("1", "Tiny", 50, 100, 1.0);
        let target = TargetSystem::new("t1", "c1", "ERP", 3000.0);
        let queue = route(&object, &target, &GlobalConfig::default());

        assert_eq!(queue.peak_depth_records, 50.0);
    }

    #[test]
    fn test_zero_volume_costs_nothing() {
        let object = DataObject::new("1", "Empty", 0, 100, 1.0);
        let target = TargetSystem::new("t1", "c1", "ERP", 3000.0);

        for config in [GlobalConfig::asynchronous(), GlobalConfig::synchronous()] {
            let queue = route(&object, &target, &config);
            assert_eq!(queue.completion_time_secs, 0.0);
            assert_eq!(queue.peak_depth_records, 0.0);
            assert_eq!(queue.peak_storage_mb, 0.0);
        }
    }

    #[test]
    fn test_zero_rate_limit_uses_floor() {
        let object = DataObject::new("1", "Customer Master", 1000, 100, 1.0);
        let target = TargetSystem::new("t0", "c1", "Dead", 0.0);
        let queue = route(&object, &target, &GlobalConfig::default());

        assert_eq!(queue.completion_time_secs, 1000.0 / MIN_RATE_RECORDS_PER_SEC);
        assert!(queue.peak_depth_records <= 1000.0);
    }

    #[test]
    fn test_sync_has_no_backlog() {
        let object = DataObject::new("1", "Customer Master", 500_000, 100, 1.5);
        let target = TargetSystem::new("t1", "c1", "ERP", 3000.0);
        let queue = route(&object, &target, &GlobalConfig::synchronous());

        assert_eq!(queue.peak_depth_records, 0.0);
        assert_eq!(queue.peak_storage_mb, 0.0);
        assert_eq!(queue.peak_depth_packets, 0);
        // 500k records at 1818.18 rec/s
        assert!((queue.completion_time_secs - 275.0).abs() < 1e-6);
    }
}
