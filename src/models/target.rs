use serde::{Deserialize, Serialize};
use super::{ClusterId, TargetId};

/// How a target receives updates.
///
/// Carried for reporting only. Both modes are estimated as an always-on
/// listener, so the rate formulas never branch on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplicationMode {
    #[default]
    Realtime,
    Scheduled,
}

/// A system receiving replicated data through a middleware cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSystem {
    pub id: TargetId,
    pub cluster_id: ClusterId,
    pub name: String,
    pub api_rate_limit_rpm: f64,             // Requests per minute the target accepts
    pub target_packet_size: Option<u64>,     // Max records per call; source packet size if absent
    pub replication_mode: ReplicationMode,
    /// Captured for scheduled targets but not consumed by any estimate.
    pub schedule_interval_minutes: Option<u32>,
    pub middleware_rate_limit_enabled: bool,
    pub middleware_ingress_rpm: Option<f64>,
}

impl TargetSystem {
    pub fn new(
        id: impl Into<TargetId>,
        cluster_id: impl Into<ClusterId>,
        name: impl Into<String>,
        api_rate_limit_rpm: f64,
    ) -> Self {
        Self {
            id: id.into(),
            cluster_id: cluster_id.into(),
            name: name.into(),
            api_rate_limit_rpm,
            target_packet_size: None,
            replication_mode: ReplicationMode::Realtime,
            schedule_interval_minutes: None,
            middleware_rate_limit_enabled: false,
            middleware_ingress_rpm: None,
        }
    }

    pub fn with_target_packet_size(mut self, packet_size: u64) -> Self {
        self.target_packet_size = Some(packet_size);
        self
    }

    pub fn scheduled(mut self, interval_minutes: u32) -> Self {
        self.replication_mode = ReplicationMode::Scheduled;
        self.schedule_interval_minutes = Some(interval_minutes);
        self
    }

    pub fn with_ingress_limit(mut self, rpm: f64) -> Self {
        self.middleware_rate_limit_enabled = true;
        self.middleware_ingress_rpm = Some(rpm);
        self
    }

    /// Records per call actually sent to this target for a given source packet size
    pub fn effective_packet_size(&self, source_packet_size: u64) -> u64 {
        let source = source_packet_size.max(1);
        match self.target_packet_size {
            Some(limit) if limit > 0 => source.min(limit),
            _ => source,
        }
    }

    /// Ingress cap in requests per second, when the toggle is on and a positive RPM is set
    pub fn ingress_limit_rps(&self) -> Option<f64> {
        if !self.middleware_rate_limit_enabled {
            return None;
        }
        self.middleware_ingress_rpm
            .filter(|rpm| *rpm > 0.0)
            .map(|rpm| rpm / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_packet_size_defaults_to_source() {
        let target = TargetSystem::new("t1", "c1", "ERP", 3000.0);
        assert_eq!(target.effective_packet_size(100), 100);
    }

    #[test]
    fn test_effective_packet_size_takes_smaller() {
        let target = TargetSystem::new("t1", "c1", "ERP", 3000.0).with_target_packet_size(30);
        assert_eq!(target.effective_packet_size(100), 30);
        assert_eq!(target.effective_packet_size(10), 10);
    }

    #[test]
    fn test_ingress_limit_requires_toggle_and_positive_rpm() {
        let mut target = TargetSystem::new("t1", "c1", "ERP", 3000.0);
        target.middleware_ingress_rpm = Some(600.0);
        assert_eq!(target.ingress_limit_rps(), None);

        target.middleware_rate_limit_enabled = true;
        assert_eq!(target.ingress_limit_rps(), Some(10.0));

        target.middleware_ingress_rpm = Some(0.0);
        assert_eq!(target.ingress_limit_rps(), None);

        target.middleware_ingress_rpm = None;
        assert_eq!(target.ingress_limit_rps(), None);
    }

    #[test]
    fn test_scheduled_mode_keeps_interval() {
        let target = TargetSystem::new("t2", "c1", "CRM", 1000.0).scheduled(15);
        assert_eq!(target.replication_mode, ReplicationMode::Scheduled);
        assert_eq!(target.schedule_interval_minutes, Some(15));
    }
}
