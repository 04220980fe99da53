use serde::{Deserialize, Serialize};
use crate::PlannerError;

/// Smallest middleware overhead used as a divisor (milliseconds)
pub const MIN_MIDDLEWARE_OVERHEAD_MS: f64 = 1.0;

/// How the source hands records to the middleware
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegrationPattern {
    /// Queued, fire-and-forget. The middleware acknowledges and drains later.
    #[default]
    #[serde(rename = "ASYNC")]
    Async,

    /// Request-reply. The source blocks until every target call has completed.
    #[serde(rename = "SYNC")]
    Sync,
}

/// Timing parameters shared by every route in a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Middleware processing time per source request (ms)
    pub avg_middleware_response_time_ms: f64,

    /// Parallel channels the source opens per target interface
    pub concurrency: u32,

    pub integration_pattern: IntegrationPattern,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            avg_middleware_response_time_ms: 200.0,
            concurrency: 4,
            integration_pattern: IntegrationPattern::Async,
        }
    }
}

impl GlobalConfig {
    /// Queued delivery with the default timing
    pub fn asynchronous() -> Self {
        Self::default()
    }

    /// Request-reply delivery with the default timing
    pub fn synchronous() -> Self {
        Self {
            integration_pattern: IntegrationPattern::Sync,
            ..Default::default()
        }
    }

    pub fn with_response_time_ms(mut self, ms: f64) -> Self {
        self.avg_middleware_response_time_ms = ms;
        self
    }

    pub fn with_concurrency(mut self, concurrency: u32) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_pattern(mut self, pattern: IntegrationPattern) -> Self {
        self.integration_pattern = pattern;
        self
    }

    pub fn is_sync(&self) -> bool {
        self.integration_pattern == IntegrationPattern::Sync
    }

    /// Overhead usable as a divisor
    pub fn safe_overhead_ms(&self) -> f64 {
        if self.avg_middleware_response_time_ms.is_finite() {
            self.avg_middleware_response_time_ms.max(MIN_MIDDLEWARE_OVERHEAD_MS)
        } else {
            MIN_MIDDLEWARE_OVERHEAD_MS
        }
    }

    pub fn overhead_secs(&self) -> f64 {
        self.safe_overhead_ms() / 1000.0
    }

    pub fn validate(&self) -> Result<(), PlannerError> {
        let ms = self.avg_middleware_response_time_ms;
        if ms.is_nan() || ms <= 0.0 {
            return Err(PlannerError::InvalidConfig(format!(
                "middleware response time must be positive, got {} ms",
                ms
            )));
        }
        if self.concurrency == 0 {
            return Err(PlannerError::InvalidConfig(
                "concurrency must be at least one channel".to_string(),
            ));
        }
        Ok(())
    }
}
