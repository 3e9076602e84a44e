use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::logging::{Logger, TARGET_METRICS};
use crate::metrics::EngineMetrics;
use crate::projection::DEFAULT_COMPACT_BREAKPOINT;

/// Settings for a [`GridEngine`](crate::GridEngine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Viewports narrower than this (in pixels) get the compact display.
    pub compact_breakpoint: f64,
    /// Keep committed positions inside one primary section.
    pub section_mode: bool,
    /// Lifetime of a memoized projection.
    pub projection_ttl: Duration,
    /// Optional structured logger used by the engine.
    pub logger: Option<Logger>,
    /// Counters shared with the host.
    pub metrics: Option<Arc<Mutex<EngineMetrics>>>,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            compact_breakpoint: DEFAULT_COMPACT_BREAKPOINT,
            section_mode: true,
            projection_ttl: Duration::from_secs(30),
            logger: None,
            metrics: None,
            metrics_target: TARGET_METRICS.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_section_mode(mut self, enabled: bool) -> Self {
        self.section_mode = enabled;
        self
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(EngineMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    /// Access the shared metrics handle if metrics are enabled.
    pub fn metrics_handle(&self) -> Option<Arc<Mutex<EngineMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_behaviour() {
        let config = EngineConfig::default();
        assert_eq!(config.compact_breakpoint, 700.0);
        assert!(config.section_mode);
        assert_eq!(config.projection_ttl, Duration::from_secs(30));
        assert!(config.metrics_handle().is_none());
    }

    #[test]
    fn enabling_metrics_twice_keeps_the_same_handle() {
        let mut config = EngineConfig::default();
        config.enable_metrics();
        let first = config.metrics_handle().unwrap();
        config.enable_metrics();
        let second = config.metrics_handle().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        config.disable_metrics();
        assert!(config.metrics_handle().is_none());
    }
}
