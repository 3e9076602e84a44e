use crate::layout::{NormalizeReport, Placement};
use crate::logging::{LogEvent, LogFields, LogLevel};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

/// Counters accumulated by a [`GridEngine`](crate::GridEngine).
#[derive(Debug, Default, Clone)]
pub struct EngineMetrics {
    resolves: u64,
    displaced: u64,
    fallbacks: u64,
    normalizations: u64,
    moved_by_normalize: u64,
    projections: u64,
    cache_hits: u64,
    commits: u64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_resolution(&mut self, placement: Placement) {
        self.resolves = self.resolves.saturating_add(1);
        match placement {
            Placement::Direct => {}
            Placement::Displaced => self.displaced = self.displaced.saturating_add(1),
            Placement::Fallback => self.fallbacks = self.fallbacks.saturating_add(1),
        }
    }

    pub fn record_normalization(&mut self, report: &NormalizeReport) {
        self.normalizations = self.normalizations.saturating_add(1);
        self.moved_by_normalize = self.moved_by_normalize.saturating_add(report.moved as u64);
        self.fallbacks = self.fallbacks.saturating_add(report.fallbacks as u64);
    }

    pub fn record_projection(&mut self, cache_hit: bool) {
        self.projections = self.projections.saturating_add(1);
        if cache_hit {
            self.cache_hits = self.cache_hits.saturating_add(1);
        }
    }

    pub fn record_commit(&mut self) {
        self.commits = self.commits.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            resolves: self.resolves,
            displaced: self.displaced,
            fallbacks: self.fallbacks,
            normalizations: self.normalizations,
            moved_by_normalize: self.moved_by_normalize,
            projections: self.projections,
            cache_hits: self.cache_hits,
            commits: self.commits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub resolves: u64,
    pub displaced: u64,
    pub fallbacks: u64,
    pub normalizations: u64,
    pub moved_by_normalize: u64,
    pub projections: u64,
    pub cache_hits: u64,
    pub commits: u64,
}

impl MetricSnapshot {
    /// Share of projections served from the cache, `0.0` before the first one.
    pub fn cache_hit_ratio(&self) -> f64 {
        if self.projections == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.projections as f64
        }
    }

    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "engine_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(mut map)) => {
                map.insert("cache_hit_ratio".to_string(), json!(self.cache_hit_ratio()));
                map
            }
            _ => LogFields::new(),
        }
    }
}
