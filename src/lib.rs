//! Widget grid layout and placement engine for smart-home dashboards.
//!
//! The canonical layout is a list of widgets on a virtual grid of `columns`
//! units. Placement keeps it overlap-free ([`layout`]), the section
//! constraint keeps widgets inside one of three primary sections, the
//! projector derives per-device display layouts ([`projection`]) and the
//! interaction controller turns pointer gestures into commits
//! ([`interaction`]). [`GridEngine`] wires these together with logging and
//! metrics.

pub mod config;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod projection;
pub mod render;
pub mod widget;

pub use config::EngineConfig;
pub use dashboard::{DashboardLayout, LayoutChange};
pub use engine::GridEngine;
pub use error::{GridError, Result};
pub use geometry::{GRID_SNAP, GridMetrics, GridPosition, PixelRect, snap};
pub use interaction::{
    Commit, GestureMode, InteractionController, InteractionOutcome, MouseAdapter, PointerEvent,
    PointerPoint, hit_test, nudge_for_key,
};
pub use layout::{
    NormalizeReport, Placement, Resolution, constrain, is_non_overlapping, normalize, resolve,
};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use metrics::{EngineMetrics, MetricSnapshot};
pub use projection::{
    DisplayLayout, DisplayMode, DisplayWidget, ProjectionCache, ZoneArrangement, map_back, project,
};
pub use render::{TextPreview, display_width};
pub use widget::{Widget, WidgetId, WidgetKind};
