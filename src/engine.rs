//! Engine facade tying the canonical layout, the gesture controller and the
//! projection cache together.
//!
//! Every mutation goes through [`DashboardLayout`], so the canonical list is
//! always normalized when a call returns. Mutations are logged at debug
//! level; placements that had to fall back below everything are logged at
//! warn.

use std::time::Instant;

use serde_json::Value;

use crate::config::EngineConfig;
use crate::dashboard::{DashboardLayout, LayoutChange};
use crate::error::{GridError, Result};
use crate::geometry::{GridMetrics, GridPosition};
use crate::interaction::{
    Commit, GestureMode, InteractionController, InteractionOutcome, PointerEvent, PointerPoint,
};
use crate::layout::{NormalizeReport, Placement, constrain};
use crate::logging::{
    LogLevel, TARGET_INTERACTION, TARGET_LAYOUT, TARGET_PROJECTION, event_with_fields, json_kv,
};
use crate::metrics::MetricSnapshot;
use crate::projection::{DisplayLayout, DisplayMode, ProjectionCache, map_back};
use crate::widget::{Widget, WidgetId, WidgetKind};

pub struct GridEngine {
    layout: DashboardLayout,
    config: EngineConfig,
    controller: InteractionController,
    cache: ProjectionCache,
    started_at: Instant,
}

impl GridEngine {
    /// Engine over `layout`. The layout is normalized once on the way in.
    ///
    /// Pointer metrics start as square cells of `row_height`; until the
    /// host calls [`GridEngine::set_canvas_width`] or
    /// [`GridEngine::set_grid_metrics`], horizontal pointer deltas are only
    /// right when the rendered cells really are square. Use
    /// [`GridEngine::with_grid_metrics`] when the metrics are known up front.
    pub fn new(layout: DashboardLayout, config: EngineConfig) -> Self {
        let metrics = GridMetrics::new(layout.row_height(), layout.row_height(), layout.gap());
        Self::with_grid_metrics(layout, config, metrics)
    }

    /// Engine over `layout` with the renderer's pixel metrics.
    pub fn with_grid_metrics(
        mut layout: DashboardLayout,
        config: EngineConfig,
        metrics: GridMetrics,
    ) -> Self {
        let controller = InteractionController::new(layout.columns(), metrics, config.section_mode);
        let cache = ProjectionCache::new(config.projection_ttl);
        let moved = layout.normalize_in_place();

        let engine = Self {
            layout,
            config,
            controller,
            cache,
            started_at: Instant::now(),
        };
        engine.log_engine_event(
            LogLevel::Debug,
            TARGET_LAYOUT,
            "layout_loaded",
            [
                json_kv("widgets", engine.layout.len()),
                json_kv("columns", engine.layout.columns()),
                json_kv("normalized", moved),
            ],
        );
        engine
    }

    pub fn layout(&self) -> &DashboardLayout {
        &self.layout
    }

    pub fn into_layout(self) -> DashboardLayout {
        self.layout
    }

    pub fn widgets(&self) -> &[Widget] {
        self.layout.widgets()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    /// Pixel metrics pointer deltas are measured in.
    pub fn set_grid_metrics(&mut self, metrics: GridMetrics) {
        self.controller.set_metrics(metrics);
    }

    /// Size cells for a canvas `canvas_width` pixels wide.
    pub fn set_canvas_width(&mut self, canvas_width: f64) {
        self.controller
            .set_metrics(self.layout.grid_metrics(canvas_width));
    }

    pub fn set_section_mode(&mut self, enabled: bool) {
        self.config.section_mode = enabled;
        self.controller.set_section_mode(enabled);
    }

    pub fn add_widget(&mut self, kind: WidgetKind) -> WidgetId {
        let change = self.layout.add_widget(kind);
        self.record_change(&change, "widget_added");
        change.widget_id
    }

    pub fn remove_widget(&mut self, widget_id: &str) -> Result<Widget> {
        let removed = self.layout.remove_widget(widget_id)?;
        self.log_engine_event(
            LogLevel::Debug,
            TARGET_LAYOUT,
            "widget_removed",
            [json_kv("widget", widget_id)],
        );
        Ok(removed)
    }

    pub fn set_columns(&mut self, columns: u32) -> Result<()> {
        let report = self.layout.set_columns(columns)?;
        self.controller.set_columns(columns);
        self.record_normalize_metric(&report);
        self.log_engine_event(
            LogLevel::Debug,
            TARGET_LAYOUT,
            "columns_changed",
            [json_kv("columns", columns), json_kv("moved", report.moved)],
        );
        if report.fallbacks > 0 {
            self.log_engine_event(
                LogLevel::Warn,
                TARGET_LAYOUT,
                "placement_fallback",
                [json_kv("count", report.fallbacks)],
            );
        }
        Ok(())
    }

    pub fn update_position(&mut self, widget_id: &str, proposed: GridPosition) -> Result<GridPosition> {
        let change = self.layout.update_position(widget_id, proposed)?;
        self.record_change(&change, "widget_moved");
        Ok(change.position)
    }

    pub fn begin_gesture(&mut self, widget_id: &str, mode: GestureMode, at: PointerPoint) -> Result<()> {
        let widget = self
            .layout
            .widget(widget_id)
            .ok_or_else(|| GridError::WidgetNotFound(widget_id.to_string()))?;
        self.controller.begin(widget, mode, at)?;
        self.log_engine_event(
            LogLevel::Trace,
            TARGET_INTERACTION,
            "gesture_started",
            [json_kv("widget", widget_id), json_kv("mode", mode.as_str())],
        );
        Ok(())
    }

    /// Live preview of the active gesture, `None` when idle.
    pub fn pointer_move(&mut self, at: PointerPoint) -> Option<GridPosition> {
        self.controller.on_pointer_move(at)
    }

    pub fn preview(&self) -> Option<GridPosition> {
        self.controller.preview()
    }

    /// Finish the active gesture and write the result into the layout.
    pub fn pointer_release(&mut self, at: PointerPoint) -> Result<GridPosition> {
        let commit = self
            .controller
            .on_pointer_release(at, self.layout.widgets())?;
        self.apply_commit(commit)
    }

    /// Feed a backend-neutral pointer event. Commits are written through.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<InteractionOutcome> {
        match self.controller.handle(event, self.layout.widgets())? {
            InteractionOutcome::Committed(commit) => {
                let mut commit = commit;
                commit.position = self.apply_commit(commit.clone())?;
                Ok(InteractionOutcome::Committed(commit))
            }
            other => Ok(other),
        }
    }

    /// Shift (or grow, in resize mode) a widget by whole or half grid units.
    pub fn nudge(&mut self, widget_id: &str, mode: GestureMode, dx: f64, dy: f64) -> Result<GridPosition> {
        let widget = self
            .layout
            .widget(widget_id)
            .ok_or_else(|| GridError::WidgetNotFound(widget_id.to_string()))?;
        let commit = self
            .controller
            .nudge(widget, mode, dx, dy, self.layout.widgets())?;
        self.apply_commit(commit)
    }

    /// Display for a viewport `width` pixels wide.
    pub fn display_for_viewport(&mut self, width: f64) -> DisplayLayout {
        let mode = DisplayMode::for_viewport(width, self.config.compact_breakpoint);
        self.display(mode)
    }

    pub fn display(&mut self, mode: DisplayMode) -> DisplayLayout {
        let lookup = self
            .cache
            .project(self.layout.widgets(), self.layout.columns(), mode);
        self.record_projection_metric(lookup.hit);
        self.log_engine_event(
            LogLevel::Trace,
            TARGET_PROJECTION,
            "display_projected",
            [
                json_kv("mode", serde_json::to_value(mode).unwrap_or(Value::Null)),
                json_kv("cache_hit", lookup.hit),
                json_kv("widgets", lookup.layout.widgets.len()),
            ],
        );
        lookup.layout
    }

    /// Commit a position edited on `display` back into the canonical layout.
    pub fn display_edit(
        &mut self,
        display: &DisplayLayout,
        widget_id: &str,
        position: GridPosition,
    ) -> Result<GridPosition> {
        let columns = self.layout.columns();
        let mut canonical = map_back(display, widget_id, position, columns);
        if self.config.section_mode {
            canonical = constrain(canonical, columns);
        }
        let change = self.layout.update_position(widget_id, canonical)?;
        self.record_change(&change, "display_edit");
        Ok(change.position)
    }

    pub fn metrics_snapshot(&self) -> Option<MetricSnapshot> {
        let metrics = self.config.metrics.as_ref()?;
        let guard = metrics.lock().ok()?;
        Some(guard.snapshot(self.started_at.elapsed()))
    }

    /// Log the current metrics snapshot to the configured metrics target.
    pub fn emit_metrics(&self) {
        let Some(snapshot) = self.metrics_snapshot() else {
            return;
        };
        if let Some(logger) = self.config.logger.as_ref() {
            let _ = logger.log_event(snapshot.to_log_event(&self.config.metrics_target));
        }
    }

    fn apply_commit(&mut self, commit: Commit) -> Result<GridPosition> {
        self.record_commit_metric();
        if commit.is_noop() {
            self.log_engine_event(
                LogLevel::Trace,
                TARGET_INTERACTION,
                "gesture_unchanged",
                [json_kv("widget", commit.widget_id.as_str())],
            );
            return self
                .layout
                .widget(&commit.widget_id)
                .map(|widget| widget.position)
                .ok_or(GridError::WidgetNotFound(commit.widget_id));
        }
        let change = self.layout.apply_commit(&commit)?;
        let message = match commit.mode {
            GestureMode::Move => "widget_moved",
            GestureMode::Resize => "widget_resized",
        };
        self.record_change(&change, message);
        Ok(change.position)
    }

    fn record_change(&self, change: &LayoutChange, message: &str) {
        self.record_resolution_metric(change.placement);
        self.record_normalize_metric(&change.report);

        let position = change.position;
        self.log_engine_event(
            LogLevel::Debug,
            TARGET_LAYOUT,
            message,
            [
                json_kv("widget", change.widget_id.as_str()),
                json_kv("x", position.x),
                json_kv("y", position.y),
                json_kv("w", position.w),
                json_kv("h", position.h),
                json_kv("revision", self.layout.revision()),
            ],
        );
        if change.placement == Placement::Fallback || change.report.fallbacks > 0 {
            self.log_engine_event(
                LogLevel::Warn,
                TARGET_LAYOUT,
                "placement_fallback",
                [
                    json_kv("widget", change.widget_id.as_str()),
                    json_kv("y", position.y),
                ],
            );
        }
    }

    fn log_engine_event<I>(&self, level: LogLevel, target: &str, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            if !logger.enabled(level) {
                return;
            }
            let event = event_with_fields(level, target, message, fields);
            let _ = logger.log_event(event);
        }
    }

    fn record_resolution_metric(&self, placement: Placement) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_resolution(placement);
            }
        }
    }

    fn record_normalize_metric(&self, report: &NormalizeReport) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_normalization(report);
            }
        }
    }

    fn record_projection_metric(&self, cache_hit: bool) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_projection(cache_hit);
            }
        }
    }

    fn record_commit_metric(&self) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_commit();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::is_non_overlapping;
    use crate::logging::{Logger, MemorySink};
    use crate::projection::ZoneArrangement;
    use std::sync::Arc;

    fn engine_with_sink(section_mode: bool) -> (GridEngine, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let mut config = EngineConfig::default()
            .with_logger(Logger::from_shared(sink.clone()))
            .with_section_mode(section_mode);
        config.enable_metrics();
        let mut engine = GridEngine::new(DashboardLayout::default(), config);
        engine.set_grid_metrics(GridMetrics::new(90.0, 90.0, 10.0));
        (engine, sink)
    }

    #[test]
    fn added_widgets_are_logged_and_counted() {
        let (mut engine, sink) = engine_with_sink(true);
        for _ in 0..3 {
            engine.add_widget(WidgetKind::State);
        }
        assert!(is_non_overlapping(engine.widgets()));

        let added = sink
            .events()
            .into_iter()
            .filter(|event| event.message == "widget_added")
            .count();
        assert_eq!(added, 3);

        let snapshot = engine.metrics_snapshot().unwrap();
        assert_eq!(snapshot.resolves, 3);
        assert_eq!(snapshot.normalizations, 3);
    }

    #[test]
    fn drag_session_commits_into_the_layout() {
        let (mut engine, _sink) = engine_with_sink(false);
        let lamp = engine.add_widget(WidgetKind::State);
        engine
            .begin_gesture(&lamp, GestureMode::Move, PointerPoint::new(0.0, 0.0))
            .unwrap();
        assert_eq!(
            engine.pointer_move(PointerPoint::new(310.0, -90.0)),
            Some(GridPosition::new(3.0, 1.0, 1.0, 1.0))
        );
        let committed = engine.pointer_release(PointerPoint::new(310.0, -90.0)).unwrap();
        assert_eq!(committed, GridPosition::new(3.0, 1.0, 1.0, 1.0));
        assert_eq!(
            engine.layout().widget(&lamp).map(|w| w.position),
            Some(committed)
        );
        assert!(engine.controller().is_idle());
        assert_eq!(engine.metrics_snapshot().unwrap().commits, 1);
    }

    #[test]
    fn handle_pointer_reports_the_final_position() {
        let (mut engine, _sink) = engine_with_sink(false);
        let first = engine.add_widget(WidgetKind::State);
        let second = engine.add_widget(WidgetKind::State);
        engine
            .handle_pointer(PointerEvent::Down {
                widget_id: second.clone(),
                mode: GestureMode::Move,
                at: PointerPoint::new(0.0, 0.0),
            })
            .unwrap();
        // drop the second lamp onto the first one
        let outcome = engine
            .handle_pointer(PointerEvent::Up {
                at: PointerPoint::new(0.0, -100.0),
            })
            .unwrap();
        let InteractionOutcome::Committed(commit) = outcome else {
            panic!("expected a commit");
        };
        assert_eq!(commit.widget_id, second);
        assert_eq!(commit.position, GridPosition::new(1.0, 2.0, 1.0, 1.0));
        assert_eq!(
            engine.layout().widget(&first).map(|w| w.position),
            Some(GridPosition::new(0.0, 2.0, 1.0, 1.0))
        );
    }

    #[test]
    fn nudge_and_unknown_widgets() {
        let (mut engine, _sink) = engine_with_sink(true);
        let lamp = engine.add_widget(WidgetKind::State);
        let moved = engine.nudge(&lamp, GestureMode::Move, 4.0, 0.0).unwrap();
        assert_eq!(moved, GridPosition::new(4.0, 2.0, 1.0, 1.0));

        assert!(matches!(
            engine.nudge("ghost", GestureMode::Move, 1.0, 0.0),
            Err(GridError::WidgetNotFound(_))
        ));
        assert!(matches!(
            engine.begin_gesture("ghost", GestureMode::Move, PointerPoint::new(0.0, 0.0)),
            Err(GridError::WidgetNotFound(_))
        ));
    }

    #[test]
    fn repeated_displays_come_from_the_cache() {
        let (mut engine, _sink) = engine_with_sink(true);
        engine.add_widget(WidgetKind::Camera);
        let wide = engine.display_for_viewport(1200.0);
        let again = engine.display_for_viewport(1200.0);
        assert_eq!(wide.mode, DisplayMode::Sectioned);
        assert_eq!(wide, again);
        assert_eq!(engine.display_for_viewport(400.0).mode, DisplayMode::Compact);

        let snapshot = engine.metrics_snapshot().unwrap();
        assert_eq!(snapshot.projections, 3);
        assert_eq!(snapshot.cache_hits, 1);
    }

    #[test]
    fn display_edit_maps_back_to_canonical_columns() {
        let layout = DashboardLayout::new(18).unwrap().with_widgets(vec![Widget::new(
            "cam",
            WidgetKind::Camera,
            GridPosition::new(0.0, 0.0, 6.0, 2.0),
        )]);
        let mut engine = GridEngine::new(layout, EngineConfig::default());
        let display = engine.display(DisplayMode::Zoned(ZoneArrangement::SideBySide));
        assert_eq!(display.position_of("cam"), Some(GridPosition::new(0.0, 0.0, 3.0, 2.0)));

        // into the last zone, one display column in
        let committed = engine
            .display_edit(&display, "cam", GridPosition::new(7.0, 1.0, 2.0, 2.0))
            .unwrap();
        assert_eq!(committed, GridPosition::new(14.0, 1.0, 4.0, 2.0));
    }

    #[test]
    fn column_changes_keep_the_controller_in_step() {
        let (mut engine, sink) = engine_with_sink(true);
        engine.add_widget(WidgetKind::Solar);
        engine.set_columns(6).unwrap();
        assert_eq!(engine.controller().columns(), 6);
        assert!(engine.widgets().iter().all(|w| w.position.right() <= 6.0));
        assert!(matches!(engine.set_columns(0), Err(GridError::InvalidColumns(0))));
        assert!(sink.events().iter().any(|e| e.message == "columns_changed"));
    }

    #[test]
    fn metrics_snapshot_is_logged_to_its_target() {
        let (mut engine, sink) = engine_with_sink(true);
        engine.add_widget(WidgetKind::Weather);
        engine.emit_metrics();
        let event = sink
            .events()
            .into_iter()
            .find(|event| event.message == "engine_metrics")
            .unwrap();
        assert_eq!(event.target, "dashgrid::metrics");
    }

    #[test]
    fn pointer_deltas_use_the_metrics_given_up_front() {
        let config = EngineConfig::default()
            .with_logger(Logger::new(MemorySink::new()))
            .with_section_mode(false);
        let square = GridEngine::new(DashboardLayout::default(), config.clone());
        assert_eq!(square.controller().metrics().cell_width, crate::dashboard::DEFAULT_ROW_HEIGHT);

        let metrics = GridMetrics::new(200.0, 50.0, 0.0);
        let mut engine = GridEngine::with_grid_metrics(DashboardLayout::default(), config, metrics);
        assert_eq!(engine.controller().metrics(), metrics);

        let id = engine.add_widget(WidgetKind::State);
        engine
            .begin_gesture(&id, GestureMode::Move, PointerPoint::new(0.0, 0.0))
            .unwrap();
        let preview = engine.pointer_move(PointerPoint::new(200.0, 50.0));
        assert_eq!(preview, Some(GridPosition::new(1.0, 3.0, 1.0, 1.0)));
    }
}
