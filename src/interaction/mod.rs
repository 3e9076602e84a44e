//! Drag and resize gestures.
//!
//! The controller is a two-state machine, `Idle -> Dragging -> Idle`. While
//! dragging it turns pointer deltas into snapped preview positions; previews
//! are never collision-resolved and may overlap other widgets. On release
//! the final candidate goes through the section constraint (when enabled)
//! and the resolver, and comes back as a [`Commit`] for the caller to write
//! into the canonical list.
//!
//! Input backends speak [`PointerEvent`]; see [`pointer`] for the terminal
//! mouse adapter. Keyboard nudges use [`InteractionController::nudge`].

pub mod pointer;

use crate::error::{GridError, Result};
use crate::geometry::{GridMetrics, GridPosition, clamp, columns_f64, snap};
use crate::layout::{constrain, resolve};
use crate::widget::{Widget, WidgetId};

pub use pointer::{MouseAdapter, nudge_for_key};

/// Resize handle extent for terminal pointers: one character cell.
/// Pixel hosts pass their own extent to [`hit_test`].
pub const CELL_RESIZE_HANDLE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureMode {
    Move,
    Resize,
}

impl GestureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureMode::Move => "move",
            GestureMode::Resize => "resize",
        }
    }
}

/// Pointer coordinates in the renderer's pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPoint {
    pub x: f64,
    pub y: f64,
}

impl PointerPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Backend-neutral pointer input.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Down {
        widget_id: WidgetId,
        mode: GestureMode,
        at: PointerPoint,
    },
    Move {
        at: PointerPoint,
    },
    Up {
        at: PointerPoint,
    },
}

/// Position to write back for one widget.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub widget_id: WidgetId,
    pub mode: GestureMode,
    pub previous: GridPosition,
    pub position: GridPosition,
}

impl Commit {
    pub fn is_noop(&self) -> bool {
        self.previous == self.position
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionOutcome {
    Ignored,
    Started,
    Preview(GridPosition),
    Committed(Commit),
}

#[derive(Debug, Clone)]
struct ActiveGesture {
    widget_id: WidgetId,
    mode: GestureMode,
    start_pointer: PointerPoint,
    start_position: GridPosition,
    preview: GridPosition,
}

#[derive(Debug, Clone)]
enum GestureState {
    Idle,
    Dragging(ActiveGesture),
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    columns: u32,
    metrics: GridMetrics,
    section_mode: bool,
    state: GestureState,
}

impl InteractionController {
    pub fn new(columns: u32, metrics: GridMetrics, section_mode: bool) -> Self {
        Self {
            columns: columns.max(1),
            metrics,
            section_mode,
            state: GestureState::Idle,
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn set_columns(&mut self, columns: u32) {
        self.columns = columns.max(1);
    }

    pub fn metrics(&self) -> GridMetrics {
        self.metrics
    }

    pub fn set_metrics(&mut self, metrics: GridMetrics) {
        self.metrics = metrics;
    }

    pub fn section_mode(&self) -> bool {
        self.section_mode
    }

    pub fn set_section_mode(&mut self, enabled: bool) {
        self.section_mode = enabled;
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    pub fn active_widget(&self) -> Option<&str> {
        match &self.state {
            GestureState::Dragging(gesture) => Some(gesture.widget_id.as_str()),
            GestureState::Idle => None,
        }
    }

    pub fn active_mode(&self) -> Option<GestureMode> {
        match &self.state {
            GestureState::Dragging(gesture) => Some(gesture.mode),
            GestureState::Idle => None,
        }
    }

    /// Current preview of the active gesture.
    pub fn preview(&self) -> Option<GridPosition> {
        match &self.state {
            GestureState::Dragging(gesture) => Some(gesture.preview),
            GestureState::Idle => None,
        }
    }

    /// Start a gesture on `widget`. Only one gesture may run at a time.
    pub fn begin(&mut self, widget: &Widget, mode: GestureMode, at: PointerPoint) -> Result<()> {
        if let GestureState::Dragging(active) = &self.state {
            return Err(GridError::GestureInProgress(active.widget_id.clone()));
        }
        self.state = GestureState::Dragging(ActiveGesture {
            widget_id: widget.id.clone(),
            mode,
            start_pointer: at,
            start_position: widget.position,
            preview: widget.position,
        });
        Ok(())
    }

    /// Update the live preview. Returns `None` when no gesture is active.
    pub fn on_pointer_move(&mut self, at: PointerPoint) -> Option<GridPosition> {
        let (columns, section_mode, metrics) = (self.columns, self.section_mode, self.metrics);
        let GestureState::Dragging(gesture) = &mut self.state else {
            return None;
        };
        let (dx, dy) = pointer_steps(gesture.start_pointer, at, &metrics);
        let candidate = apply_steps(gesture.start_position, gesture.mode, dx, dy, columns);
        gesture.preview = if section_mode {
            constrain(candidate, columns)
        } else {
            candidate
        };
        Some(gesture.preview)
    }

    /// Finish the active gesture and produce the position to commit.
    ///
    /// `widgets` is the latest canonical list; the gesture's own widget is
    /// skipped by the resolver. A release without movement commits the
    /// start position untouched.
    pub fn on_pointer_release(&mut self, at: PointerPoint, widgets: &[Widget]) -> Result<Commit> {
        let gesture = match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::Dragging(gesture) => gesture,
            GestureState::Idle => return Err(GridError::NoActiveGesture),
        };

        let (dx, dy) = pointer_steps(gesture.start_pointer, at, &self.metrics);
        let position = if dx == 0.0 && dy == 0.0 {
            gesture.start_position
        } else {
            let candidate = apply_steps(gesture.start_position, gesture.mode, dx, dy, self.columns);
            self.finalize(&gesture.widget_id, candidate, widgets)
        };

        Ok(Commit {
            widget_id: gesture.widget_id,
            mode: gesture.mode,
            previous: gesture.start_position,
            position,
        })
    }

    /// Discrete step (keyboard or similar) of `dx`/`dy` grid units, run
    /// through the same pipeline as a pointer release.
    pub fn nudge(
        &self,
        widget: &Widget,
        mode: GestureMode,
        dx: f64,
        dy: f64,
        widgets: &[Widget],
    ) -> Result<Commit> {
        if let GestureState::Dragging(active) = &self.state {
            return Err(GridError::GestureInProgress(active.widget_id.clone()));
        }
        let (dx, dy) = (finite_step(dx), finite_step(dy));
        let position = if dx == 0.0 && dy == 0.0 {
            widget.position
        } else {
            let candidate = apply_steps(widget.position, mode, dx, dy, self.columns);
            self.finalize(&widget.id, candidate, widgets)
        };
        Ok(Commit {
            widget_id: widget.id.clone(),
            mode,
            previous: widget.position,
            position,
        })
    }

    /// Feed one backend-neutral pointer event.
    pub fn handle(&mut self, event: PointerEvent, widgets: &[Widget]) -> Result<InteractionOutcome> {
        match event {
            PointerEvent::Down {
                widget_id,
                mode,
                at,
            } => {
                let widget = widgets
                    .iter()
                    .find(|widget| widget.id == widget_id)
                    .ok_or(GridError::WidgetNotFound(widget_id))?;
                self.begin(widget, mode, at)?;
                Ok(InteractionOutcome::Started)
            }
            PointerEvent::Move { at } => Ok(self
                .on_pointer_move(at)
                .map(InteractionOutcome::Preview)
                .unwrap_or(InteractionOutcome::Ignored)),
            PointerEvent::Up { at } => {
                if self.is_idle() {
                    return Ok(InteractionOutcome::Ignored);
                }
                self.on_pointer_release(at, widgets)
                    .map(InteractionOutcome::Committed)
            }
        }
    }

    fn finalize(&self, widget_id: &str, candidate: GridPosition, widgets: &[Widget]) -> GridPosition {
        let constrained = if self.section_mode {
            constrain(candidate, self.columns)
        } else {
            candidate
        };
        resolve(widgets, widget_id, constrained, self.columns)
    }
}

/// Widget under `at` and the gesture a press there starts: the
/// `resize_handle` square in the bottom-right corner resizes, anywhere else
/// moves. `resize_handle` is in the same units as `metrics`. Later widgets
/// win on overlap.
pub fn hit_test(
    widgets: &[Widget],
    metrics: &GridMetrics,
    at: PointerPoint,
    resize_handle: f64,
) -> Option<(WidgetId, GestureMode)> {
    widgets.iter().rev().find_map(|widget| {
        let rect = metrics.rect_for(&widget.position);
        let inside = at.x >= rect.left
            && at.x < rect.left + rect.width
            && at.y >= rect.top
            && at.y < rect.top + rect.height;
        if !inside {
            return None;
        }
        let in_handle = at.x >= rect.left + rect.width - resize_handle
            && at.y >= rect.top + rect.height - resize_handle;
        let mode = if in_handle {
            GestureMode::Resize
        } else {
            GestureMode::Move
        };
        Some((widget.id.clone(), mode))
    })
}

/// Snapped grid steps between two pointer readings.
fn pointer_steps(start: PointerPoint, at: PointerPoint, metrics: &GridMetrics) -> (f64, f64) {
    (
        axis_steps(at.x - start.x, metrics.step_x()),
        axis_steps(at.y - start.y, metrics.step_y()),
    )
}

fn axis_steps(delta_pixels: f64, step: f64) -> f64 {
    if step <= 0.0 || !step.is_finite() {
        return 0.0;
    }
    finite_step(delta_pixels / step)
}

fn finite_step(units: f64) -> f64 {
    if units.is_finite() { snap(units) } else { 0.0 }
}

/// Shift (move) or grow (resize) `start` by the snapped steps, clamped so
/// the box stays on the grid.
fn apply_steps(start: GridPosition, mode: GestureMode, dx: f64, dy: f64, columns: u32) -> GridPosition {
    let columns = columns_f64(columns);
    match mode {
        GestureMode::Move => GridPosition {
            x: clamp(start.x + dx, 0.0, (columns - start.w).max(0.0)),
            y: (start.y + dy).max(0.0),
            ..start
        },
        GestureMode::Resize => GridPosition {
            w: clamp(start.w + dx, 1.0, (columns - start.x).max(1.0)),
            h: (start.h + dy).max(1.0),
            ..start
        },
    }
}
