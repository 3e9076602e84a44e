//! Terminal input adapter.
//!
//! Maps crossterm mouse and key events onto the backend-neutral pointer
//! vocabulary. Terminal cells are the pixel space: pair the adapter with
//! [`GridMetrics`] expressed in cells (e.g. 6 columns by 3 rows per unit).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::geometry::GridMetrics;
use crate::widget::Widget;

use super::{CELL_RESIZE_HANDLE, GestureMode, PointerEvent, PointerPoint, hit_test};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseAdapter {
    metrics: GridMetrics,
    origin: (u16, u16),
    resize_handle: f64,
}

impl MouseAdapter {
    pub fn new(metrics: GridMetrics) -> Self {
        Self {
            metrics,
            origin: (0, 0),
            resize_handle: CELL_RESIZE_HANDLE,
        }
    }

    /// Cells from the bottom-right corner that start a resize.
    pub fn with_resize_handle(mut self, cells: f64) -> Self {
        self.resize_handle = cells.max(0.0);
        self
    }

    /// Terminal cell of the grid's top-left corner.
    pub fn with_origin(mut self, column: u16, row: u16) -> Self {
        self.origin = (column, row);
        self
    }

    pub fn metrics(&self) -> GridMetrics {
        self.metrics
    }

    pub fn point(&self, event: &MouseEvent) -> PointerPoint {
        PointerPoint::new(
            f64::from(event.column) - f64::from(self.origin.0),
            f64::from(event.row) - f64::from(self.origin.1),
        )
    }

    /// Left-button press, drag and release; everything else is dropped.
    /// A press outside every widget yields nothing.
    pub fn translate(&self, event: &MouseEvent, widgets: &[Widget]) -> Option<PointerEvent> {
        let at = self.point(event);
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let (widget_id, mode) = hit_test(widgets, &self.metrics, at, self.resize_handle)?;
                Some(PointerEvent::Down {
                    widget_id,
                    mode,
                    at,
                })
            }
            MouseEventKind::Drag(MouseButton::Left) => Some(PointerEvent::Move { at }),
            MouseEventKind::Up(MouseButton::Left) => Some(PointerEvent::Up { at }),
            _ => None,
        }
    }
}

/// Arrow keys nudge by one grid unit; shift turns the nudge into a resize.
pub fn nudge_for_key(key: &KeyEvent) -> Option<(GestureMode, f64, f64)> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let (dx, dy) = match key.code {
        KeyCode::Left => (-1.0, 0.0),
        KeyCode::Right => (1.0, 0.0),
        KeyCode::Up => (0.0, -1.0),
        KeyCode::Down => (0.0, 1.0),
        _ => return None,
    };
    let mode = if key.modifiers.contains(KeyModifiers::SHIFT) {
        GestureMode::Resize
    } else {
        GestureMode::Move
    };
    Some((mode, dx, dy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GridPosition;
    use crate::widget::WidgetKind;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn adapter() -> MouseAdapter {
        // 6x3 cells per unit, one cell of gap
        MouseAdapter::new(GridMetrics::new(6.0, 3.0, 1.0)).with_origin(2, 1)
    }

    fn widgets() -> Vec<Widget> {
        vec![Widget::new(
            "cam",
            WidgetKind::Camera,
            GridPosition::new(1.0, 0.0, 2.0, 2.0),
        )]
    }

    #[test]
    fn press_on_widget_starts_move() {
        let event = adapter().translate(&mouse(MouseEventKind::Down(MouseButton::Left), 10, 2), &widgets());
        assert_eq!(
            event,
            Some(PointerEvent::Down {
                widget_id: "cam".into(),
                mode: GestureMode::Move,
                at: PointerPoint::new(8.0, 1.0),
            })
        );
    }

    #[test]
    fn press_on_corner_starts_resize() {
        // widget spans cells 7..20 by 0..7 relative to the origin
        let event = adapter().translate(&mouse(MouseEventKind::Down(MouseButton::Left), 21, 7), &widgets());
        assert!(matches!(
            event,
            Some(PointerEvent::Down {
                mode: GestureMode::Resize,
                ..
            })
        ));
    }

    #[test]
    fn wider_handle_reaches_further_into_the_corner() {
        let press = mouse(MouseEventKind::Down(MouseButton::Left), 19, 6);
        let mode = |adapter: MouseAdapter| match adapter.translate(&press, &widgets()) {
            Some(PointerEvent::Down { mode, .. }) => Some(mode),
            _ => None,
        };
        assert_eq!(mode(adapter()), Some(GestureMode::Move));
        assert_eq!(mode(adapter().with_resize_handle(3.0)), Some(GestureMode::Resize));
    }

    #[test]
    fn press_on_empty_cell_is_dropped() {
        let event = adapter().translate(&mouse(MouseEventKind::Down(MouseButton::Left), 3, 2), &widgets());
        assert_eq!(event, None);
    }

    #[test]
    fn drag_and_release_follow_the_left_button() {
        let adapter = adapter();
        assert_eq!(
            adapter.translate(&mouse(MouseEventKind::Drag(MouseButton::Left), 30, 11), &[]),
            Some(PointerEvent::Move {
                at: PointerPoint::new(28.0, 10.0)
            })
        );
        assert!(matches!(
            adapter.translate(&mouse(MouseEventKind::Up(MouseButton::Left), 30, 11), &[]),
            Some(PointerEvent::Up { .. })
        ));
        assert_eq!(
            adapter.translate(&mouse(MouseEventKind::Drag(MouseButton::Right), 30, 11), &[]),
            None
        );
        assert_eq!(adapter.translate(&mouse(MouseEventKind::Moved, 30, 11), &[]), None);
    }

    #[test]
    fn arrows_map_to_nudges() {
        let right = KeyEvent::new(KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(nudge_for_key(&right), Some((GestureMode::Move, 1.0, 0.0)));

        let grow = KeyEvent::new(KeyCode::Down, KeyModifiers::SHIFT);
        assert_eq!(nudge_for_key(&grow), Some((GestureMode::Resize, 0.0, 1.0)));

        let other = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(nudge_for_key(&other), None);
    }
}
