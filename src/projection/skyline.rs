//! Shelf/skyline packing for the sectioned and compact displays.
//!
//! Both packers keep one stack height per display column and drop each
//! widget at the lowest stack that fits its width.

use crate::geometry::{GridPosition, round_half_up};
use crate::layout::section_index;
use crate::widget::{Widget, WidgetKind};

use super::{DISPLAY_ZONE_WIDTH, DisplayWidget, SECTIONED_COLUMNS};

const ZONE_COUNT: usize = (SECTIONED_COLUMNS / DISPLAY_ZONE_WIDTH) as usize;

/// `(w, h)` of a widget in the sectioned display.
pub fn sectioned_size(widget: &Widget) -> (f64, f64) {
    let zone = f64::from(DISPLAY_ZONE_WIDTH);
    let wide = (zone * 2.0).min(f64::from(SECTIONED_COLUMNS));
    match widget.kind {
        WidgetKind::State => (1.0, 1.0),
        WidgetKind::Camera => (zone, 2.1),
        WidgetKind::Solar => (wide, 3.2),
        WidgetKind::Grafana => (wide, 2.8),
        WidgetKind::Weather => (zone, 2.2),
        WidgetKind::Energy => (zone, 2.4),
        WidgetKind::Other => (1.0, fallback_height(widget, 1.0)),
    }
}

/// `(w, h)` of a widget in the compact display.
pub fn compact_size(widget: &Widget) -> (f64, f64) {
    match widget.kind {
        WidgetKind::State => (1.0, 1.0),
        WidgetKind::Camera => (1.0, 2.2),
        WidgetKind::Solar => (1.0, 3.8),
        WidgetKind::Grafana => (1.0, 2.8),
        WidgetKind::Weather => (1.0, 1.8),
        WidgetKind::Energy => (1.0, 2.0),
        WidgetKind::Other => (1.0, fallback_height(widget, 1.5)),
    }
}

fn fallback_height(widget: &Widget, minimum: f64) -> f64 {
    let h = widget.position.h;
    if h.is_finite() { h.max(minimum) } else { minimum }
}

/// Zone a widget would like to land in on the sectioned display.
///
/// State widgets gather in the first zone; everything else follows its
/// canonical horizontal center.
fn preferred_zone(widget: &Widget, canonical_columns: u32) -> usize {
    if widget.kind == WidgetKind::State {
        return 0;
    }
    section_index(
        widget.position.finite_or_default().center_x(),
        canonical_columns,
    )
}

pub(crate) fn pack_sectioned(ordered: &[&Widget], canonical_columns: u32) -> Vec<DisplayWidget> {
    let zone_width = DISPLAY_ZONE_WIDTH as usize;
    let mut heights = vec![0.0_f64; SECTIONED_COLUMNS as usize];

    ordered
        .iter()
        .map(|widget| {
            let (w, h) = sectioned_size(widget);
            let preferred = preferred_zone(widget, canonical_columns);

            let position = if w <= 1.0 {
                let start = preferred * zone_width;
                let mut best_local = 0;
                let mut best_y = f64::INFINITY;
                for offset in 0..zone_width {
                    let y = heights[start + offset];
                    if y < best_y {
                        best_y = y;
                        best_local = offset;
                    }
                }
                let column = start + best_local;
                heights[column] = best_y + h;
                GridPosition::new(column as f64, best_y, 1.0, h)
            } else {
                let span = (round_half_up(w / zone_width as f64) as usize).clamp(1, ZONE_COUNT);
                let max_start = ZONE_COUNT - span;
                let preferred = preferred.min(max_start);

                let mut best_zone = preferred;
                let mut best_y = f64::INFINITY;
                for zone in 0..=max_start {
                    let start = zone * zone_width;
                    let y = stack_height(&heights[start..start + span * zone_width]);
                    if y < best_y || (y == best_y && zone == preferred) {
                        best_y = y;
                        best_zone = zone;
                    }
                }

                let start = best_zone * zone_width;
                let end = start + span * zone_width;
                for height in &mut heights[start..end] {
                    *height = best_y + h;
                }
                GridPosition::new(start as f64, best_y, (span * zone_width) as f64, h)
            };

            DisplayWidget {
                widget: widget.placed_at(position),
                source: widget.position,
            }
        })
        .collect()
}

pub(crate) fn pack_compact(ordered: &[&Widget]) -> Vec<DisplayWidget> {
    pack_columns(ordered, 1, compact_size)
}

/// Generic skyline over `columns` unit-wide stacks; leftmost wins ties.
fn pack_columns(
    ordered: &[&Widget],
    columns: usize,
    size_of: fn(&Widget) -> (f64, f64),
) -> Vec<DisplayWidget> {
    let columns = columns.max(1);
    let mut heights = vec![0.0_f64; columns];

    ordered
        .iter()
        .map(|widget| {
            let (w, h) = size_of(widget);
            let span = (w.max(1.0) as usize).min(columns);
            let mut best_start = 0;
            let mut best_y = f64::INFINITY;
            for start in 0..=columns - span {
                let y = stack_height(&heights[start..start + span]);
                if y < best_y {
                    best_y = y;
                    best_start = start;
                }
            }
            for height in &mut heights[best_start..best_start + span] {
                *height = best_y + h;
            }
            DisplayWidget {
                widget: widget.placed_at(GridPosition::new(
                    best_start as f64,
                    best_y,
                    span as f64,
                    h,
                )),
                source: widget.position,
            }
        })
        .collect()
}

fn stack_height(heights: &[f64]) -> f64 {
    heights.iter().fold(0.0_f64, |max, height| max.max(*height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{DisplayMode, project};

    fn widget(id: &str, kind: WidgetKind, x: f64, y: f64, w: f64, h: f64) -> Widget {
        Widget::new(id, kind, GridPosition::new(x, y, w, h))
    }

    #[test]
    fn state_widgets_fill_first_zone_sub_columns() {
        let widgets: Vec<Widget> = (0..4)
            .map(|i| widget(&format!("s{i}"), WidgetKind::State, 8.0, i as f64, 1.0, 1.0))
            .collect();
        let display = project(&widgets, 9, DisplayMode::Sectioned);
        let positions: Vec<_> = display.widgets.iter().map(|e| e.widget.position).collect();
        assert_eq!(
            positions,
            vec![
                GridPosition::new(0.0, 0.0, 1.0, 1.0),
                GridPosition::new(1.0, 0.0, 1.0, 1.0),
                GridPosition::new(2.0, 0.0, 1.0, 1.0),
                GridPosition::new(0.0, 1.0, 1.0, 1.0),
            ]
        );
    }

    #[test]
    fn wide_widgets_take_lowest_zone_span() {
        let widgets = vec![
            widget("lamp", WidgetKind::State, 0.0, 0.0, 1.0, 1.0),
            widget("cam", WidgetKind::Camera, 0.0, 1.0, 3.0, 2.0),
            widget("solar", WidgetKind::Solar, 0.0, 3.0, 9.0, 3.0),
        ];
        let display = project(&widgets, 9, DisplayMode::Sectioned);

        // camera prefers zone 0 but zone 1 is lower
        assert_eq!(
            display.position_of("cam"),
            Some(GridPosition::new(3.0, 0.0, 3.0, 2.1))
        );
        // solar spans two zones; starting at zone 1 stacks on the camera,
        // starting at zone 0 stacks on camera too, so the preferred start wins
        assert_eq!(
            display.position_of("solar"),
            Some(GridPosition::new(3.0, 2.1, 6.0, 3.2))
        );
    }

    #[test]
    fn ties_prefer_the_zone_of_the_canonical_center() {
        let widgets = vec![widget("weather", WidgetKind::Weather, 7.0, 0.0, 2.0, 2.0)];
        let display = project(&widgets, 9, DisplayMode::Sectioned);
        assert_eq!(
            display.position_of("weather"),
            Some(GridPosition::new(6.0, 0.0, 3.0, 2.2))
        );
    }

    #[test]
    fn unknown_kinds_keep_their_height() {
        let widgets = vec![widget("clock", WidgetKind::Other, 0.0, 0.0, 2.0, 2.5)];
        let sectioned = project(&widgets, 9, DisplayMode::Sectioned);
        assert_eq!(
            sectioned.position_of("clock"),
            Some(GridPosition::new(0.0, 0.0, 1.0, 2.5))
        );

        let small = vec![widget("clock", WidgetKind::Other, 0.0, 0.0, 2.0, 1.0)];
        let compact = project(&small, 9, DisplayMode::Compact);
        assert_eq!(
            compact.position_of("clock"),
            Some(GridPosition::new(0.0, 0.0, 1.0, 1.5))
        );
    }

    #[test]
    fn compact_stacks_in_priority_order() {
        let widgets = vec![
            widget("cam", WidgetKind::Camera, 0.0, 0.0, 6.0, 4.0),
            widget("lamp", WidgetKind::State, 6.0, 0.0, 1.0, 1.0),
            widget("energy", WidgetKind::Energy, 0.0, 4.0, 6.0, 3.0),
        ];
        let display = project(&widgets, 9, DisplayMode::Compact);
        let stacked: Vec<_> = display
            .widgets
            .iter()
            .map(|e| (e.widget.id.as_str(), e.widget.position))
            .collect();
        assert_eq!(
            stacked,
            vec![
                ("lamp", GridPosition::new(0.0, 0.0, 1.0, 1.0)),
                ("cam", GridPosition::new(0.0, 1.0, 1.0, 2.2)),
                ("energy", GridPosition::new(0.0, 3.2, 1.0, 2.0)),
            ]
        );
    }
}
