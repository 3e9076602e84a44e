//! Responsive display layouts derived from the canonical layout.
//!
//! A display layout is never persisted. [`project`] is a pure function of
//! the canonical widgets, the canonical column count and the display mode,
//! so its output can be memoized (see [`ProjectionCache`]). Edits made while
//! looking at a display go back through [`map_back`].

mod cache;
mod skyline;
mod zones;

use std::cmp::Ordering;

use serde::Serialize;

use crate::geometry::GridPosition;
use crate::layout::{section_index, section_width};
use crate::widget::Widget;

pub use cache::{CachedLookup, CacheStats, ProjectionCache, ProjectionKey};
pub use skyline::{compact_size, sectioned_size};

/// Columns of the sectioned desktop display.
pub const SECTIONED_COLUMNS: u32 = 9;
/// Width of one zone inside a display, in display columns.
pub const DISPLAY_ZONE_WIDTH: u32 = 3;
/// Vertical gap between stacked zones, in grid units.
pub const ZONE_STACK_GAP: f64 = 1.0;
/// Viewport width below which the compact display is used.
pub const DEFAULT_COMPACT_BREAKPOINT: f64 = 700.0;

/// How zones are arranged in a zone-partitioned display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneArrangement {
    /// Zones next to each other, 9 columns wide.
    SideBySide,
    /// Zones on top of each other, first zone first.
    Stacked,
    /// Zones on top of each other, last zone first.
    StackedReversed,
}

/// Device class a display layout is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// 9 columns in 3 zones, skyline packed with the per-kind size table.
    Sectioned,
    /// A single column, widgets stacked in priority order.
    Compact,
    /// Widgets kept in the zone of their canonical center, each zone
    /// normalized on its own 3-column grid.
    Zoned(ZoneArrangement),
}

impl DisplayMode {
    /// Compact below `breakpoint`, sectioned otherwise.
    pub fn for_viewport(width: f64, breakpoint: f64) -> Self {
        if width < breakpoint {
            DisplayMode::Compact
        } else {
            DisplayMode::Sectioned
        }
    }

    pub fn columns(&self) -> u32 {
        match self {
            DisplayMode::Sectioned | DisplayMode::Zoned(ZoneArrangement::SideBySide) => {
                SECTIONED_COLUMNS
            }
            DisplayMode::Compact => 1,
            DisplayMode::Zoned(_) => DISPLAY_ZONE_WIDTH,
        }
    }

    fn is_stacked(&self) -> bool {
        matches!(
            self,
            DisplayMode::Zoned(ZoneArrangement::Stacked | ZoneArrangement::StackedReversed)
        )
    }
}

/// A widget as shown in a display, plus the canonical position it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayWidget {
    pub widget: Widget,
    pub source: GridPosition,
}

/// Vertical extent of one zone in a stacked display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneBand {
    pub zone: usize,
    pub top: f64,
    pub bottom: f64,
}

/// Derived, device-specific layout handed to a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayLayout {
    pub mode: DisplayMode,
    pub columns: u32,
    pub widgets: Vec<DisplayWidget>,
    /// Zone bands, only filled for stacked zone displays.
    pub bands: Vec<ZoneBand>,
}

impl DisplayLayout {
    pub fn get(&self, widget_id: &str) -> Option<&DisplayWidget> {
        self.widgets.iter().find(|entry| entry.widget.id == widget_id)
    }

    pub fn position_of(&self, widget_id: &str) -> Option<GridPosition> {
        self.get(widget_id).map(|entry| entry.widget.position)
    }

    /// Bottom edge of the lowest displayed widget.
    pub fn height(&self) -> f64 {
        self.widgets
            .iter()
            .fold(0.0_f64, |max, entry| max.max(entry.widget.position.bottom()))
    }

    /// Displayed widgets with their display positions.
    pub fn widgets(&self) -> Vec<Widget> {
        self.widgets.iter().map(|entry| entry.widget.clone()).collect()
    }

    fn band_at(&self, y: f64) -> Option<ZoneBand> {
        self.bands
            .iter()
            .copied()
            .filter(|band| band.top <= y)
            .last()
            .or_else(|| self.bands.first().copied())
    }
}

/// Derive the display layout for `mode` from the canonical widgets.
///
/// Does not touch `widgets`; equal inputs always give equal outputs.
pub fn project(widgets: &[Widget], canonical_columns: u32, mode: DisplayMode) -> DisplayLayout {
    let ordered = priority_order(widgets);
    let (placed, bands) = match mode {
        DisplayMode::Sectioned => (skyline::pack_sectioned(&ordered, canonical_columns), Vec::new()),
        DisplayMode::Compact => (skyline::pack_compact(&ordered), Vec::new()),
        DisplayMode::Zoned(arrangement) => {
            zones::pack_zones(&ordered, canonical_columns, arrangement)
        }
    };

    DisplayLayout {
        mode,
        columns: mode.columns(),
        widgets: placed,
        bands,
    }
}

/// Translate a position edited inside `display` back to canonical coordinates.
///
/// Horizontal values go through the zone of the edited box: the offset and
/// width inside the 3-column display zone are rescaled to the canonical
/// section width and snapped again, so the result only approximates an
/// inverse when the canonical section width is not a whole number of
/// display columns. Vertical values are taken from the display. Compact
/// displays collapse the horizontal axis, so the canonical `x` and `w` of
/// the widget are kept and its height is rescaled by the ratio the
/// projection applied.
pub fn map_back(
    display: &DisplayLayout,
    widget_id: &str,
    position: GridPosition,
    canonical_columns: u32,
) -> GridPosition {
    let position = position.finite_or_default();
    match display.mode {
        DisplayMode::Compact => map_back_compact(display, widget_id, position, canonical_columns),
        mode if mode.is_stacked() => {
            let (zone, top) = display
                .band_at(position.y)
                .map(|band| (band.zone, band.top))
                .unwrap_or((0, 0.0));
            rescale_from_zone(
                zone,
                position.with_origin(position.x, position.y - top),
                canonical_columns,
            )
        }
        _ => {
            let zone = section_index(position.center_x(), SECTIONED_COLUMNS);
            let local_x = position.x - (zone as u32 * DISPLAY_ZONE_WIDTH) as f64;
            rescale_from_zone(
                zone,
                position.with_origin(local_x, position.y),
                canonical_columns,
            )
        }
    }
}

fn rescale_from_zone(zone: usize, local: GridPosition, canonical_columns: u32) -> GridPosition {
    let section = section_width(canonical_columns);
    let scale = section / DISPLAY_ZONE_WIDTH as f64;
    GridPosition {
        x: zone as f64 * section + local.x * scale,
        y: local.y,
        w: local.w * scale,
        h: local.h,
    }
    .sanitize(canonical_columns)
}

fn map_back_compact(
    display: &DisplayLayout,
    widget_id: &str,
    position: GridPosition,
    canonical_columns: u32,
) -> GridPosition {
    let Some(entry) = display.get(widget_id) else {
        return position.with_origin(0.0, position.y).sanitize(canonical_columns);
    };
    let source = entry.source.finite_or_default();
    let projected_h = entry.widget.position.h;
    let h = if projected_h > 0.0 {
        source.h * position.h / projected_h
    } else {
        source.h
    };
    GridPosition::new(source.x, position.y, source.w, h).sanitize(canonical_columns)
}

/// Kind priority, then `y`, then `x`, then `id`.
pub(crate) fn priority_order(widgets: &[Widget]) -> Vec<&Widget> {
    let mut ordered: Vec<&Widget> = widgets.iter().collect();
    ordered.sort_by(|a, b| compare_priority(a, b));
    ordered
}

fn compare_priority(a: &Widget, b: &Widget) -> Ordering {
    let pa = a.position.finite_or_default();
    let pb = b.position.finite_or_default();
    a.kind
        .priority()
        .cmp(&b.kind.priority())
        .then_with(|| pa.y.total_cmp(&pb.y))
        .then_with(|| pa.x.total_cmp(&pb.x))
        .then_with(|| a.id.cmp(&b.id))
}
