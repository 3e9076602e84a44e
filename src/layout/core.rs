use crate::geometry::{GRID_SNAP, GridPosition, columns_f64};
use crate::widget::Widget;

/// Rows scanned below the proposed row before giving up on a free slot.
const SCAN_AHEAD_ROWS: f64 = 40.0;
/// Rows scanned below the lowest occupied row before giving up.
const SCAN_MARGIN_ROWS: f64 = 20.0;

/// How the resolver arrived at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The sanitized proposal was free.
    Direct,
    /// The proposal collided and the row-major scan found another slot.
    Displaced,
    /// The scan was exhausted; the box went below everything.
    Fallback,
}

/// Resolved position plus the path that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub position: GridPosition,
    pub placement: Placement,
}

/// Tally of what a normalization pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Widgets whose position differs from the input.
    pub moved: usize,
    pub displaced: usize,
    pub fallbacks: usize,
}

impl NormalizeReport {
    pub fn changed(&self) -> bool {
        self.moved > 0
    }
}

/// Place `widget_id` at (or near) `proposed` without overlapping any other
/// widget in `widgets`.
///
/// The proposal is snapped and clamped into the grid first. If it still
/// collides, the first free box of the same size in row-major order from the
/// proposed row wins: topmost, then leftmost. Never fails.
pub fn resolve(
    widgets: &[Widget],
    widget_id: &str,
    proposed: GridPosition,
    columns: u32,
) -> GridPosition {
    resolve_detailed(widgets, widget_id, proposed, columns).position
}

/// Same as [`resolve`], also reporting which placement path was taken.
pub fn resolve_detailed(
    widgets: &[Widget],
    widget_id: &str,
    proposed: GridPosition,
    columns: u32,
) -> Resolution {
    let others: Vec<GridPosition> = widgets
        .iter()
        .filter(|widget| widget.id != widget_id)
        .map(|widget| widget.position.bounded())
        .collect();
    place(&others, proposed, columns)
}

/// Resolve every widget, in input order, against the ones placed before it.
///
/// The result is pairwise non-overlapping whatever the input, and feeding an
/// already-normalized list back in with the same `columns` changes nothing.
pub fn normalize(widgets: &[Widget], columns: u32) -> Vec<Widget> {
    normalize_with_report(widgets, columns).0
}

pub fn normalize_with_report(widgets: &[Widget], columns: u32) -> (Vec<Widget>, NormalizeReport) {
    let mut report = NormalizeReport::default();
    let mut occupied: Vec<GridPosition> = Vec::with_capacity(widgets.len());
    let mut placed = Vec::with_capacity(widgets.len());

    for widget in widgets {
        let resolution = place(&occupied, widget.position, columns);
        match resolution.placement {
            Placement::Direct => {}
            Placement::Displaced => report.displaced += 1,
            Placement::Fallback => report.fallbacks += 1,
        }
        if resolution.position != widget.position {
            report.moved += 1;
        }
        occupied.push(resolution.position);
        placed.push(widget.placed_at(resolution.position));
    }

    (placed, report)
}

/// Bottom edge of the lowest widget, or `0` for an empty set.
pub fn max_occupied_row(widgets: &[Widget]) -> f64 {
    let positions: Vec<GridPosition> = widgets
        .iter()
        .map(|widget| widget.position.bounded())
        .collect();
    lowest_edge(&positions)
}

/// True when no two widgets overlap.
pub fn is_non_overlapping(widgets: &[Widget]) -> bool {
    widgets.iter().enumerate().all(|(idx, a)| {
        widgets[idx + 1..]
            .iter()
            .all(|b| !a.position.overlaps(&b.position))
    })
}

fn place(others: &[GridPosition], proposed: GridPosition, columns: u32) -> Resolution {
    let sanitized = proposed.sanitize(columns);
    if !collides(others, &sanitized) {
        return Resolution {
            position: sanitized,
            placement: Placement::Direct,
        };
    }

    let depth = (sanitized.y + SCAN_AHEAD_ROWS).max(lowest_edge(others) + SCAN_MARGIN_ROWS);
    scan_free_slot(others, sanitized, columns, depth)
}

fn scan_free_slot(
    others: &[GridPosition],
    sanitized: GridPosition,
    columns: u32,
    depth: f64,
) -> Resolution {
    let max_x = (columns_f64(columns) - sanitized.w).max(0.0);

    let mut y = sanitized.y;
    while y <= depth {
        let mut x = 0.0;
        while x <= max_x {
            let candidate = sanitized.with_origin(x, y);
            if !collides(others, &candidate) {
                return Resolution {
                    position: candidate,
                    placement: Placement::Displaced,
                };
            }
            x += GRID_SNAP;
        }
        y += GRID_SNAP;
    }

    Resolution {
        position: sanitized.with_origin(0.0, depth + 1.0),
        placement: Placement::Fallback,
    }
}

fn collides(others: &[GridPosition], candidate: &GridPosition) -> bool {
    others.iter().any(|other| candidate.overlaps(other))
}

fn lowest_edge(positions: &[GridPosition]) -> f64 {
    positions
        .iter()
        .fold(0.0_f64, |max, position| max.max(position.bottom()))
}
