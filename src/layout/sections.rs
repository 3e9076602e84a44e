//! Primary-section constraint.
//!
//! The grid is split into [`PRIMARY_SECTION_COUNT`] equal sections, each cut
//! into [`SUB_COLUMNS_PER_SECTION`] sub-columns. A constrained widget sits
//! entirely inside one section, its width and offset are whole sub-columns
//! and it is never wider than a section.

use crate::geometry::{GridPosition, clamp, columns_f64, round_half_up, snap};

pub const PRIMARY_SECTION_COUNT: usize = 3;
pub const SUB_COLUMNS_PER_SECTION: usize = 3;

/// Width of one primary section; never below one grid unit.
pub fn section_width(columns: u32) -> f64 {
    (columns_f64(columns) / PRIMARY_SECTION_COUNT as f64).max(1.0)
}

pub fn sub_column_width(columns: u32) -> f64 {
    section_width(columns) / SUB_COLUMNS_PER_SECTION as f64
}

/// Section whose span contains `center`, clamped to the valid range.
pub fn section_index(center: f64, columns: u32) -> usize {
    section_for(center, section_width(columns))
}

/// `[start, end)` of section `index`, cut at the grid edge.
pub fn section_bounds(index: usize, columns: u32) -> (f64, f64) {
    let width = section_width(columns);
    let start = index as f64 * width;
    let end = columns_f64(columns).min((index as f64 + 1.0) * width);
    (start, end)
}

/// Pull `position` into a single primary section on the sub-column lattice.
///
/// Over-wide boxes shrink to one section; the section is picked from the
/// horizontal center of the (resized) box. Vertical values are snapped the
/// same way the resolver snaps them.
pub fn constrain(position: GridPosition, columns: u32) -> GridPosition {
    let position = position.finite_or_default();
    let columns_width = columns_f64(columns);
    let section = section_width(columns);
    let sub_column = sub_column_width(columns);

    let min_width = section.min(sub_column);
    let w = clamp(snap_to_sub_columns(position.w, sub_column, 1.0), min_width, section);
    let h = snap(position.h).max(1.0);
    let y = snap(position.y).max(0.0);

    let tentative_x = position.x.max(0.0);
    let index = section_for(tentative_x + w / 2.0, section);
    let (start, end) = section_bounds(index, columns);

    let local_x = clamp(tentative_x - start, 0.0, (end - start - w).max(0.0));
    let snapped_local = snap_to_sub_columns(local_x, sub_column, 0.0);
    let x = clamp(start + snapped_local, start, start.max(end - w));
    // Grids narrower than three units have sections hanging past the edge.
    let x = clamp(x, 0.0, (columns_width - w).max(0.0));

    GridPosition { x, y, w, h }
}

fn section_for(center: f64, section: f64) -> usize {
    let raw = (center / section).floor();
    clamp(raw, 0.0, (PRIMARY_SECTION_COUNT - 1) as f64) as usize
}

fn snap_to_sub_columns(value: f64, sub_column: f64, min_steps: f64) -> f64 {
    let steps = round_half_up(value / sub_column).max(min_steps);
    steps * sub_column
}
