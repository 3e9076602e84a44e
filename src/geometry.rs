//! Grid-unit geometry shared by every placement stage.
//!
//! Positions live on a virtual grid whose finest increment is [`GRID_SNAP`]
//! (half a unit). All rounding goes through [`snap`] so that the resolver,
//! the section constraint and the interaction controller agree on the same
//! lattice.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Smallest increment a committed position may use, in grid units.
pub const GRID_SNAP: f64 = 0.5;

/// Largest magnitude any coordinate or span may take, in grid units.
///
/// Half units stay exact in `f64` far beyond this, so stepping a scan by
/// [`GRID_SNAP`] and adding `y + h` never lose precision.
pub const MAX_EXTENT: f64 = 1_000_000.0;

/// Round `value` to the nearest multiple of [`GRID_SNAP`].
///
/// Halfway cases round towards positive infinity, so `snap(0.25) == 0.5`
/// and `snap(-0.25) == 0.0`.
pub fn snap(value: f64) -> f64 {
    round_half_up(value / GRID_SNAP) * GRID_SNAP
}

/// Round to the nearest integer, halfway cases towards positive infinity.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Clamp `value` into `[min, max]`. When the bounds cross, `min` wins.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    min.max(max.min(value))
}

/// Top-left cell and span of a widget, in grid units.
///
/// Stored fields that are missing, `null` or not numbers load as `NaN` and
/// fall back through [`GridPosition::finite_or_default`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPosition {
    #[serde(default = "missing_field", deserialize_with = "lenient_f64")]
    pub x: f64,
    #[serde(default = "missing_field", deserialize_with = "lenient_f64")]
    pub y: f64,
    #[serde(default = "missing_field", deserialize_with = "lenient_f64")]
    pub w: f64,
    #[serde(default = "missing_field", deserialize_with = "lenient_f64")]
    pub h: f64,
}

fn missing_field() -> f64 {
    f64::NAN
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

impl GridPosition {
    /// The box every non-finite field falls back to.
    pub const MINIMAL: GridPosition = GridPosition::new(0.0, 0.0, 1.0, 1.0);

    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.w / 2.0
    }

    /// Strict rectangle intersection. Shared edges do not count.
    pub fn overlaps(&self, other: &GridPosition) -> bool {
        overlaps(self, other)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }

    /// Replace every non-finite field with the matching field of
    /// [`GridPosition::MINIMAL`].
    pub fn finite_or_default(self) -> Self {
        let pick = |value: f64, fallback: f64| if value.is_finite() { value } else { fallback };
        Self {
            x: pick(self.x, Self::MINIMAL.x),
            y: pick(self.y, Self::MINIMAL.y),
            w: pick(self.w, Self::MINIMAL.w),
            h: pick(self.h, Self::MINIMAL.h),
        }
    }

    /// [`GridPosition::finite_or_default`], then every field clamped into
    /// `[-MAX_EXTENT, MAX_EXTENT]`.
    pub fn bounded(self) -> Self {
        let position = self.finite_or_default();
        let limit = |value: f64| clamp(value, -MAX_EXTENT, MAX_EXTENT);
        Self {
            x: limit(position.x),
            y: limit(position.y),
            w: limit(position.w),
            h: limit(position.h),
        }
    }

    /// Snap and clamp into a grid of `columns` units.
    ///
    /// `w` lands in `[1, columns]`, `x` in `[0, columns - w]`, `h` in
    /// `[1, MAX_EXTENT]` and `y` in `[0, MAX_EXTENT]`. Applying it twice
    /// yields the same box.
    pub fn sanitize(self, columns: u32) -> Self {
        let columns = columns_f64(columns);
        let position = self.bounded();
        let w = clamp(snap(position.w), 1.0, columns);
        let h = snap(position.h).max(1.0);
        let x = clamp(snap(position.x), 0.0, (columns - w).max(0.0));
        let y = snap(position.y).max(0.0);
        Self { x, y, w, h }
    }

    pub fn with_origin(self, x: f64, y: f64) -> Self {
        Self { x, y, ..self }
    }

    pub fn with_size(self, w: f64, h: f64) -> Self {
        Self { w, h, ..self }
    }
}

/// Open-interval rectangle test: touching edges are not an overlap.
pub fn overlaps(a: &GridPosition, b: &GridPosition) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// Column counts below one are treated as a single column.
pub(crate) fn columns_f64(columns: u32) -> f64 {
    f64::from(columns.max(1))
}

/// Pixel rectangle handed to a renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Pixel metrics of a rendered grid.
///
/// One grid unit advances by `cell + gap` pixels; a span of `n` units is
/// `n` cells plus the `n - 1` gaps between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    pub cell_width: f64,
    pub row_height: f64,
    pub gap: f64,
}

impl GridMetrics {
    pub const fn new(cell_width: f64, row_height: f64, gap: f64) -> Self {
        Self {
            cell_width,
            row_height,
            gap,
        }
    }

    /// Square cells sized so that `columns` cells and their gaps fill `canvas_width`.
    pub fn for_canvas(canvas_width: f64, columns: u32, gap: f64) -> Self {
        let cell = cell_width_for(canvas_width, columns, gap);
        Self::new(cell, cell, gap)
    }

    pub fn step_x(&self) -> f64 {
        self.cell_width + self.gap
    }

    pub fn step_y(&self) -> f64 {
        self.row_height + self.gap
    }

    pub fn rect_for(&self, position: &GridPosition) -> PixelRect {
        PixelRect {
            left: position.x * self.step_x(),
            top: position.y * self.step_y(),
            width: position.w * self.cell_width + (position.w - 1.0) * self.gap,
            height: position.h * self.row_height + (position.h - 1.0) * self.gap,
        }
    }
}

/// Width of one cell when `columns` cells separated by `gap` fill `canvas_width`.
pub fn cell_width_for(canvas_width: f64, columns: u32, gap: f64) -> f64 {
    let columns = columns_f64(columns);
    let total_gap = (columns - 1.0) * gap;
    ((canvas_width - total_gap) / columns).max(0.0)
}
