//! Placement module orchestrator.
//!
//! Callers import the resolver, the normalizer and the section constraint
//! from here; the scan internals stay private to `core`.

mod core;
pub mod sections;

pub use self::core::{
    NormalizeReport, Placement, Resolution, is_non_overlapping, max_occupied_row, normalize,
    normalize_with_report, resolve, resolve_detailed,
};
pub use sections::{
    PRIMARY_SECTION_COUNT, SUB_COLUMNS_PER_SECTION, constrain, section_bounds, section_index,
    section_width, sub_column_width,
};
