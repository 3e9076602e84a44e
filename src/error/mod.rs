//! Error types for the placement engine.
//!
//! Placement itself never fails; these cover the surfaces around it such as
//! unknown widget ids, gesture misuse and (de)serialization of the layout.

mod types;

pub use types::{GridError, Result};
