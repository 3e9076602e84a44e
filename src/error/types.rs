use thiserror::Error;

/// Unified result type for the dashgrid crate.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors surfaced around the placement engine.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("column count must be at least 1 (got {0})")]
    InvalidColumns(u32),
    #[error("widget `{0}` not found")]
    WidgetNotFound(String),
    #[error("a gesture on widget `{0}` is already in progress")]
    GestureInProgress(String),
    #[error("no gesture in progress")]
    NoActiveGesture,
    #[error("layout serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
