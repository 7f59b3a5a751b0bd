use thiserror::Error;

use crate::model::{ComponentId, WireId};

/// Errors reported to callers of the schematic core.
///
/// Interactive outcomes (a rejected drag step, a component that is not on a
/// straight run) are not errors; they come back as `Ok(false)`.
#[derive(Debug, Error)]
pub enum SchematicError {
    #[error("unknown component {0}")]
    UnknownComponent(ComponentId),

    #[error("unknown wire {0}")]
    UnknownWire(WireId),

    #[error("parameter '{0}' must be finite and within coordinate bounds")]
    BadCoordinate(&'static str),

    #[error("a wire needs at least two points, got {0}")]
    TooFewPoints(usize),

    #[error("{what} limit exceeded: {got} > {max}")]
    LimitExceeded {
        what: &'static str,
        max: usize,
        got: usize,
    },

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SchematicError {
    /// Stable machine-readable code, used by the JS bindings.
    pub fn code(&self) -> &'static str {
        match self {
            SchematicError::UnknownComponent(_) | SchematicError::UnknownWire(_) => "invalid_id",
            SchematicError::BadCoordinate(_) => "non_finite",
            SchematicError::TooFewPoints(_) => "invalid_wire",
            SchematicError::LimitExceeded { .. } => "limit_exceeded",
            SchematicError::InvalidDocument(_) | SchematicError::Json(_) => "invalid_document",
        }
    }
}
