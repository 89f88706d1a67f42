//! Error types for overlay operations

use perch_types::ParsePlacementError;
use thiserror::Error;

/// Errors surfaced by the positioning engine and its hosts
#[derive(Debug, Error)]
pub enum PerchError {
    #[error("invalid placement")]
    InvalidPlacement(#[from] ParsePlacementError),

    #[error("anchor '{name}' not found")]
    UnknownAnchor { name: String },
}
