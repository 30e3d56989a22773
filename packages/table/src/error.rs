//! Error types for the table layer.

use crate::range::RangeDescriptor;

/// Failures reported by a storage substrate.
///
/// These are transport-level errors. Codec faults (length mismatches,
/// missing columns) belong to [`structsheet_codec::Error`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SubstrateError {
    /// A range reaches outside the substrate's current extent.
    #[error("range {range} is outside a {rows}x{columns} sheet")]
    OutOfBounds {
        range: RangeDescriptor,
        rows: usize,
        columns: usize,
    },

    /// Written values don't have the shape of the target range.
    #[error("expected {expected_rows}x{expected_columns} values for {range}")]
    ShapeMismatch {
        range: RangeDescriptor,
        expected_rows: usize,
        expected_columns: usize,
    },

    /// The substrate was destroyed and can't be used anymore.
    #[error("sheet has been destroyed")]
    Destroyed,

    /// Any other failure of the backing service.
    #[error("substrate error: {message}")]
    Other { message: String },
}

/// Errors at the table layer.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A codec fault, surfaced as-is.
    #[error(transparent)]
    Codec(#[from] structsheet_codec::Error),

    /// The substrate rejected a call.
    #[error("substrate call failed: {0}")]
    Substrate(#[from] SubstrateError),

    /// A body position outside `1..=count` (positions are 1-based).
    #[error("invalid body position {position}")]
    InvalidPosition { position: usize },

    /// Options that don't fit the sheet they were applied to.
    #[error("invalid options: {message}")]
    InvalidOptions { message: String },
}

/// Result type alias for table operations.
pub type Result<T> = std::result::Result<T, Error>;
