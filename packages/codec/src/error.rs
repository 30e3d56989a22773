//! Error types for the codec layer.

use std::fmt;

/// Why a member was left out of a flattened record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// The member was `Value::Absent`.
    Absent,
    /// A float that is NaN or infinite.
    NonFiniteFloat,
    /// A mapping member with an empty name.
    EmptyName,
    /// A sequence or mapping with no members below the root.
    EmptyContainer,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DropReason::Absent => "absent value",
            DropReason::NonFiniteFloat => "non-finite float",
            DropReason::EmptyName => "empty member name",
            DropReason::EmptyContainer => "empty container",
        };
        f.write_str(text)
    }
}

/// Errors raised while converting between structured values and rows.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A row was decoded against a header set of a different length.
    #[error("row has {row} cells but there are {headers} headers")]
    RowHeaderLengthMismatch { row: usize, headers: usize },

    /// A requested column path is not part of the header set.
    #[error("column \"{header}\" not found")]
    ColumnNotFound { header: String },

    /// Columns can only be appended, never removed or reordered.
    #[error("cannot reduce or reorder columns: {current} current, {requested} requested")]
    HeaderReductionUnsupported { current: usize, requested: usize },

    /// Diagnostic for a member that flattening left out.
    #[error("dropped member at \"{path}\": {reason}")]
    UnrepresentableValueDropped { path: String, reason: DropReason },

    /// Conversion to or from a serde data model failed.
    #[error("conversion failed: {message}")]
    Conversion { message: String },
}

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
