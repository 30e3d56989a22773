//! Table options.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tunables for a [`Table`](crate::Table).
///
/// Every field has a default, so options can be deserialized from partial
/// input:
///
/// ```rust
/// use structsheet_table::Options;
///
/// let options: Options = serde_json::from_str(r#"{"header_offset": 1}"#).unwrap();
/// assert_eq!(options.header_offset, 1);
/// assert!(!options.wipe_cache_every_operation);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Read headers from this many rows above the last frozen row.
    ///
    /// Lets the frozen block end with a filter row while the keys sit
    /// higher up.
    pub header_offset: usize,

    /// Drop every cached value after each public table operation.
    pub wipe_cache_every_operation: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_header_offset(mut self, offset: usize) -> Self {
        self.header_offset = offset;
        self
    }

    #[must_use]
    pub fn with_wipe_cache_every_operation(mut self, wipe: bool) -> Self {
        self.wipe_cache_every_operation = wipe;
        self
    }

    /// Check the options against a sheet with `header_rows` header rows.
    ///
    /// # Errors
    ///
    /// `InvalidOptions` if the offset would move the header row above the
    /// first row.
    pub fn validate(&self, header_rows: usize) -> Result<()> {
        if self.header_offset >= header_rows {
            return Err(Error::InvalidOptions {
                message: format!(
                    "header_offset {} needs more than {} header rows",
                    self.header_offset, header_rows
                ),
            });
        }
        Ok(())
    }
}
