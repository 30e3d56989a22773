//! StructSheet Table: lists of structured values on a spreadsheet-like grid.
//!
//! A [`Table`] keeps one value per body row of a [`Substrate`]. The header
//! row names a flattened path per column (see `structsheet-codec`); body
//! rows are addressed by 1-based position below the header block.
//!
//! Layers, bottom up:
//! - `Substrate`: the grid (`MemorySheet` keeps it in memory)
//! - `RangeMapper`: body positions to substrate ranges
//! - `TableCache`: derived quantities, patched on every mutation
//! - `TableStore`: header preparation, inserts, reads, predicate updates and
//!   deletes
//! - `Table`: the caller-facing API
//!
//! # Example
//!
//! ```rust
//! use structsheet_codec::{from_json, Value};
//! use structsheet_table::{MemorySheet, Options, Table};
//! use serde_json::json;
//!
//! let mut table = Table::open(MemorySheet::new(), Options::default()).unwrap();
//! table
//!     .add_append(&[from_json(json!({"id": 1})), from_json(json!({"id": 2}))])
//!     .unwrap();
//! table
//!     .remove_like(|v| v.member("id") == Some(&Value::from(1i64)))
//!     .unwrap();
//! assert_eq!(table.get_all().unwrap(), vec![from_json(json!({"id": 2}))]);
//! ```

mod cache;
mod error;
mod memory;
mod options;
mod range;
mod store;
mod substrate;
mod table;

pub use cache::{CachedField, TableCache};
pub use error::{Error, Result, SubstrateError};
pub use memory::MemorySheet;
pub use options::Options;
pub use range::{
    deletion_order, InsertPlacement, InsertPlan, RangeDescriptor, RangeMapper, RowInsertion,
};
pub use store::TableStore;
pub use substrate::Substrate;
pub use table::Table;
