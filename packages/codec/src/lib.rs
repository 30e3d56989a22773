//! StructSheet Codec: structured values as flat table rows.
//!
//! This layer converts between nested values and the rows of a
//! column-oriented table:
//! - `Value`: a tree of mappings and sequences with `Scalar` leaves
//! - `Path`: a location in that tree, joined into a column key with `.`
//! - `flatten`/`unflatten`: `Value` <-> `FlatRecord` (key -> scalar)
//! - `HeaderSet`/`append_merge`: append-only column layouts
//! - `to_row`/`to_value`: `Value` <-> `Row` under a header snapshot
//! - `bundle`: scattered row positions -> consecutive `IndexRun`s
//!
//! Nothing here talks to storage; see `structsheet-table` for that.
//!
//! # Example
//!
//! ```rust
//! use structsheet_codec::{from_json, get_all_headers, to_row, to_value};
//!
//! let car = from_json(serde_json::json!({"make": "honda", "owners": ["a", "b"]}));
//! let headers = get_all_headers([&car]);
//! assert_eq!(headers.as_slice(), ["make", "owners.0", "owners.1"]);
//!
//! let row = to_row(&car, &headers);
//! assert_eq!(to_value(&row, &headers).unwrap(), car);
//! ```

mod bundle;
pub mod convert;
mod error;
mod flatten;
mod header;
mod path;
mod row;
mod unflatten;
mod value;

pub use bundle::{bundle, IndexRun};
pub use convert::{from_json, to_json};
pub use error::{DropReason, Error, Result};
pub use flatten::{flatten, flatten_with_diagnostics, get_all_headers, FlatRecord};
pub use header::{append_merge, check_extension, HeaderSet};
pub use path::{escape_segment, Path, DELIMITER, ESCAPE};
pub use row::{to_row, to_rows, to_value, to_values, Row};
pub use unflatten::{
    is_index_segment, unflatten, SEQUENCE_SPAN_FLOOR, SEQUENCE_SPAN_PER_ITEM,
};
pub use value::{Scalar, Value};
