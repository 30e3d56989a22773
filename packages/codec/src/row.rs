//! Row Codec: structured values <-> positional rows.

use crate::error::{Error, Result};
use crate::flatten::{flatten, FlatRecord};
use crate::header::HeaderSet;
use crate::unflatten::unflatten;
use crate::{Scalar, Value};

/// Cells aligned one-to-one with a header set snapshot.
pub type Row = Vec<Scalar>;

/// Encode a value as a row in header order.
///
/// Headers the value has no field for get the sentinel. The row always has
/// exactly `headers.len()` cells; fields with no header are not written.
pub fn to_row(value: &Value, headers: &HeaderSet) -> Row {
    let mut record = flatten(value);
    headers
        .iter()
        .map(|header| record.remove(header).unwrap_or_else(Scalar::empty))
        .collect()
}

/// Decode a row written under `headers`.
///
/// # Errors
///
/// `RowHeaderLengthMismatch` if the row and headers differ in length. Rows
/// are never truncated or padded to fit.
pub fn to_value(row: &[Scalar], headers: &HeaderSet) -> Result<Value> {
    if row.len() != headers.len() {
        return Err(Error::RowHeaderLengthMismatch {
            row: row.len(),
            headers: headers.len(),
        });
    }

    let record: FlatRecord = headers
        .iter()
        .zip(row)
        .filter(|(_, cell)| !cell.is_sentinel())
        .map(|(header, cell)| (header.clone(), cell.clone()))
        .collect();

    Ok(unflatten(&record))
}

/// Encode many values under the same headers.
pub fn to_rows<'a>(values: impl IntoIterator<Item = &'a Value>, headers: &HeaderSet) -> Vec<Row> {
    values
        .into_iter()
        .map(|value| to_row(value, headers))
        .collect()
}

/// Decode many rows under the same headers, stopping at the first fault.
pub fn to_values<'a>(
    rows: impl IntoIterator<Item = &'a Row>,
    headers: &HeaderSet,
) -> Result<Vec<Value>> {
    rows.into_iter().map(|row| to_value(row, headers)).collect()
}
