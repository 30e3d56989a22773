//! In-memory substrate.

use structsheet_codec::{Row, Scalar};

use crate::error::SubstrateError;
use crate::range::RangeDescriptor;
use crate::substrate::Substrate;

/// A grid of cells held in memory.
///
/// Behaves like a fresh spreadsheet tab: it starts as a single blank cell,
/// grows only through explicit row and column insertions, and reports its
/// data extent from the non-blank cells it holds.
///
/// # Example
///
/// ```rust
/// use structsheet_table::{MemorySheet, RangeDescriptor, Substrate};
/// use structsheet_codec::Scalar;
///
/// let mut sheet = MemorySheet::new();
/// sheet.insert_rows_after(1, 1).unwrap();
/// sheet
///     .set_values(&RangeDescriptor::new(2, 1, 1, 1), &[vec![Scalar::from("hi")]])
///     .unwrap();
/// assert_eq!(sheet.data_extent().unwrap(), (2, 1));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MemorySheet {
    cells: Vec<Row>,
    columns: usize,
    frozen_rows: usize,
    destroyed: bool,
}

impl MemorySheet {
    /// Create a 1x1 blank sheet.
    pub fn new() -> Self {
        Self::with_size(1, 1)
    }

    /// Create a blank sheet of the given size. Both dimensions are at least 1.
    pub fn with_size(rows: usize, columns: usize) -> Self {
        let columns = columns.max(1);
        Self {
            cells: vec![vec![Scalar::empty(); columns]; rows.max(1)],
            columns,
            frozen_rows: 0,
            destroyed: false,
        }
    }

    /// Create a sheet holding `rows`, padded to a rectangle with blanks.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let mut cells: Vec<Row> = rows
            .into_iter()
            .map(|mut row| {
                row.resize(columns, Scalar::empty());
                row
            })
            .collect();
        if cells.is_empty() {
            cells.push(vec![Scalar::empty(); columns]);
        }
        Self {
            cells,
            columns,
            frozen_rows: 0,
            destroyed: false,
        }
    }

    /// Builder-style `set_frozen_rows`.
    #[must_use]
    pub fn frozen(mut self, rows: usize) -> Self {
        self.frozen_rows = rows;
        self
    }

    pub fn set_frozen_rows(&mut self, rows: usize) {
        self.frozen_rows = rows;
    }

    /// All cells, row-major.
    pub fn rows(&self) -> &[Row] {
        &self.cells
    }

    /// Cell at 1-based coordinates, if inside the grid.
    pub fn cell(&self, row: usize, column: usize) -> Option<&Scalar> {
        self.cells
            .get(row.checked_sub(1)?)
            .and_then(|r| r.get(column.checked_sub(1)?))
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn ensure_alive(&self) -> Result<(), SubstrateError> {
        if self.destroyed {
            Err(SubstrateError::Destroyed)
        } else {
            Ok(())
        }
    }

    fn out_of_bounds(&self, range: RangeDescriptor) -> SubstrateError {
        SubstrateError::OutOfBounds {
            range,
            rows: self.cells.len(),
            columns: self.columns,
        }
    }

    fn check_range(&self, range: &RangeDescriptor) -> Result<(), SubstrateError> {
        self.ensure_alive()?;
        let fits = range.row >= 1
            && range.column >= 1
            && range.row + range.height <= self.cells.len() + 1
            && range.column + range.width <= self.columns + 1;
        if fits {
            Ok(())
        } else {
            Err(self.out_of_bounds(*range))
        }
    }

    fn check_rows(&self, row: usize, count: usize) -> Result<(), SubstrateError> {
        self.check_range(&RangeDescriptor::new(row, 1, count, self.columns))
    }

    fn check_columns(&self, column: usize, count: usize) -> Result<(), SubstrateError> {
        self.check_range(&RangeDescriptor::new(1, column, self.cells.len(), count))
    }

    fn blank_row(&self) -> Row {
        vec![Scalar::empty(); self.columns]
    }
}

impl Default for MemorySheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Substrate for MemorySheet {
    fn max_rows(&mut self) -> Result<usize, SubstrateError> {
        self.ensure_alive()?;
        Ok(self.cells.len())
    }

    fn max_columns(&mut self) -> Result<usize, SubstrateError> {
        self.ensure_alive()?;
        Ok(self.columns)
    }

    fn frozen_rows(&mut self) -> Result<usize, SubstrateError> {
        self.ensure_alive()?;
        Ok(self.frozen_rows)
    }

    fn data_extent(&mut self) -> Result<(usize, usize), SubstrateError> {
        self.ensure_alive()?;
        let mut rows = 1;
        let mut columns = 1;
        for (r, row) in self.cells.iter().enumerate() {
            if let Some(c) = row.iter().rposition(|cell| !cell.is_sentinel()) {
                rows = r + 1;
                columns = columns.max(c + 1);
            }
        }
        Ok((rows, columns))
    }

    fn get_values(&mut self, range: &RangeDescriptor) -> Result<Vec<Row>, SubstrateError> {
        self.check_range(range)?;
        let columns = range.column - 1..range.column - 1 + range.width;
        Ok(self.cells[range.row - 1..range.row - 1 + range.height]
            .iter()
            .map(|row| row[columns.clone()].to_vec())
            .collect())
    }

    fn set_values(&mut self, range: &RangeDescriptor, rows: &[Row]) -> Result<(), SubstrateError> {
        self.check_range(range)?;
        if rows.len() != range.height || rows.iter().any(|row| row.len() != range.width) {
            return Err(SubstrateError::ShapeMismatch {
                range: *range,
                expected_rows: range.height,
                expected_columns: range.width,
            });
        }
        for (offset, row) in rows.iter().enumerate() {
            let target = &mut self.cells[range.row - 1 + offset];
            target[range.column - 1..range.column - 1 + range.width].clone_from_slice(row);
        }
        Ok(())
    }

    fn insert_rows_after(&mut self, row: usize, count: usize) -> Result<(), SubstrateError> {
        self.ensure_alive()?;
        if row > self.cells.len() {
            return Err(self.out_of_bounds(RangeDescriptor::new(row, 1, 1, self.columns)));
        }
        let blank = self.blank_row();
        self.cells
            .splice(row..row, std::iter::repeat(blank).take(count));
        Ok(())
    }

    fn insert_rows_before(&mut self, row: usize, count: usize) -> Result<(), SubstrateError> {
        self.check_rows(row, 1)?;
        self.insert_rows_after(row - 1, count)
    }

    fn delete_rows(&mut self, row: usize, count: usize) -> Result<(), SubstrateError> {
        self.check_rows(row, count)?;
        self.cells.drain(row - 1..row - 1 + count);
        if self.cells.is_empty() {
            let blank = self.blank_row();
            self.cells.push(blank);
        }
        Ok(())
    }

    fn insert_columns_after(&mut self, column: usize, count: usize) -> Result<(), SubstrateError> {
        self.ensure_alive()?;
        if column > self.columns {
            return Err(self.out_of_bounds(RangeDescriptor::new(1, column, self.cells.len(), 1)));
        }
        for row in &mut self.cells {
            row.splice(column..column, std::iter::repeat(Scalar::empty()).take(count));
        }
        self.columns += count;
        Ok(())
    }

    fn delete_columns(&mut self, column: usize, count: usize) -> Result<(), SubstrateError> {
        self.check_columns(column, count)?;
        for row in &mut self.cells {
            row.drain(column - 1..column - 1 + count);
        }
        self.columns -= count;
        if self.columns == 0 {
            self.columns = 1;
            for row in &mut self.cells {
                row.push(Scalar::empty());
            }
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SubstrateError> {
        self.ensure_alive()?;
        for row in &mut self.cells {
            row.iter_mut().for_each(|cell| *cell = Scalar::empty());
        }
        Ok(())
    }

    fn destroy(&mut self) -> Result<(), SubstrateError> {
        self.ensure_alive()?;
        self.cells.clear();
        self.columns = 0;
        self.destroyed = true;
        Ok(())
    }
}
