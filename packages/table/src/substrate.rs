//! The storage substrate: a 2-D grid addressed by 1-based row and column.

use structsheet_codec::Row;

use crate::error::SubstrateError;
use crate::range::RangeDescriptor;

/// A rectangular grid of scalar cells backed by some storage service.
///
/// Row and column numbers are 1-based. Every call may fail; the table layer
/// treats any failure as a reason to drop its cached view of the grid.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn Substrate>`.
pub trait Substrate: Send + Sync {
    /// Number of rows the grid currently has, used or not.
    fn max_rows(&mut self) -> Result<usize, SubstrateError>;

    /// Number of columns the grid currently has, used or not.
    fn max_columns(&mut self) -> Result<usize, SubstrateError>;

    /// Rows frozen at the top of the grid. These hold the header.
    fn frozen_rows(&mut self) -> Result<usize, SubstrateError>;

    /// `(rows, columns)` of the smallest top-left rectangle holding every
    /// non-blank cell. Never smaller than `(1, 1)`.
    fn data_extent(&mut self) -> Result<(usize, usize), SubstrateError>;

    /// Read the cells of a range, row-major.
    fn get_values(&mut self, range: &RangeDescriptor) -> Result<Vec<Row>, SubstrateError>;

    /// Overwrite the cells of a range. `rows` must match its shape exactly.
    fn set_values(&mut self, range: &RangeDescriptor, rows: &[Row]) -> Result<(), SubstrateError>;

    /// Insert `count` blank rows below `row` (0 inserts at the top).
    fn insert_rows_after(&mut self, row: usize, count: usize) -> Result<(), SubstrateError>;

    /// Insert `count` blank rows above `row`.
    fn insert_rows_before(&mut self, row: usize, count: usize) -> Result<(), SubstrateError>;

    /// Delete `count` rows starting at `row`. Rows below shift up.
    fn delete_rows(&mut self, row: usize, count: usize) -> Result<(), SubstrateError>;

    /// Insert `count` blank columns right of `column`.
    fn insert_columns_after(&mut self, column: usize, count: usize) -> Result<(), SubstrateError>;

    /// Delete `count` columns starting at `column`. Columns to the right shift left.
    fn delete_columns(&mut self, column: usize, count: usize) -> Result<(), SubstrateError>;

    /// Blank every cell. The grid keeps its dimensions.
    fn clear(&mut self) -> Result<(), SubstrateError>;

    /// Remove the grid for good. Every later call fails.
    fn destroy(&mut self) -> Result<(), SubstrateError>;
}

// Blanket implementations for references and boxes

impl<T: Substrate + ?Sized> Substrate for &mut T {
    fn max_rows(&mut self) -> Result<usize, SubstrateError> {
        (**self).max_rows()
    }

    fn max_columns(&mut self) -> Result<usize, SubstrateError> {
        (**self).max_columns()
    }

    fn frozen_rows(&mut self) -> Result<usize, SubstrateError> {
        (**self).frozen_rows()
    }

    fn data_extent(&mut self) -> Result<(usize, usize), SubstrateError> {
        (**self).data_extent()
    }

    fn get_values(&mut self, range: &RangeDescriptor) -> Result<Vec<Row>, SubstrateError> {
        (**self).get_values(range)
    }

    fn set_values(&mut self, range: &RangeDescriptor, rows: &[Row]) -> Result<(), SubstrateError> {
        (**self).set_values(range, rows)
    }

    fn insert_rows_after(&mut self, row: usize, count: usize) -> Result<(), SubstrateError> {
        (**self).insert_rows_after(row, count)
    }

    fn insert_rows_before(&mut self, row: usize, count: usize) -> Result<(), SubstrateError> {
        (**self).insert_rows_before(row, count)
    }

    fn delete_rows(&mut self, row: usize, count: usize) -> Result<(), SubstrateError> {
        (**self).delete_rows(row, count)
    }

    fn insert_columns_after(&mut self, column: usize, count: usize) -> Result<(), SubstrateError> {
        (**self).insert_columns_after(column, count)
    }

    fn delete_columns(&mut self, column: usize, count: usize) -> Result<(), SubstrateError> {
        (**self).delete_columns(column, count)
    }

    fn clear(&mut self) -> Result<(), SubstrateError> {
        (**self).clear()
    }

    fn destroy(&mut self) -> Result<(), SubstrateError> {
        (**self).destroy()
    }
}

impl<T: Substrate + ?Sized> Substrate for Box<T> {
    fn max_rows(&mut self) -> Result<usize, SubstrateError> {
        self.as_mut().max_rows()
    }

    fn max_columns(&mut self) -> Result<usize, SubstrateError> {
        self.as_mut().max_columns()
    }

    fn frozen_rows(&mut self) -> Result<usize, SubstrateError> {
        self.as_mut().frozen_rows()
    }

    fn data_extent(&mut self) -> Result<(usize, usize), SubstrateError> {
        self.as_mut().data_extent()
    }

    fn get_values(&mut self, range: &RangeDescriptor) -> Result<Vec<Row>, SubstrateError> {
        self.as_mut().get_values(range)
    }

    fn set_values(&mut self, range: &RangeDescriptor, rows: &[Row]) -> Result<(), SubstrateError> {
        self.as_mut().set_values(range, rows)
    }

    fn insert_rows_after(&mut self, row: usize, count: usize) -> Result<(), SubstrateError> {
        self.as_mut().insert_rows_after(row, count)
    }

    fn insert_rows_before(&mut self, row: usize, count: usize) -> Result<(), SubstrateError> {
        self.as_mut().insert_rows_before(row, count)
    }

    fn delete_rows(&mut self, row: usize, count: usize) -> Result<(), SubstrateError> {
        self.as_mut().delete_rows(row, count)
    }

    fn insert_columns_after(&mut self, column: usize, count: usize) -> Result<(), SubstrateError> {
        self.as_mut().insert_columns_after(column, count)
    }

    fn delete_columns(&mut self, column: usize, count: usize) -> Result<(), SubstrateError> {
        self.as_mut().delete_columns(column, count)
    }

    fn clear(&mut self) -> Result<(), SubstrateError> {
        self.as_mut().clear()
    }

    fn destroy(&mut self) -> Result<(), SubstrateError> {
        self.as_mut().destroy()
    }
}
