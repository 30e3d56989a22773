//! Cached view of a table's substrate.
//!
//! Every derived quantity lives in its own [`CachedField`], which is either
//! unset or holds a value. A mutation that knows exactly how it changed the
//! substrate patches the affected fields; anything else invalidates them.

use structsheet_codec::{HeaderSet, IndexRun, Row, Scalar};
use tracing::debug;

use crate::range::RangeDescriptor;

/// A lazily computed value: unset, or holding the last known value.
#[derive(Clone, Debug, PartialEq)]
pub struct CachedField<T>(Option<T>);

impl<T> Default for CachedField<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T> CachedField<T> {
    pub fn is_cached(&self) -> bool {
        self.0.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn set(&mut self, value: T) {
        self.0 = Some(value);
    }

    pub fn invalidate(&mut self) {
        self.0 = None;
    }

    /// Return the cached value, computing and storing it first if unset.
    ///
    /// A failed computation leaves the field unset.
    pub fn get_or_try_init<E>(&mut self, init: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        let value = match self.0.take() {
            Some(value) => value,
            None => init()?,
        };
        Ok(self.0.insert(value))
    }

    /// Apply an exact update to a cached value. Unset fields stay unset.
    ///
    /// If `update` returns false the cached value could not be brought up
    /// to date and the field is invalidated.
    pub fn patch(&mut self, update: impl FnOnce(&mut T) -> bool) {
        if let Some(value) = &mut self.0 {
            if !update(value) {
                self.invalidate();
            }
        }
    }
}

impl<T: Copy> CachedField<T> {
    pub fn copied(&self) -> Option<T> {
        self.get().copied()
    }
}

/// Everything a table remembers about its substrate between calls.
///
/// Counts are in rows and columns of the substrate; body positions in the
/// patch functions are 1-based.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableCache {
    /// `(rows, columns)` of the substrate's data extent.
    pub data_extent: CachedField<(usize, usize)>,
    pub header_rows: CachedField<usize>,
    /// Rows in use, header included.
    pub max_rows: CachedField<usize>,
    pub body_rows: CachedField<usize>,
    pub columns: CachedField<usize>,
    pub header_range: CachedField<RangeDescriptor>,
    /// `None` while the table has no body.
    pub body_range: CachedField<Option<RangeDescriptor>>,
    pub header_array: CachedField<HeaderSet>,
    pub body_array: CachedField<Vec<Row>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything.
    pub fn clear_all(&mut self) {
        debug!("clearing table cache");
        *self = Self::default();
    }

    /// `rows` were inserted so the first of them sits at `position`.
    pub fn rows_inserted(&mut self, position: usize, rows: &[Row]) {
        let count = rows.len();
        if count == 0 {
            return;
        }

        self.body_array.patch(|body| {
            let at = position.saturating_sub(1);
            if position == 0 || at > body.len() {
                return false;
            }
            body.splice(at..at, rows.iter().cloned());
            true
        });
        // New rows land below the header block even when it was blank.
        let header_rows = self.header_rows.copied();
        self.data_extent.patch(|(r, _)| grow_below(r, header_rows, count));
        self.max_rows.patch(|r| grow_below(r, header_rows, count));
        self.body_rows.patch(|r| {
            *r += count;
            true
        });
        self.body_range.patch(|range| match range {
            Some(range) => {
                range.height += count;
                true
            }
            None => false,
        });
    }

    /// The body rows in `run` were deleted.
    pub fn rows_deleted(&mut self, run: &IndexRun) {
        let count = run.len();

        self.body_array.patch(|body| {
            if run.start() == 0 || run.end() > body.len() {
                return false;
            }
            body.drain(run.start() - 1..run.end());
            true
        });
        self.data_extent.patch(|(r, _)| shrink(r, count));
        self.max_rows.patch(|r| shrink(r, count));
        self.body_rows.patch(|r| shrink(r, count));
        self.body_range.patch(|range| match *range {
            Some(current) if current.height > count => {
                *range = Some(current.with_height(current.height - count));
                true
            }
            Some(current) if current.height == count => {
                *range = None;
                true
            }
            _ => false,
        });
    }

    /// The body rows in `run` were overwritten with `rows`.
    pub fn rows_replaced(&mut self, run: &IndexRun, rows: &[Row]) {
        self.body_array.patch(|body| {
            if run.start() == 0 || run.end() > body.len() || rows.len() != run.len() {
                return false;
            }
            body[run.start() - 1..run.end()].clone_from_slice(rows);
            true
        });
    }

    /// The header row now holds `headers`, one column per header.
    pub fn columns_extended(&mut self, headers: &HeaderSet) {
        let width = headers.len();

        self.body_array.patch(|body| {
            for row in body.iter_mut() {
                if row.len() > width {
                    return false;
                }
                row.resize(width, Scalar::empty());
            }
            true
        });
        // The header row may sit below a blank block the extent never saw.
        let header_row = self.header_range.get().map(|range| range.row);
        self.data_extent.patch(|(r, c)| match header_row {
            Some(row) => {
                *r = (*r).max(row);
                *c = (*c).max(width);
                true
            }
            None => false,
        });
        self.max_rows.patch(|r| match header_row {
            Some(row) => {
                *r = (*r).max(row);
                true
            }
            None => false,
        });
        self.columns.set(width);
        self.header_range.patch(|range| {
            range.width = width;
            true
        });
        self.body_range.patch(|range| {
            if let Some(range) = range {
                range.width = width;
            }
            true
        });
        self.header_array.set(headers.clone());
    }
}

fn grow_below(rows: &mut usize, header_rows: Option<usize>, count: usize) -> bool {
    match header_rows {
        Some(header_rows) => {
            *rows = (*rows).max(header_rows) + count;
            true
        }
        None => false,
    }
}

fn shrink(value: &mut usize, count: usize) -> bool {
    match value.checked_sub(count) {
        Some(smaller) => {
            *value = smaller;
            true
        }
        None => false,
    }
}
