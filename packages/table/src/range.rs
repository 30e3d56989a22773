//! Range/Position Mapper: body positions -> substrate coordinates.
//!
//! Body positions are 1-based and count data rows only. A substrate row is
//! the body position plus the number of header rows.

use std::fmt;

use structsheet_codec::{bundle, IndexRun};

use crate::error::{Error, Result};

/// A rectangle of cells in absolute, 1-based substrate coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RangeDescriptor {
    pub row: usize,
    pub column: usize,
    pub height: usize,
    pub width: usize,
}

impl RangeDescriptor {
    pub fn new(row: usize, column: usize, height: usize, width: usize) -> Self {
        Self {
            row,
            column,
            height,
            width,
        }
    }

    /// Last row covered. Equals `row - 1` for an empty range.
    pub fn last_row(&self) -> usize {
        self.row + self.height - 1
    }

    pub fn last_column(&self) -> usize {
        self.column + self.width - 1
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0 || self.width == 0
    }

    /// Move the top-left corner down by `rows` and right by `columns`.
    #[must_use]
    pub fn offset(&self, rows: usize, columns: usize) -> Self {
        Self {
            row: self.row + rows,
            column: self.column + columns,
            ..*self
        }
    }

    #[must_use]
    pub fn with_height(&self, height: usize) -> Self {
        Self { height, ..*self }
    }

    #[must_use]
    pub fn with_width(&self, width: usize) -> Self {
        Self { width, ..*self }
    }

    /// Spreadsheet-style notation, e.g. `A2:F21`.
    pub fn a1_notation(&self) -> String {
        if self.is_empty() {
            return format!("{}{}:empty", column_letters(self.column), self.row);
        }
        format!(
            "{}{}:{}{}",
            column_letters(self.column),
            self.row,
            column_letters(self.last_column()),
            self.last_row()
        )
    }
}

impl fmt::Display for RangeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.a1_notation())
    }
}

fn column_letters(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        column -= 1;
        letters.push(b'A' + (column % 26) as u8);
        column /= 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Where new rows go, resolved against the current body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertPlacement {
    /// The body is empty; rows go right after the header.
    Initial,
    /// After the last body row.
    Append,
    /// Before the first body row.
    Prepend,
    /// New rows take body positions `position..position + n - 1`.
    Before { position: usize },
}

/// A resolved insertion: how to make room and where to write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InsertPlan {
    pub placement: InsertPlacement,
    /// Body position of the first new row once inserted.
    pub body_position: usize,
    /// Cells to write after the blank rows exist.
    pub target: RangeDescriptor,
}

/// Substrate call that opens space for an insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowInsertion {
    After { row: usize, count: usize },
    Before { row: usize, count: usize },
}

impl InsertPlan {
    pub fn row_insertion(&self, header_rows: usize) -> RowInsertion {
        let count = self.target.height;
        match self.placement {
            InsertPlacement::Initial => RowInsertion::After {
                row: header_rows,
                count,
            },
            InsertPlacement::Append => RowInsertion::After {
                row: header_rows + self.body_position - 1,
                count,
            },
            InsertPlacement::Prepend | InsertPlacement::Before { .. } => RowInsertion::Before {
                row: header_rows + self.body_position,
                count,
            },
        }
    }
}

/// Maps body positions and runs to substrate ranges for one header layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeMapper {
    header_rows: usize,
    width: usize,
}

impl RangeMapper {
    pub fn new(header_rows: usize, width: usize) -> Self {
        Self { header_rows, width }
    }

    pub fn header_rows(&self) -> usize {
        self.header_rows
    }

    /// Absolute row of a 1-based body position.
    pub fn body_row(&self, position: usize) -> usize {
        position + self.header_rows
    }

    /// Full-width range covering a run.
    ///
    /// # Errors
    ///
    /// `InvalidPosition` for a run touching position 0, which would address
    /// the header.
    pub fn run_range(&self, run: &IndexRun) -> Result<RangeDescriptor> {
        if run.start() == 0 {
            return Err(Error::InvalidPosition { position: 0 });
        }
        Ok(RangeDescriptor::new(
            self.body_row(run.start()),
            1,
            run.len(),
            self.width,
        ))
    }

    /// Bundle positions and map every run to a range, ascending.
    pub fn indices_to_ranges(
        &self,
        indices: impl IntoIterator<Item = usize>,
    ) -> Result<Vec<RangeDescriptor>> {
        bundle(indices)
            .iter()
            .map(|run| self.run_range(run))
            .collect()
    }

    /// Resolve an insertion of `count` rows at `index`.
    ///
    /// Negative means append, 0 means prepend, a positive `i` puts the first
    /// new row at body position `i`. Past-the-end degrades to append, and an
    /// empty body always gets its first rows right after the header.
    pub fn plan_insert(&self, index: i64, body_rows: usize, count: usize) -> InsertPlan {
        let placement = if body_rows == 0 {
            InsertPlacement::Initial
        } else if index < 0 {
            InsertPlacement::Append
        } else if index == 0 {
            InsertPlacement::Prepend
        } else if index as u64 > body_rows as u64 {
            InsertPlacement::Append
        } else {
            InsertPlacement::Before {
                position: index as usize,
            }
        };

        let body_position = match placement {
            InsertPlacement::Initial | InsertPlacement::Prepend => 1,
            InsertPlacement::Append => body_rows + 1,
            InsertPlacement::Before { position } => position,
        };

        InsertPlan {
            placement,
            body_position,
            target: RangeDescriptor::new(self.body_row(body_position), 1, count, self.width),
        }
    }
}

/// Order runs for deletion: highest start first.
///
/// Deleting a higher run never shifts the rows of a lower one, so positions
/// computed up front stay valid for every run.
pub fn deletion_order(mut runs: Vec<IndexRun>) -> Vec<IndexRun> {
    runs.sort_by(|a, b| b.start().cmp(&a.start()));
    runs
}
