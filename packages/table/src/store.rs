//! Table storage on top of a substrate.
//!
//! `TableStore` owns one substrate handle and the cache describing it. The
//! first `header_rows` rows of the substrate are the header block; the row
//! `header_rows - header_offset` holds one column key per column. Every row
//! below the header block is a body row, addressed by 1-based position.

use structsheet_codec::{
    append_merge, bundle, check_extension, get_all_headers, to_rows, to_values, HeaderSet,
    IndexRun, Row, Scalar, Value,
};
use tracing::{debug, trace, warn};

use crate::cache::TableCache;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::range::{deletion_order, RangeDescriptor, RangeMapper, RowInsertion};
use crate::substrate::Substrate;

static NO_HEADERS: HeaderSet = HeaderSet::new();

/// Rows and headers of one table, cached between calls.
///
/// Reads go through the cache. Mutations go to the substrate first and then
/// patch the cache with exactly what changed. If a mutation fails halfway
/// the whole cache is dropped, so the next read sees the substrate as it
/// really is.
pub struct TableStore<S> {
    substrate: S,
    options: Options,
    cache: TableCache,
}

impl<S: Substrate> TableStore<S> {
    /// Wrap a substrate.
    ///
    /// # Errors
    ///
    /// `InvalidOptions` if `options` don't fit the substrate's header block.
    pub fn new(substrate: S, options: Options) -> Result<Self> {
        let mut store = Self {
            substrate,
            options,
            cache: TableCache::new(),
        };
        let header_rows = store.header_rows()?;
        store.options.validate(header_rows)?;
        Ok(store)
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn substrate(&self) -> &S {
        &self.substrate
    }

    /// Direct access to the substrate.
    ///
    /// Changes made through it are invisible to the cache until
    /// [`clear_cache`](Self::clear_cache) is called.
    pub fn substrate_mut(&mut self) -> &mut S {
        &mut self.substrate
    }

    pub fn into_substrate(self) -> S {
        self.substrate
    }

    pub fn cache(&self) -> &TableCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear_all();
    }

    // Derived quantities

    /// `(rows, columns)` holding data, header included.
    pub fn data_extent(&mut self) -> Result<(usize, usize)> {
        let substrate = &mut self.substrate;
        Ok(*self
            .cache
            .data_extent
            .get_or_try_init(|| substrate.data_extent())?)
    }

    /// Rows in the header block. At least 1, even without frozen rows.
    pub fn header_rows(&mut self) -> Result<usize> {
        let substrate = &mut self.substrate;
        Ok(*self
            .cache
            .header_rows
            .get_or_try_init(|| substrate.frozen_rows().map(|frozen| frozen.max(1)))?)
    }

    /// Rows holding data, header included.
    pub fn max_rows(&mut self) -> Result<usize> {
        if let Some(rows) = self.cache.max_rows.copied() {
            return Ok(rows);
        }
        let (rows, _) = self.data_extent()?;
        self.cache.max_rows.set(rows);
        Ok(rows)
    }

    pub fn body_rows(&mut self) -> Result<usize> {
        if let Some(rows) = self.cache.body_rows.copied() {
            return Ok(rows);
        }
        let rows = self.max_rows()?.saturating_sub(self.header_rows()?);
        self.cache.body_rows.set(rows);
        Ok(rows)
    }

    pub fn columns(&mut self) -> Result<usize> {
        let substrate = &mut self.substrate;
        Ok(*self
            .cache
            .columns
            .get_or_try_init(|| substrate.max_columns())?)
    }

    /// The row holding column keys, full width.
    pub fn header_range(&mut self) -> Result<RangeDescriptor> {
        if let Some(range) = self.cache.header_range.copied() {
            return Ok(range);
        }
        let header_rows = self.header_rows()?;
        let row = header_rows
            .checked_sub(self.options.header_offset)
            .filter(|row| *row >= 1)
            .ok_or_else(|| Error::InvalidOptions {
                message: format!(
                    "header_offset {} needs more than {} header rows",
                    self.options.header_offset, header_rows
                ),
            })?;
        let range = RangeDescriptor::new(row, 1, 1, self.columns()?);
        self.cache.header_range.set(range);
        Ok(range)
    }

    /// Every body row, full width. `None` while the table has no body.
    pub fn body_range(&mut self) -> Result<Option<RangeDescriptor>> {
        if let Some(range) = self.cache.body_range.copied() {
            return Ok(range);
        }
        let body_rows = self.body_rows()?;
        let range = if body_rows == 0 {
            None
        } else {
            Some(RangeDescriptor::new(
                self.header_rows()? + 1,
                1,
                body_rows,
                self.columns()?,
            ))
        };
        self.cache.body_range.set(range);
        Ok(range)
    }

    /// Column keys as stored, one per column.
    pub fn header_array(&mut self) -> Result<&HeaderSet> {
        if !self.cache.header_array.is_cached() {
            let range = self.header_range()?;
            let cells = self
                .substrate
                .get_values(&range)?
                .into_iter()
                .next()
                .unwrap_or_default();
            let headers = HeaderSet::from_cells(cells.iter().map(Scalar::to_string).collect());
            trace!(columns = headers.len(), "loaded header row");
            self.cache.header_array.set(headers);
        }
        Ok(self.cache.header_array.get().unwrap_or(&NO_HEADERS))
    }

    /// Every body row in order.
    pub fn body_array(&mut self) -> Result<&[Row]> {
        if !self.cache.body_array.is_cached() {
            let rows = match self.body_range()? {
                Some(range) => self.substrate.get_values(&range)?,
                None => Vec::new(),
            };
            trace!(rows = rows.len(), "loaded body");
            self.cache.body_array.set(rows);
        }
        Ok(self
            .cache
            .body_array
            .get()
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    // Reads

    pub fn has_body(&mut self) -> Result<bool> {
        Ok(self.body_rows()? != 0)
    }

    /// Number of body rows.
    pub fn count(&mut self) -> Result<usize> {
        self.body_rows()
    }

    /// Up to `take` rows after skipping `skip` body rows.
    pub fn get_sequence(&mut self, skip: usize, take: usize) -> Result<Vec<Row>> {
        let body_rows = self.body_rows()?;
        if take == 0 || skip >= body_rows {
            return Ok(Vec::new());
        }
        let take = take.min(body_rows - skip);

        if let Some(rows) = self
            .cache
            .body_array
            .get()
            .and_then(|body| body.get(skip..skip + take))
        {
            return Ok(rows.to_vec());
        }

        let Some(range) = self.body_range()? else {
            return Ok(Vec::new());
        };
        Ok(self
            .substrate
            .get_values(&range.offset(skip, 0).with_height(take))?)
    }

    /// The cells of the named columns for every body row, in the order asked.
    ///
    /// # Errors
    ///
    /// `ColumnNotFound` for a header the table doesn't have.
    pub fn get_columns(&mut self, headers: &[&str]) -> Result<Vec<Row>> {
        let all = self.header_array()?;
        let offsets = headers
            .iter()
            .map(|header| all.require(header))
            .collect::<structsheet_codec::Result<Vec<usize>>>()?;

        let body = self.body_array()?;
        Ok(body
            .iter()
            .map(|row| {
                offsets
                    .iter()
                    .map(|&i| row.get(i).cloned().unwrap_or_else(Scalar::empty))
                    .collect()
            })
            .collect())
    }

    /// The body cells of one column.
    pub fn get_column_range(&mut self, header: &str) -> Result<RangeDescriptor> {
        let column = self.header_array()?.require(header)? + 1;
        let header_rows = self.header_rows()?;
        let body_rows = self.body_rows()?;
        Ok(RangeDescriptor::new(header_rows + 1, column, body_rows, 1))
    }

    /// One column top to bottom, read straight from the substrate.
    pub fn get_column_as_array(&mut self, header: &str) -> Result<Vec<Scalar>> {
        let range = self.get_column_range(header)?;
        Ok(self
            .substrate
            .get_values(&range)?
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .collect())
    }

    /// Decode every body row.
    pub fn body_values(&mut self) -> Result<Vec<Value>> {
        let headers = self.header_array()?.clone();
        let body = self.body_array()?;
        Ok(to_values(body, &headers)?)
    }

    /// Decoded body rows the selector accepts, in order.
    pub fn get_like_values(
        &mut self,
        mut selector: impl FnMut(&Value) -> bool,
    ) -> Result<Vec<Value>> {
        let mut values = self.body_values()?;
        values.retain(|value| selector(value));
        Ok(values)
    }

    /// 1-based positions of the body rows the selector accepts, ascending.
    pub fn get_like_indices(
        &mut self,
        mut selector: impl FnMut(&Value) -> bool,
    ) -> Result<Vec<usize>> {
        Ok(self
            .body_values()?
            .iter()
            .enumerate()
            .filter(|(_, value)| selector(*value))
            .map(|(i, _)| i + 1)
            .collect())
    }

    /// Ranges covering the given body positions, one per consecutive run.
    pub fn indices_to_ranges(&mut self, indices: &[usize]) -> Result<Vec<RangeDescriptor>> {
        let mapper = RangeMapper::new(self.header_rows()?, self.columns()?);
        mapper.indices_to_ranges(indices.iter().copied())
    }

    // Mutations

    /// Add columns for any keys of `values` the header doesn't have yet.
    ///
    /// New keys go after the existing ones; existing columns never move.
    pub fn prepare_headers<'a>(
        &mut self,
        values: impl IntoIterator<Item = &'a Value>,
    ) -> Result<()> {
        let incoming = get_all_headers(values);
        let current = self.header_array()?.clone();
        let merged = append_merge(&current, &incoming);

        if merged.iter().any(|header| !current.contains(header)) {
            debug!(
                current = current.len(),
                merged = merged.len(),
                "extending headers"
            );
            self.extend_headers(&merged)?;
        }
        Ok(())
    }

    /// Replace the header row with `headers`, inserting columns as needed.
    ///
    /// # Errors
    ///
    /// `HeaderReductionUnsupported` if `headers` is shorter than the current
    /// header row or would move one of its columns.
    pub fn extend_headers(&mut self, headers: &HeaderSet) -> Result<()> {
        let result = self.write_headers(headers);
        self.invalidate_on_error(result)
    }

    fn write_headers(&mut self, headers: &HeaderSet) -> Result<()> {
        let current = self.header_array()?.clone();
        if headers.len() < current.len() {
            return Err(structsheet_codec::Error::HeaderReductionUnsupported {
                current: current.len(),
                requested: headers.len(),
            }
            .into());
        }
        check_extension(&current, headers)?;

        let added = headers.len() - current.len();
        if added > 0 {
            self.substrate.insert_columns_after(current.len(), added)?;
        }

        let row = self.header_range()?.row;
        let cells: Row = headers.iter().map(|h| Scalar::from(h.as_str())).collect();
        self.substrate
            .set_values(&RangeDescriptor::new(row, 1, 1, headers.len()), &[cells])?;

        self.cache.columns_extended(headers);
        Ok(())
    }

    /// Insert encoded rows at `index` (negative appends, 0 prepends,
    /// `i` makes the first row body position `i`).
    ///
    /// Rows must already be as wide as the header row.
    pub fn add_at(&mut self, rows: &[Row], index: i64) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let result = self.insert_rows(rows, index);
        self.invalidate_on_error(result)
    }

    fn insert_rows(&mut self, rows: &[Row], index: i64) -> Result<()> {
        let header_rows = self.header_rows()?;
        let body_rows = self.body_rows()?;
        let width = self.columns()?;
        let plan = RangeMapper::new(header_rows, width).plan_insert(index, body_rows, rows.len());
        debug!(
            rows = rows.len(),
            index,
            placement = ?plan.placement,
            "inserting rows"
        );

        match plan.row_insertion(header_rows) {
            RowInsertion::After { row, count } => self.substrate.insert_rows_after(row, count)?,
            RowInsertion::Before { row, count } => self.substrate.insert_rows_before(row, count)?,
        }
        self.substrate.set_values(&plan.target, rows)?;

        self.cache.rows_inserted(plan.body_position, rows);
        Ok(())
    }

    /// Rewrite every body row the selector accepts with the mutator's
    /// result. Rows keep their positions; new keys get new columns.
    ///
    /// Returns the number of rows rewritten.
    pub fn update_like(
        &mut self,
        selector: impl FnMut(&Value) -> bool,
        mutator: impl FnMut(Value) -> Value,
    ) -> Result<usize> {
        let result = self.rewrite_like(selector, mutator);
        self.invalidate_on_error(result)
    }

    fn rewrite_like(
        &mut self,
        selector: impl FnMut(&Value) -> bool,
        mut mutator: impl FnMut(Value) -> Value,
    ) -> Result<usize> {
        let indices = self.get_like_indices(selector)?;
        if indices.is_empty() {
            return Ok(0);
        }

        let header_rows = self.header_rows()?;
        let headers = self.header_array()?.clone();
        let mapper = RangeMapper::new(header_rows, headers.len());

        // Read and mutate every run before touching the header, so all runs
        // decode under the same snapshot.
        let mut groups: Vec<(IndexRun, Vec<Value>)> = Vec::new();
        for run in bundle(indices.iter().copied()) {
            let rows = self.substrate.get_values(&mapper.run_range(&run)?)?;
            let mutated = to_values(&rows, &headers)?
                .into_iter()
                .map(&mut mutator)
                .collect();
            groups.push((run, mutated));
        }

        self.prepare_headers(groups.iter().flat_map(|(_, values)| values.iter()))?;
        let headers = self.header_array()?.clone();
        let mapper = RangeMapper::new(header_rows, headers.len());

        for (run, values) in &groups {
            let rows = to_rows(values, &headers);
            self.substrate.set_values(&mapper.run_range(run)?, &rows)?;
            self.cache.rows_replaced(run, &rows);
        }

        debug!(rows = indices.len(), runs = groups.len(), "updated rows");
        Ok(indices.len())
    }

    /// Delete the body rows at the given 1-based positions.
    ///
    /// # Errors
    ///
    /// `InvalidPosition` if a position is 0 or past the last body row. Nothing
    /// is deleted in that case.
    pub fn remove_indices(&mut self, indices: &[usize]) -> Result<()> {
        let result = self.delete_positions(indices);
        self.invalidate_on_error(result)
    }

    fn delete_positions(&mut self, indices: &[usize]) -> Result<()> {
        let runs = bundle(indices.iter().copied());
        let body_rows = self.body_rows()?;
        if let Some(run) = runs
            .iter()
            .find(|run| run.start() == 0 || run.end() > body_rows)
        {
            let position = if run.start() == 0 { 0 } else { run.end() };
            return Err(Error::InvalidPosition { position });
        }

        let header_rows = self.header_rows()?;
        let runs = deletion_order(runs);
        debug!(rows = indices.len(), runs = runs.len(), "deleting rows");

        for run in &runs {
            self.substrate
                .delete_rows(header_rows + run.start(), run.len())?;
            self.cache.rows_deleted(run);
        }
        Ok(())
    }

    /// Delete blank rows and columns past the data extent.
    ///
    /// The header block is never pruned, even where it is blank.
    pub fn cleanup(&mut self) -> Result<()> {
        let result = self.prune();
        self.cache.clear_all();
        result
    }

    fn prune(&mut self) -> Result<()> {
        let header_rows = self.header_rows()?;
        let (rows, columns) = self.substrate.data_extent()?;
        let rows = rows.max(header_rows);
        let max_rows = self.substrate.max_rows()?;
        let max_columns = self.substrate.max_columns()?;

        if max_rows > rows {
            trace!(rows = max_rows - rows, "pruning blank rows");
            self.substrate.delete_rows(rows + 1, max_rows - rows)?;
        }
        if max_columns > columns {
            trace!(columns = max_columns - columns, "pruning blank columns");
            self.substrate
                .delete_columns(columns + 1, max_columns - columns)?;
        }
        Ok(())
    }

    /// Blank the whole substrate and shrink it back to a single cell.
    pub fn clear(&mut self) -> Result<()> {
        debug!("clearing table");
        let result = self
            .substrate
            .clear()
            .map_err(Error::from)
            .and_then(|()| self.prune());
        self.cache.clear_all();
        result
    }

    /// Destroy the substrate.
    pub fn destroy(mut self) -> Result<()> {
        debug!("destroying table");
        self.substrate.destroy()?;
        Ok(())
    }

    fn invalidate_on_error<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            warn!(error = %e, "table mutation failed, dropping cache");
            self.cache.clear_all();
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SubstrateError;
    use crate::memory::MemorySheet;
    use structsheet_codec::from_json;
    use serde_json::json;

    fn s(text: &str) -> Scalar {
        Scalar::from(text)
    }

    fn numbered(count: i64) -> TableStore<MemorySheet> {
        let mut rows = vec![vec![s("n")]];
        rows.extend((1..=count).map(|n| vec![Scalar::Integer(n)]));
        TableStore::new(MemorySheet::from_rows(rows), Options::default()).unwrap()
    }

    fn column_n(store: &mut TableStore<MemorySheet>) -> Vec<Scalar> {
        store.get_column_as_array("n").unwrap()
    }

    #[test]
    fn fresh_sheet_has_placeholder_header() {
        let mut store = TableStore::new(MemorySheet::new(), Options::default()).unwrap();
        assert!(!store.has_body().unwrap());
        assert_eq!(store.header_rows().unwrap(), 1);
        assert!(store.header_array().unwrap().is_placeholder());
        assert_eq!(store.body_range().unwrap(), None);
        assert!(store.body_array().unwrap().is_empty());
        assert!(store.get_sequence(0, 5).unwrap().is_empty());
    }

    #[test]
    fn derived_ranges() {
        let mut store = numbered(20);
        assert_eq!(store.count().unwrap(), 20);
        assert_eq!(store.header_range().unwrap().a1_notation(), "A1:A1");
        assert_eq!(store.body_range().unwrap().unwrap().a1_notation(), "A2:A21");
    }

    #[test]
    fn frozen_rows_define_header_block() {
        let sheet = MemorySheet::from_rows(vec![
            vec![s("title")],
            vec![s("a")],
            vec![s("1")],
        ])
        .frozen(2);
        let mut store = TableStore::new(sheet, Options::default()).unwrap();
        assert_eq!(store.header_rows().unwrap(), 2);
        assert_eq!(store.header_array().unwrap().as_slice(), ["a"]);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn header_offset_reads_higher_row() {
        let sheet = MemorySheet::from_rows(vec![
            vec![s("key")],
            vec![s("filter")],
            vec![s("v")],
        ])
        .frozen(2);
        let mut store =
            TableStore::new(sheet.clone(), Options::new().with_header_offset(1)).unwrap();
        assert_eq!(store.header_array().unwrap().as_slice(), ["key"]);

        assert!(matches!(
            TableStore::new(sheet, Options::new().with_header_offset(2)),
            Err(Error::InvalidOptions { .. })
        ));
    }

    #[test]
    fn add_at_positions() {
        let mut store = numbered(3);
        store.add_at(&[vec![Scalar::Integer(10)]], -1).unwrap();
        store.add_at(&[vec![Scalar::Integer(0)]], 0).unwrap();
        store.add_at(&[vec![Scalar::Integer(5)]], 2).unwrap();
        store.add_at(&[vec![Scalar::Integer(99)]], 1000).unwrap();

        let expected: Vec<Scalar> = [0, 5, 1, 2, 3, 10, 99].map(Scalar::Integer).to_vec();
        assert_eq!(store.body_array().unwrap().concat(), expected);
        assert_eq!(column_n(&mut store), expected);
        assert_eq!(store.count().unwrap(), 7);
    }

    #[test]
    fn add_at_keeps_cache_in_sync() {
        let mut store = numbered(4);
        store.body_array().unwrap();
        store.add_at(&[vec![Scalar::Integer(7)], vec![Scalar::Integer(8)]], 3).unwrap();
        assert!(store.cache().body_array.is_cached());

        let cached = store.body_array().unwrap().to_vec();
        store.clear_cache();
        assert_eq!(store.body_array().unwrap(), cached.as_slice());
    }

    #[test]
    fn first_rows_go_below_header() {
        let mut store = TableStore::new(MemorySheet::new(), Options::default()).unwrap();
        let values = [from_json(json!({"a": 1}))];
        store.prepare_headers(&values).unwrap();
        let headers = store.header_array().unwrap().clone();
        store.add_at(&to_rows(&values, &headers), 5).unwrap();

        assert_eq!(
            store.substrate().rows(),
            &[vec![s("a")], vec![Scalar::Integer(1)]]
        );
    }

    #[test]
    fn prepare_headers_appends_columns() {
        let mut store = TableStore::new(MemorySheet::new(), Options::default()).unwrap();
        store
            .prepare_headers(&[from_json(json!({"b": 1, "a": 2}))])
            .unwrap();
        assert_eq!(store.header_array().unwrap().as_slice(), ["a", "b"]);

        store
            .prepare_headers(&[from_json(json!({"a": 1, "c": {"d": 2}}))])
            .unwrap();
        assert_eq!(store.header_array().unwrap().as_slice(), ["a", "b", "c.d"]);

        store.clear_cache();
        assert_eq!(store.header_array().unwrap().as_slice(), ["a", "b", "c.d"]);
        assert_eq!(store.columns().unwrap(), 3);
    }

    #[test]
    fn extend_headers_refuses_reduction() {
        let mut store = TableStore::new(
            MemorySheet::from_rows(vec![vec![s("a"), s("b")]]),
            Options::default(),
        )
        .unwrap();
        assert!(matches!(
            store.extend_headers(&HeaderSet::from(vec!["a"])),
            Err(Error::Codec(structsheet_codec::Error::HeaderReductionUnsupported { .. }))
        ));
        assert!(store
            .extend_headers(&HeaderSet::from(vec!["b", "a", "c"]))
            .is_err());
        assert_eq!(store.substrate().rows(), &[vec![s("a"), s("b")]]);
    }

    #[test]
    fn extend_headers_pads_cached_body() {
        let mut store = numbered(2);
        store.body_array().unwrap();
        store
            .extend_headers(&HeaderSet::from(vec!["n", "m"]))
            .unwrap();
        assert_eq!(
            store.body_array().unwrap(),
            &[
                vec![Scalar::Integer(1), Scalar::empty()],
                vec![Scalar::Integer(2), Scalar::empty()]
            ]
        );
    }

    #[test]
    fn get_columns_projects_in_order() {
        let sheet = MemorySheet::from_rows(vec![
            vec![s("make"), s("model"), s("year")],
            vec![s("toyota"), s("camry"), Scalar::Integer(2012)],
            vec![s("honda"), s("civic"), Scalar::Integer(2014)],
        ]);
        let mut store = TableStore::new(sheet, Options::default()).unwrap();
        assert_eq!(
            store.get_columns(&["year", "make"]).unwrap(),
            vec![
                vec![Scalar::Integer(2012), s("toyota")],
                vec![Scalar::Integer(2014), s("honda")]
            ]
        );
        assert_eq!(
            store.get_columns(&["vin"]),
            Err(Error::Codec(structsheet_codec::Error::ColumnNotFound {
                header: "vin".to_string()
            }))
        );
        assert_eq!(
            store.get_column_range("model").unwrap(),
            RangeDescriptor::new(2, 2, 2, 1)
        );
    }

    #[test]
    fn get_sequence_clamps() {
        let mut store = numbered(5);
        let seq = |store: &mut TableStore<MemorySheet>, skip, take| -> Vec<Scalar> {
            store.get_sequence(skip, take).unwrap().concat()
        };
        assert_eq!(seq(&mut store, 3, 10), [4, 5].map(Scalar::Integer).to_vec());
        assert!(seq(&mut store, 5, 1).is_empty());
        assert!(seq(&mut store, 0, 0).is_empty());

        store.body_array().unwrap();
        assert_eq!(seq(&mut store, 1, 2), [2, 3].map(Scalar::Integer).to_vec());
    }

    #[test]
    fn like_queries() {
        let mut store = numbered(6);
        let even = |v: &Value| {
            v.member("n")
                .and_then(Value::as_scalar)
                .and_then(Scalar::as_i64)
                .is_some_and(|n| n % 2 == 0)
        };
        assert_eq!(store.get_like_indices(even).unwrap(), vec![2, 4, 6]);
        assert_eq!(store.get_like_values(even).unwrap().len(), 3);
    }

    #[test]
    fn remove_indices_deletes_descending() {
        let mut store = numbered(20);
        store.body_array().unwrap();
        store.remove_indices(&[1, 2, 3, 10, 11]).unwrap();

        let mut expected: Vec<i64> = (1..=20).collect();
        expected.retain(|n| ![1, 2, 3, 10, 11].contains(n));
        let expected: Vec<Scalar> = expected.into_iter().map(Scalar::Integer).collect();

        assert_eq!(store.count().unwrap(), 15);
        assert_eq!(store.body_array().unwrap().concat(), expected);
        assert_eq!(column_n(&mut store), expected);
    }

    #[test]
    fn remove_indices_validates_first() {
        let mut store = numbered(3);
        assert_eq!(
            store.remove_indices(&[2, 4]),
            Err(Error::InvalidPosition { position: 4 })
        );
        assert_eq!(
            store.remove_indices(&[0]),
            Err(Error::InvalidPosition { position: 0 })
        );
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn removing_every_row_leaves_header() {
        let mut store = numbered(3);
        store.body_range().unwrap();
        store.remove_indices(&[1, 2, 3]).unwrap();
        assert!(!store.has_body().unwrap());
        assert_eq!(store.cache().body_range.get(), Some(&None));
        store.clear_cache();
        assert!(!store.has_body().unwrap());
        assert_eq!(store.header_array().unwrap().as_slice(), ["n"]);
    }

    #[test]
    fn update_like_rewrites_in_place() {
        let mut store = numbered(5);
        let updated = store
            .update_like(
                |v| v.member("n") == Some(&Value::from(3i64)),
                |mut v| {
                    v.insert("tag", Value::from("three"));
                    v
                },
            )
            .unwrap();
        assert_eq!(updated, 1);
        assert_eq!(store.header_array().unwrap().as_slice(), ["n", "tag"]);

        let cached = store.body_array().unwrap().to_vec();
        store.clear_cache();
        assert_eq!(store.body_array().unwrap(), cached.as_slice());
        assert_eq!(cached[2], vec![Scalar::Integer(3), s("three")]);
        assert_eq!(cached[3], vec![Scalar::Integer(4), Scalar::empty()]);
    }

    #[test]
    fn update_like_with_no_match_is_noop() {
        let mut store = numbered(2);
        assert_eq!(store.update_like(|_| false, |v| v).unwrap(), 0);
    }

    #[test]
    fn indices_to_ranges_uses_header_block() {
        let mut store = numbered(20);
        let ranges = store.indices_to_ranges(&[1, 2, 4, 5, 7, 8, 9]).unwrap();
        let notation: Vec<String> = ranges.iter().map(RangeDescriptor::a1_notation).collect();
        assert_eq!(notation, vec!["A2:A3", "A5:A6", "A8:A10"]);
    }

    #[test]
    fn cleanup_prunes_blank_tail() {
        let mut sheet = MemorySheet::from_rows(vec![vec![s("a")], vec![s("1")]]);
        sheet.insert_rows_after(2, 4).unwrap();
        sheet.insert_columns_after(1, 3).unwrap();
        let mut store = TableStore::new(sheet, Options::default()).unwrap();

        store.cleanup().unwrap();
        assert_eq!(store.substrate().rows(), &[vec![s("a")], vec![s("1")]]);
    }

    #[test]
    fn cleanup_keeps_header_block() {
        let sheet = MemorySheet::with_size(3, 2).frozen(3);
        let mut store = TableStore::new(sheet, Options::default()).unwrap();
        store.cleanup().unwrap();
        assert_eq!(store.substrate().rows().len(), 3);
        assert_eq!(store.columns().unwrap(), 1);
    }

    #[test]
    fn clear_shrinks_to_single_cell() {
        let mut store = numbered(4);
        store.clear().unwrap();
        assert_eq!(store.substrate().rows(), &[vec![Scalar::empty()]]);
        assert!(!store.has_body().unwrap());
        assert!(store.header_array().unwrap().is_placeholder());
    }

    #[test]
    fn failed_mutation_drops_cache() {
        let mut store = numbered(3);
        store.body_array().unwrap();
        store.header_array().unwrap();
        store.substrate_mut().destroy().unwrap();

        let result = store.add_at(&[vec![Scalar::Integer(4)]], -1);
        assert_eq!(result, Err(Error::Substrate(SubstrateError::Destroyed)));
        assert_eq!(store.cache(), &TableCache::new());
    }

    #[test]
    fn destroy_consumes_store() {
        let store = numbered(1);
        assert!(store.destroy().is_ok());
    }
}
