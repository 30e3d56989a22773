//! The caller-facing table.

use structsheet_codec::{to_rows, to_values, Row, Scalar, Value};
use tracing::debug;

use crate::error::Result;
use crate::options::Options;
use crate::store::TableStore;
use crate::substrate::Substrate;

/// A list of structured values stored as rows of a substrate.
///
/// Values are flattened into one column per leaf path. New paths add
/// columns to the right; existing columns never move, so rows written
/// earlier keep decoding the same way.
///
/// # Example
///
/// ```rust
/// use structsheet_codec::from_json;
/// use structsheet_table::{MemorySheet, Options, Table};
/// use serde_json::json;
///
/// let mut cars = Table::open(MemorySheet::new(), Options::default()).unwrap();
/// cars.add_append(&[
///     from_json(json!({"make": "toyota", "year": 2012})),
///     from_json(json!({"make": "honda", "owners": ["a", "b"]})),
/// ])
/// .unwrap();
///
/// assert_eq!(cars.count().unwrap(), 2);
/// let hondas = cars
///     .get_like(|car| car.member("make") == Some(&"honda".into()))
///     .unwrap();
/// assert_eq!(hondas.len(), 1);
/// ```
pub struct Table<S> {
    store: TableStore<S>,
}

impl<S: Substrate> Table<S> {
    /// Open a table on a substrate, pruning blank rows and columns past its
    /// data.
    pub fn open(substrate: S, options: Options) -> Result<Self> {
        let mut store = TableStore::new(substrate, options)?;
        if store.has_body()? {
            store.cleanup()?;
        }
        Ok(Self { store })
    }

    pub fn options(&self) -> &Options {
        self.store.options()
    }

    pub fn store(&self) -> &TableStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TableStore<S> {
        &mut self.store
    }

    pub fn into_substrate(self) -> S {
        self.store.into_substrate()
    }

    fn finish<T>(&mut self, result: Result<T>) -> Result<T> {
        if self.store.options().wipe_cache_every_operation {
            self.store.clear_cache();
        }
        result
    }

    // Writes

    /// Add values after the last one.
    pub fn add_append(&mut self, values: &[Value]) -> Result<()> {
        self.add_at(-1, values)
    }

    /// Add values before the first one.
    pub fn add_prepend(&mut self, values: &[Value]) -> Result<()> {
        self.add_at(0, values)
    }

    /// Add values so the first lands at 1-based position `index`.
    ///
    /// A negative index appends and 0 prepends. An index past the end
    /// appends. Adding nothing does nothing.
    pub fn add_at(&mut self, index: i64, values: &[Value]) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        let result = self.write_values(index, values);
        self.finish(result)
    }

    fn write_values(&mut self, index: i64, values: &[Value]) -> Result<()> {
        self.store.prepare_headers(values)?;
        let headers = self.store.header_array()?.clone();
        let rows = to_rows(values, &headers);
        self.store.add_at(&rows, index)
    }

    /// Replace every value the selector accepts with the mutator's result.
    ///
    /// Values stay where they are. Returns how many were replaced.
    pub fn update_like(
        &mut self,
        selector: impl FnMut(&Value) -> bool,
        mutator: impl FnMut(Value) -> Value,
    ) -> Result<usize> {
        if !self.store.has_body()? {
            return Ok(0);
        }
        let result = self.store.update_like(selector, mutator);
        self.finish(result)
    }

    /// Delete every value the selector accepts. Returns how many were
    /// deleted.
    pub fn remove_like(&mut self, selector: impl FnMut(&Value) -> bool) -> Result<usize> {
        if !self.store.has_body()? {
            return Ok(0);
        }
        let result = self.remove_selected(selector);
        self.finish(result)
    }

    fn remove_selected(&mut self, selector: impl FnMut(&Value) -> bool) -> Result<usize> {
        let indices = self.store.get_like_indices(selector)?;
        if indices.is_empty() {
            return Ok(0);
        }
        self.store.remove_indices(&indices)?;
        Ok(indices.len())
    }

    /// Blank the table, headers included.
    pub fn clear(&mut self) -> Result<()> {
        self.store.clear()
    }

    /// Destroy the underlying substrate.
    pub fn destroy(self) -> Result<()> {
        self.store.destroy()
    }

    // Reads

    pub fn count(&mut self) -> Result<usize> {
        let result = self.store.count();
        self.finish(result)
    }

    /// Every value, in order.
    pub fn get_all(&mut self) -> Result<Vec<Value>> {
        let result = self.store.body_values();
        self.finish(result)
    }

    /// The first `count` values.
    pub fn get_first(&mut self, count: usize) -> Result<Vec<Value>> {
        self.get_sequence(0, count)
    }

    /// The last `count` values, in table order.
    pub fn get_last(&mut self, count: usize) -> Result<Vec<Value>> {
        let total = self.store.count()?;
        self.get_sequence(total.saturating_sub(count), count)
    }

    /// Up to `take` values after skipping `skip`.
    ///
    /// Skipping past the end gives nothing; taking past the end gives what
    /// is there.
    pub fn get_sequence(&mut self, skip: usize, take: usize) -> Result<Vec<Value>> {
        let result = self.read_sequence(skip, take);
        self.finish(result)
    }

    fn read_sequence(&mut self, skip: usize, take: usize) -> Result<Vec<Value>> {
        let rows = self.store.get_sequence(skip, take)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let headers = self.store.header_array()?;
        debug!(skip, rows = rows.len(), "decoding sequence");
        Ok(to_values(&rows, headers)?)
    }

    /// The raw cells of the named columns, one row per value.
    pub fn get_columns(&mut self, headers: &[&str]) -> Result<Vec<Row>> {
        if !self.store.has_body()? {
            return Ok(Vec::new());
        }
        let result = self.store.get_columns(headers);
        self.finish(result)
    }

    /// The raw cells of one column, top to bottom.
    pub fn get_column_as_array(&mut self, header: &str) -> Result<Vec<Scalar>> {
        if !self.store.has_body()? {
            return Ok(Vec::new());
        }
        let result = self.store.get_column_as_array(header);
        self.finish(result)
    }

    /// Every value the selector accepts, in order.
    pub fn get_like(&mut self, selector: impl FnMut(&Value) -> bool) -> Result<Vec<Value>> {
        let result = self.store.get_like_values(selector);
        self.finish(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySheet;
    use structsheet_codec::from_json;
    use serde_json::json;

    fn table() -> Table<MemorySheet> {
        Table::open(MemorySheet::new(), Options::default()).unwrap()
    }

    fn ids(values: &[Value]) -> Vec<i64> {
        values
            .iter()
            .filter_map(|v| v.member("id")?.as_scalar()?.as_i64())
            .collect()
    }

    fn records(range: std::ops::RangeInclusive<i64>) -> Vec<Value> {
        range.map(|id| from_json(json!({"id": id}))).collect()
    }

    #[test]
    fn empty_table_reads_nothing() {
        let mut t = table();
        assert_eq!(t.count().unwrap(), 0);
        assert!(t.get_all().unwrap().is_empty());
        assert!(t.get_first(3).unwrap().is_empty());
        assert!(t.get_last(3).unwrap().is_empty());
        assert!(t.get_columns(&["id"]).unwrap().is_empty());
        assert!(t.get_column_as_array("id").unwrap().is_empty());
        assert!(t.get_like(|_| true).unwrap().is_empty());
        assert_eq!(t.remove_like(|_| true).unwrap(), 0);
        assert_eq!(t.update_like(|_| true, |v| v).unwrap(), 0);
    }

    #[test]
    fn add_nothing_is_noop() {
        let mut t = table();
        t.add_at(3, &[]).unwrap();
        assert_eq!(t.store().substrate().rows(), &[vec![Scalar::empty()]]);
    }

    #[test]
    fn append_prepend_and_insert() {
        let mut t = table();
        t.add_append(&records(1..=3)).unwrap();
        t.add_prepend(&records(0..=0)).unwrap();
        t.add_at(2, &records(9..=9)).unwrap();
        assert_eq!(ids(&t.get_all().unwrap()), vec![0, 9, 1, 2, 3]);
    }

    #[test]
    fn sequences() {
        let mut t = table();
        t.add_append(&records(1..=6)).unwrap();
        assert_eq!(ids(&t.get_first(2).unwrap()), vec![1, 2]);
        assert_eq!(ids(&t.get_last(2).unwrap()), vec![5, 6]);
        assert_eq!(ids(&t.get_last(10).unwrap()), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(ids(&t.get_sequence(4, 10).unwrap()), vec![5, 6]);
        assert!(t.get_sequence(6, 1).unwrap().is_empty());
        assert!(t.get_first(0).unwrap().is_empty());
    }

    #[test]
    fn nested_values_round_trip() {
        let mut t = table();
        let car = from_json(json!({
            "make": "honda",
            "owners": [{"name": "a"}, {"name": "b", "since": 2019}],
            "dims.cm": {"w": 180}
        }));
        t.add_append(std::slice::from_ref(&car)).unwrap();
        assert_eq!(t.get_all().unwrap(), vec![car.clone()]);

        t.store_mut().clear_cache();
        assert_eq!(t.get_all().unwrap(), vec![car]);
    }

    #[test]
    fn new_fields_extend_columns() {
        let mut t = table();
        t.add_append(&[from_json(json!({"b": 1}))]).unwrap();
        t.add_append(&[from_json(json!({"a": 2}))]).unwrap();

        assert_eq!(
            t.store_mut().header_array().unwrap().as_slice(),
            ["b", "a"]
        );
        assert_eq!(
            t.get_columns(&["a", "b"]).unwrap(),
            vec![
                vec![Scalar::empty(), Scalar::Integer(1)],
                vec![Scalar::Integer(2), Scalar::empty()]
            ]
        );
        assert_eq!(
            t.get_column_as_array("b").unwrap(),
            vec![Scalar::Integer(1), Scalar::empty()]
        );
    }

    #[test]
    fn update_and_remove_like() {
        let mut t = table();
        t.add_append(&records(1..=10)).unwrap();

        let even = |v: &Value| ids(std::slice::from_ref(v))[0] % 2 == 0;
        let updated = t
            .update_like(even, |mut v| {
                v.insert("even", true);
                v
            })
            .unwrap();
        assert_eq!(updated, 5);
        assert_eq!(
            t.get_like(|v| v.member("even").is_some()).unwrap().len(),
            5
        );

        assert_eq!(t.remove_like(even).unwrap(), 5);
        assert_eq!(ids(&t.get_all().unwrap()), vec![1, 3, 5, 7, 9]);
    }

    #[test]
    fn wipe_cache_every_operation() {
        let options = Options::new().with_wipe_cache_every_operation(true);
        let mut t = Table::open(MemorySheet::new(), options).unwrap();
        t.add_append(&records(1..=3)).unwrap();
        assert!(!t.store().cache().body_rows.is_cached());
        assert_eq!(t.count().unwrap(), 3);
        assert!(!t.store().cache().body_rows.is_cached());
    }

    #[test]
    fn open_prunes_blank_tail() {
        let mut sheet = MemorySheet::from_rows(vec![
            vec![Scalar::from("id")],
            vec![Scalar::Integer(1)],
        ]);
        sheet.insert_rows_after(2, 5).unwrap();
        let t = Table::open(sheet, Options::default()).unwrap();
        assert_eq!(t.into_substrate().rows().len(), 2);
    }

    #[test]
    fn clear_then_reuse() {
        let mut t = table();
        t.add_append(&records(1..=4)).unwrap();
        t.clear().unwrap();
        assert_eq!(t.count().unwrap(), 0);

        t.add_append(&[from_json(json!({"x": "y"}))]).unwrap();
        assert_eq!(t.store_mut().header_array().unwrap().as_slice(), ["x"]);
        assert_eq!(t.get_all().unwrap(), vec![from_json(json!({"x": "y"}))]);
    }

    #[test]
    fn destroy_removes_sheet() {
        let t = table();
        assert!(t.destroy().is_ok());
    }
}
