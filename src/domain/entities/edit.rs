use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

/// Identifies one matrix row: a product variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey(String);

impl RowKey {
    pub fn new(variant_id: impl Into<String>) -> Self {
        RowKey(variant_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RowKey {
    fn from(value: &str) -> Self {
        RowKey::new(value)
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies one matrix column: a currency code, always upper case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnKey(String);

impl ColumnKey {
    pub fn new(currency_code: &str) -> Self {
        ColumnKey(currency_code.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stored amounts carry lower case codes.
    pub fn matches_currency(&self, currency_code: &str) -> bool {
        self.0.eq_ignore_ascii_case(currency_code.trim())
    }
}

impl From<&str> for ColumnKey {
    fn from(value: &str) -> Self {
        ColumnKey::new(value)
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId {
    pub row: RowKey,
    pub column: ColumnKey,
}

impl CellId {
    pub fn new(row: impl Into<RowKey>, column: impl Into<ColumnKey>) -> Self {
        Self {
            row: row.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Sparse overlay of proposed values on top of the original price data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingEdits {
    staged_cells: BTreeMap<CellId, String>,
}

impl PendingEdits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, cell: &CellId) -> Option<&str> {
        self.staged_cells.get(cell).map(String::as_str)
    }

    pub fn contains(&self, cell: &CellId) -> bool {
        self.staged_cells.contains_key(cell)
    }

    pub fn len(&self) -> usize {
        self.staged_cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged_cells.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, CellId, String> {
        self.staged_cells.iter()
    }

    /// Edits grouped per variant, columns in key order.
    pub fn by_row(&self) -> BTreeMap<&RowKey, Vec<(&ColumnKey, &str)>> {
        let mut rows: BTreeMap<&RowKey, Vec<(&ColumnKey, &str)>> = BTreeMap::new();
        for (cell, value) in &self.staged_cells {
            rows.entry(&cell.row)
                .or_default()
                .push((&cell.column, value.as_str()));
        }
        rows
    }

    pub(crate) fn stage(&mut self, cell: CellId, value: String) {
        self.staged_cells.insert(cell, value);
    }

    pub(crate) fn clear(&mut self) {
        self.staged_cells.clear();
    }
}

impl<'a> IntoIterator for &'a PendingEdits {
    type Item = (&'a CellId, &'a String);
    type IntoIter = btree_map::Iter<'a, CellId, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
