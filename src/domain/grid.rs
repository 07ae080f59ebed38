use std::collections::HashMap;

use crate::domain::entities::currency::{currency, CurrencyFields};
use crate::domain::entities::edit::{CellId, ColumnKey, RowKey};
use crate::domain::entities::price::{Product, Variant};

/// Read side of the row data an editor session works against.
pub trait OriginalValues {
    /// Whether the cell is part of the current row/column universe.
    fn contains(&self, cell: &CellId) -> bool;

    /// The stored value of the cell, `None` when the row has no amount for the column.
    fn original_value(&self, cell: &CellId) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    pub key: RowKey,
    pub title: String,
    pub sku: String,
    variant: Variant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSection {
    pub product_id: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub rows: Vec<GridRow>,
}

/// The price matrix: one row per variant, one column per visible currency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceGrid {
    sections: Vec<ProductSection>,
    columns: Vec<ColumnKey>,
    row_index: HashMap<RowKey, (usize, usize)>,
}

impl PriceGrid {
    pub fn new(products: &[Product], fields: &CurrencyFields) -> Self {
        let columns: Vec<ColumnKey> = fields.iter().cloned().collect();
        let mut row_index = HashMap::new();
        let mut sections = Vec::with_capacity(products.len());

        for (section_idx, product) in products.iter().enumerate() {
            let mut rows = Vec::with_capacity(product.variants.len());
            for variant in &product.variants {
                let key = RowKey::new(variant.id.clone());
                if row_index.contains_key(&key) {
                    tracing::warn!("duplicate variant id {key} in product {}; keeping first", product.id);
                    continue;
                }
                row_index.insert(key.clone(), (section_idx, rows.len()));
                rows.push(GridRow {
                    key,
                    title: variant.title.clone(),
                    sku: variant.sku.clone(),
                    variant: variant.clone(),
                });
            }
            sections.push(ProductSection {
                product_id: product.id.clone(),
                title: product.title.clone(),
                thumbnail: product.thumbnail.clone(),
                rows,
            });
        }

        Self {
            sections,
            columns,
            row_index,
        }
    }

    pub fn sections(&self) -> &[ProductSection] {
        &self.sections
    }

    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }

    pub fn rows(&self) -> impl Iterator<Item = &GridRow> {
        self.sections.iter().flat_map(|section| section.rows.iter())
    }

    pub fn row(&self, key: &RowKey) -> Option<&GridRow> {
        let (section_idx, row_idx) = self.row_index.get(key).copied()?;
        self.sections.get(section_idx)?.rows.get(row_idx)
    }

    /// Every addressable cell, row-major.
    pub fn cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.rows().flat_map(move |row| {
            self.columns.iter().map(move |column| CellId {
                row: row.key.clone(),
                column: column.clone(),
            })
        })
    }

    pub fn row_count(&self) -> usize {
        self.row_index.len()
    }
}

impl OriginalValues for PriceGrid {
    fn contains(&self, cell: &CellId) -> bool {
        self.row_index.contains_key(&cell.row) && self.columns.contains(&cell.column)
    }

    fn original_value(&self, cell: &CellId) -> Option<String> {
        if !self.columns.contains(&cell.column) {
            return None;
        }
        let row = self.row(&cell.row)?;
        let price = row.variant.price_in(cell.column.as_str())?;
        let currency = currency(cell.column.as_str())?;
        Some(currency.format_amount(price.amount))
    }
}

/// Keeps products whose title, or any variant title or SKU, contains `search`.
///
/// Matching variants are not narrowed: a product either shows all its rows or none.
pub fn filter_products(products: &[Product], search: &str) -> Vec<Product> {
    let term = search.trim().to_lowercase();
    if term.is_empty() {
        return products.to_vec();
    }

    products
        .iter()
        .filter(|product| {
            product.title.to_lowercase().contains(&term)
                || product.variants.iter().any(|variant| {
                    variant.title.to_lowercase().contains(&term)
                        || variant.sku.to_lowercase().contains(&term)
                })
        })
        .cloned()
        .collect()
}
