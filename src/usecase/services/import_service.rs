use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::domain::entities::price::{PriceListId, Product};
use crate::infra::import::csv::read_csv_price_sheet;
use crate::infra::import::xlsx::read_xlsx_price_sheet;
use crate::usecase::ports::repo::{NewPriceList, PriceListRepository};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResult {
    pub price_list_id: PriceListId,
    pub product_count: usize,
    pub variant_count: usize,
}

pub struct ImportService {
    repo: Arc<dyn PriceListRepository>,
}

impl ImportService {
    pub fn new(repo: Arc<dyn PriceListRepository>) -> Self {
        Self { repo }
    }

    pub fn import_csv(&self, path: &Path) -> Result<ImportResult> {
        let products = read_csv_price_sheet(path)?;
        self.store(path, &products)
    }

    pub fn import_xlsx(&self, path: &Path) -> Result<ImportResult> {
        let products = read_xlsx_price_sheet(path)?;
        self.store(path, &products)
    }

    /// Picks the reader from the file extension.
    pub fn import_file(&self, path: &Path) -> Result<ImportResult> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xls" | "xlsm" | "ods" => self.import_xlsx(path),
            _ => self.import_csv(path),
        }
    }

    fn store(&self, path: &Path, products: &[Product]) -> Result<ImportResult> {
        let name = path
            .file_stem()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(crate::config::default_price_list_name);
        let meta = NewPriceList {
            name,
            source_path: path.to_string_lossy().into_owned(),
        };

        let price_list_id = self
            .repo
            .create_price_list(meta, products)
            .map_err(|err| anyhow!(err))?;
        let variant_count = products.iter().map(|p| p.variants.len()).sum();
        tracing::info!(
            "imported {} product(s), {variant_count} variant(s) from {} into list #{}",
            products.len(),
            path.display(),
            price_list_id.0
        );

        Ok(ImportResult {
            price_list_id,
            product_count: products.len(),
            variant_count,
        })
    }
}
