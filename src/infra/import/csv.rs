use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::entities::price::Product;
use crate::infra::import::products_from_rows;

pub fn read_csv_price_sheet(csv_path: &Path) -> Result<Vec<Product>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("failed to open csv: {}", csv_path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("failed to read headers from csv: {}", csv_path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() {
        anyhow::bail!("csv header is required")
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to parse csv record")?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    products_from_rows(&headers, &rows)
        .with_context(|| format!("invalid price sheet: {}", csv_path.display()))
}
