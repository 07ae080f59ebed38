use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};

use crate::domain::entities::price::Product;
use crate::infra::import::products_from_rows;

pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(v) => v.trim().to_string(),
        Data::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", *v as i64),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Reads the first worksheet of a workbook as a price sheet.
pub fn read_xlsx_price_sheet(xlsx_path: &Path) -> Result<Vec<Product>> {
    let mut workbook = open_workbook_auto(xlsx_path)
        .with_context(|| format!("failed to open xlsx: {}", xlsx_path.display()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .with_context(|| format!("workbook has no sheets: {}", xlsx_path.display()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("failed to read sheet: {sheet_name}"))?;

    let mut rows = range
        .rows()
        .map(|r| r.iter().map(cell_to_string).collect::<Vec<String>>());
    let headers: Vec<String> = rows
        .next()
        .with_context(|| format!("sheet {sheet_name} is empty"))?;
    let data: Vec<Vec<String>> = rows.collect();

    products_from_rows(&headers, &data)
        .with_context(|| format!("invalid price sheet {sheet_name} in {}", xlsx_path.display()))
}
