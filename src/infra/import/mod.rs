use std::collections::{HashMap, HashSet};

use anyhow::{bail, Context, Result};

use crate::domain::entities::currency::{currency, Currency};
use crate::domain::entities::price::{MoneyAmount, Product, Variant};

pub mod csv;
pub mod xlsx;

/// Leading columns of a price sheet; every column after them is a currency code.
pub const FIXED_HEADERS: [&str; 5] = ["product_id", "product_title", "variant_id", "variant_title", "sku"];

/// Builds products from a header row and data rows.
///
/// Rows of one product may be scattered; products keep first-seen order.
/// Blank amount cells mean the variant has no price in that currency.
pub fn products_from_rows(headers: &[String], rows: &[Vec<String>]) -> Result<Vec<Product>> {
    if headers.len() < FIXED_HEADERS.len() {
        bail!(
            "price sheet needs the columns {} followed by currency codes",
            FIXED_HEADERS.join(", ")
        );
    }
    for (idx, expected) in FIXED_HEADERS.iter().enumerate() {
        if !headers[idx].trim().eq_ignore_ascii_case(expected) {
            bail!(
                "column {} should be {expected}, found {:?}",
                idx + 1,
                headers[idx]
            );
        }
    }

    let mut currency_headers = &headers[FIXED_HEADERS.len()..];
    while let Some((last, rest)) = currency_headers.split_last() {
        if !last.trim().is_empty() {
            break;
        }
        currency_headers = rest;
    }
    let currencies: Vec<&'static Currency> = currency_headers
        .iter()
        .enumerate()
        .map(|(offset, code)| {
            if code.trim().is_empty() {
                bail!(
                    "column {} has no currency code; blank header columns are only allowed at the end",
                    FIXED_HEADERS.len() + offset + 1
                );
            }
            currency(code).with_context(|| format!("unknown currency column {code:?}"))
        })
        .collect::<Result<_>>()?;

    let mut products: Vec<Product> = Vec::new();
    let mut product_index: HashMap<String, usize> = HashMap::new();
    let mut seen_variants: HashSet<String> = HashSet::new();

    for (row_idx, row) in rows.iter().enumerate() {
        // 1-based, counting the header row.
        let line = row_idx + 2;
        let value = |idx: usize| row.get(idx).map(|v| v.trim()).unwrap_or("");

        if row.iter().all(|v| v.trim().is_empty()) {
            continue;
        }

        let product_id = value(0);
        let variant_id = value(2);
        if product_id.is_empty() || variant_id.is_empty() {
            bail!("row {line}: product_id and variant_id are required");
        }
        if !seen_variants.insert(variant_id.to_string()) {
            bail!("row {line}: duplicate variant_id {variant_id}");
        }

        let mut prices = Vec::new();
        for (offset, known) in currencies.iter().enumerate() {
            let raw = value(FIXED_HEADERS.len() + offset);
            if raw.is_empty() {
                continue;
            }
            let amount = known
                .parse_amount(raw)
                .with_context(|| format!("row {line}: invalid {} amount {raw:?}", known.code))?;
            prices.push(MoneyAmount {
                currency_code: known.code.to_ascii_lowercase(),
                amount,
            });
        }

        let variant = Variant {
            id: variant_id.to_string(),
            title: value(3).to_string(),
            sku: value(4).to_string(),
            prices,
        };

        match product_index.get(product_id) {
            Some(&idx) => products[idx].variants.push(variant),
            None => {
                product_index.insert(product_id.to_string(), products.len());
                products.push(Product {
                    id: product_id.to_string(),
                    title: value(1).to_string(),
                    thumbnail: None,
                    variants: vec![variant],
                });
            }
        }
    }

    Ok(products)
}
