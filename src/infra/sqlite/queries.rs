use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::{params, types::Value, OptionalExtension};

use crate::domain::entities::price::{MoneyAmount, PriceList, Product, Variant};
use crate::infra::sqlite::schema::{init_db, open_connection};
use crate::usecase::ports::repo::VariantPriceUpdate;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { changed: usize },
    MissingPriceList,
    MissingVariant(String),
}

/// One row of the price audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceChange {
    pub variant_id: String,
    pub currency_code: String,
    pub old_amount: Option<i64>,
    pub new_amount: i64,
    pub committed_at: String,
}

fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

pub fn create_price_list(
    db_path: &Path,
    name: &str,
    source_path: &str,
    products: &[Product],
) -> Result<i64> {
    init_db(db_path)?;
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start price list create transaction")?;

    tx.execute(
        "INSERT INTO price_list(name, source_path, created_at) VALUES (?1, ?2, ?3)",
        params![name, source_path, now_timestamp()],
    )
    .context("failed to insert price list")?;
    let price_list_id = tx.last_insert_rowid();

    let mut insert_product = tx
        .prepare(
            "INSERT INTO product(price_list_id, id, position, title, thumbnail)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .context("failed to prepare product insert")?;
    let mut insert_variant = tx
        .prepare(
            "INSERT INTO variant(price_list_id, id, product_id, position, title, sku)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .context("failed to prepare variant insert")?;
    let mut insert_price = tx
        .prepare(
            "INSERT INTO price(price_list_id, variant_id, currency_code, amount)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .context("failed to prepare price insert")?;

    for (position, product) in products.iter().enumerate() {
        insert_product
            .execute(params![
                price_list_id,
                product.id,
                position as i64,
                product.title,
                product.thumbnail
            ])
            .with_context(|| format!("failed to insert product {}", product.id))?;

        for (variant_position, variant) in product.variants.iter().enumerate() {
            insert_variant
                .execute(params![
                    price_list_id,
                    variant.id,
                    product.id,
                    variant_position as i64,
                    variant.title,
                    variant.sku
                ])
                .with_context(|| format!("failed to insert variant {}", variant.id))?;

            for price in &variant.prices {
                insert_price
                    .execute(params![
                        price_list_id,
                        variant.id,
                        price.currency_code.to_ascii_lowercase(),
                        price.amount
                    ])
                    .with_context(|| {
                        format!(
                            "failed to insert {} price for variant {}",
                            price.currency_code, variant.id
                        )
                    })?;
            }
        }
    }
    drop(insert_price);
    drop(insert_variant);
    drop(insert_product);

    tx.commit().context("failed to commit price list create")?;
    Ok(price_list_id)
}

pub fn list_price_lists(db_path: &Path) -> Result<Vec<PriceList>> {
    init_db(db_path)?;
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(
            "SELECT id, name, source_path, created_at
             FROM price_list
             ORDER BY id DESC",
        )
        .context("failed to prepare price lists query")?;

    let price_lists = stmt
        .query_map([], |row| {
            Ok(PriceList {
                id: row.get::<_, i64>(0)?.into(),
                name: row.get(1)?,
                source_path: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .context("failed to query price lists")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect price lists")?;

    Ok(price_lists)
}

/// Returns the number of renamed rows; zero means the list does not exist.
pub fn rename_price_list(db_path: &Path, price_list_id: i64, name: &str) -> Result<usize> {
    let conn = open_connection(db_path)?;
    let renamed = conn
        .execute(
            "UPDATE price_list SET name = ?1 WHERE id = ?2",
            params![name, price_list_id],
        )
        .with_context(|| format!("failed to rename price list #{price_list_id}"))?;
    Ok(renamed)
}

/// Removes a list with all its rows; returns zero when it did not exist.
pub fn delete_price_list(db_path: &Path, price_list_id: i64) -> Result<usize> {
    init_db(db_path)?;
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start delete transaction")?;
    for table in ["price_change", "price", "variant", "product"] {
        tx.execute(
            &format!("DELETE FROM {table} WHERE price_list_id = ?1"),
            params![price_list_id],
        )
        .with_context(|| format!("failed to delete {table} rows for price list #{price_list_id}"))?;
    }
    let deleted = tx
        .execute("DELETE FROM price_list WHERE id = ?1", params![price_list_id])
        .with_context(|| format!("failed to delete price list #{price_list_id}"))?;
    tx.commit().context("failed to commit delete transaction")?;
    Ok(deleted)
}

/// Returns one page of products (with variants and prices) and the filtered total.
///
/// `search` matches product title, variant title or SKU.
pub fn query_products(
    db_path: &Path,
    price_list_id: i64,
    search: &str,
    offset: i64,
    limit: i64,
) -> Result<(Vec<Product>, i64)> {
    if limit <= 0 {
        anyhow::bail!("limit must be greater than zero")
    }

    let conn = open_connection(db_path)?;

    let mut where_sql = String::from("p.price_list_id = ?");
    let mut filter_params = vec![Value::Integer(price_list_id)];
    let search = search.trim();
    if !search.is_empty() {
        where_sql.push_str(
            " AND (
                p.title LIKE ?
                OR EXISTS (
                    SELECT 1 FROM variant v
                    WHERE v.price_list_id = p.price_list_id
                      AND v.product_id = p.id
                      AND (v.title LIKE ? OR v.sku LIKE ?)
                )
            )",
        );
        let pattern = format!("%{search}%");
        filter_params.push(Value::Text(pattern.clone()));
        filter_params.push(Value::Text(pattern.clone()));
        filter_params.push(Value::Text(pattern));
    }

    let total: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM product p WHERE {where_sql}"),
            rusqlite::params_from_iter(filter_params.iter().cloned()),
            |row| row.get(0),
        )
        .context("failed to query filtered product count")?;

    let mut page_params = filter_params;
    page_params.push(Value::Integer(limit));
    page_params.push(Value::Integer(offset.max(0)));

    let mut product_stmt = conn
        .prepare(&format!(
            "SELECT p.id, p.title, p.thumbnail
             FROM product p
             WHERE {where_sql}
             ORDER BY p.position ASC
             LIMIT ? OFFSET ?"
        ))
        .context("failed to prepare products query")?;
    let mut products = product_stmt
        .query_map(rusqlite::params_from_iter(page_params), |row| {
            Ok(Product {
                id: row.get(0)?,
                title: row.get(1)?,
                thumbnail: row.get(2)?,
                variants: Vec::new(),
            })
        })
        .context("failed to query products")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect products")?;
    drop(product_stmt);

    let mut variant_stmt = conn
        .prepare(
            "SELECT id, title, sku
             FROM variant
             WHERE price_list_id = ?1 AND product_id = ?2
             ORDER BY position ASC",
        )
        .context("failed to prepare variants query")?;
    let mut price_stmt = conn
        .prepare(
            "SELECT currency_code, amount
             FROM price
             WHERE price_list_id = ?1 AND variant_id = ?2
             ORDER BY currency_code ASC",
        )
        .context("failed to prepare prices query")?;

    for product in &mut products {
        let variants = variant_stmt
            .query_map(params![price_list_id, product.id], |row| {
                Ok(Variant {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    sku: row.get(2)?,
                    prices: Vec::new(),
                })
            })
            .with_context(|| format!("failed to query variants of {}", product.id))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to collect variants")?;

        for mut variant in variants {
            variant.prices = price_stmt
                .query_map(params![price_list_id, variant.id], |row| {
                    Ok(MoneyAmount {
                        currency_code: row.get(0)?,
                        amount: row.get(1)?,
                    })
                })
                .with_context(|| format!("failed to query prices of {}", variant.id))?
                .collect::<rusqlite::Result<Vec<_>>>()
                .context("failed to collect prices")?;
            product.variants.push(variant);
        }
    }

    Ok((products, total))
}

/// Writes every update in one transaction and logs each changed amount.
///
/// Unchanged amounts are skipped. A missing list or variant rolls the whole
/// batch back.
pub fn apply_price_updates(
    db_path: &Path,
    price_list_id: i64,
    updates: &[VariantPriceUpdate],
) -> Result<ApplyOutcome> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start price update transaction")?;

    let list_exists: bool = tx
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM price_list WHERE id = ?1)",
            params![price_list_id],
            |row| row.get(0),
        )
        .context("failed to check price list")?;
    if !list_exists {
        return Ok(ApplyOutcome::MissingPriceList);
    }

    let committed_at = now_timestamp();
    let mut changed = 0_usize;
    {
        let mut variant_exists = tx
            .prepare("SELECT EXISTS(SELECT 1 FROM variant WHERE price_list_id = ?1 AND id = ?2)")
            .context("failed to prepare variant check")?;
        let mut current_amount = tx
            .prepare(
                "SELECT amount FROM price
                 WHERE price_list_id = ?1 AND variant_id = ?2 AND currency_code = ?3",
            )
            .context("failed to prepare current price query")?;
        let mut upsert_price = tx
            .prepare(
                "INSERT INTO price(price_list_id, variant_id, currency_code, amount)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(price_list_id, variant_id, currency_code)
                 DO UPDATE SET amount = excluded.amount",
            )
            .context("failed to prepare price upsert")?;
        let mut insert_change = tx
            .prepare(
                "INSERT INTO price_change(
                    price_list_id, variant_id, currency_code, old_amount, new_amount, committed_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .context("failed to prepare price change insert")?;

        for update in updates {
            let found: bool = variant_exists
                .query_row(params![price_list_id, update.variant_id], |row| row.get(0))
                .with_context(|| format!("failed to check variant {}", update.variant_id))?;
            if !found {
                return Ok(ApplyOutcome::MissingVariant(update.variant_id.clone()));
            }

            for price in &update.prices {
                let currency_code = price.currency_code.to_ascii_lowercase();
                let old_amount: Option<i64> = current_amount
                    .query_row(
                        params![price_list_id, update.variant_id, currency_code],
                        |row| row.get(0),
                    )
                    .optional()
                    .context("failed to read current price")?;
                if old_amount == Some(price.amount) {
                    continue;
                }

                upsert_price
                    .execute(params![
                        price_list_id,
                        update.variant_id,
                        currency_code,
                        price.amount
                    ])
                    .with_context(|| {
                        format!("failed to write {currency_code} price for {}", update.variant_id)
                    })?;
                insert_change
                    .execute(params![
                        price_list_id,
                        update.variant_id,
                        currency_code,
                        old_amount,
                        price.amount,
                        committed_at
                    ])
                    .context("failed to record price change")?;
                changed += 1;
            }
        }
    }

    tx.commit().context("failed to commit price updates")?;
    Ok(ApplyOutcome::Applied { changed })
}

pub fn load_price_changes(db_path: &Path, price_list_id: i64) -> Result<Vec<PriceChange>> {
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(
            "SELECT variant_id, currency_code, old_amount, new_amount, committed_at
             FROM price_change
             WHERE price_list_id = ?1
             ORDER BY id ASC",
        )
        .context("failed to prepare price change query")?;

    let changes = stmt
        .query_map([price_list_id], |row| {
            Ok(PriceChange {
                variant_id: row.get(0)?,
                currency_code: row.get(1)?,
                old_amount: row.get(2)?,
                new_amount: row.get(3)?,
                committed_at: row.get(4)?,
            })
        })
        .context("failed to query price changes")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect price changes")?;

    Ok(changes)
}
