use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn open_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open db: {}", db_path.display()))?;
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign key enforcement")?;
    Ok(conn)
}

pub fn init_db(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent dir: {}", parent.display()))?;
    }

    let conn = open_connection(db_path)?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS price_list (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            source_path TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS product (
            price_list_id INTEGER NOT NULL,
            id            TEXT NOT NULL,
            position      INTEGER NOT NULL,
            title         TEXT NOT NULL,
            thumbnail     TEXT,
            PRIMARY KEY (price_list_id, id),
            FOREIGN KEY (price_list_id) REFERENCES price_list(id)
        );

        CREATE TABLE IF NOT EXISTS variant (
            price_list_id INTEGER NOT NULL,
            id            TEXT NOT NULL,
            product_id    TEXT NOT NULL,
            position      INTEGER NOT NULL,
            title         TEXT NOT NULL,
            sku           TEXT NOT NULL,
            PRIMARY KEY (price_list_id, id),
            FOREIGN KEY (price_list_id, product_id) REFERENCES product(price_list_id, id)
        );

        CREATE TABLE IF NOT EXISTS price (
            price_list_id INTEGER NOT NULL,
            variant_id    TEXT NOT NULL,
            currency_code TEXT NOT NULL,
            amount        INTEGER NOT NULL,
            PRIMARY KEY (price_list_id, variant_id, currency_code),
            FOREIGN KEY (price_list_id, variant_id) REFERENCES variant(price_list_id, id)
        );

        CREATE TABLE IF NOT EXISTS price_change (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            price_list_id INTEGER NOT NULL,
            variant_id    TEXT NOT NULL,
            currency_code TEXT NOT NULL,
            old_amount    INTEGER,
            new_amount    INTEGER NOT NULL,
            committed_at  TEXT NOT NULL,
            FOREIGN KEY (price_list_id) REFERENCES price_list(id)
        );

        CREATE INDEX IF NOT EXISTS idx_variant_product
            ON variant(price_list_id, product_id, position);

        CREATE INDEX IF NOT EXISTS idx_price_change_list
            ON price_change(price_list_id, committed_at);
        ",
    )
    .context("failed to initialize schema")?;

    Ok(())
}
