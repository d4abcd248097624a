use serde::Serialize;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::path::Path;
use thiserror::Error;

use tillscan_core::{ReceiptItem, ReceiptRecord};

pub type DbPool = Pool<Sqlite>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("Item list serialization failed: {0}")]
    Items(#[from] serde_json::Error),
}

pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite:{}?mode=rwc", path.display()))
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS receipts (
            receipt_id TEXT PRIMARY KEY,
            stored_at TEXT NOT NULL,
            receipt_url TEXT NOT NULL,
            vendor_name TEXT NOT NULL DEFAULT '',
            date TEXT NOT NULL DEFAULT '',
            time TEXT NOT NULL DEFAULT '',
            total_amount TEXT NOT NULL DEFAULT '',
            subtotal TEXT NOT NULL DEFAULT '',
            tax_amount TEXT NOT NULL DEFAULT '',
            address TEXT NOT NULL DEFAULT '',
            items TEXT NOT NULL DEFAULT '[]',
            raw_text TEXT NOT NULL DEFAULT '',
            processing_status TEXT NOT NULL DEFAULT 'completed'
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// A persisted receipt: the extracted record plus its storage metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredReceipt {
    pub receipt_id: String,
    /// ISO-8601 UTC timestamp supplied by the caller at ingest time.
    pub stored_at: String,
    pub receipt_url: String,
    pub processing_status: String,
    pub record: ReceiptRecord,
}

/// Persist one fully-formed record. Durability and idempotency are the
/// store's concern; callers do not retry here — a failure propagates and
/// fails the whole batch.
pub async fn insert_receipt(
    pool: &DbPool,
    receipt_id: &str,
    stored_at: &str,
    receipt_url: &str,
    status: &str,
    record: &ReceiptRecord,
) -> Result<(), StorageError> {
    let items_json = serde_json::to_string(&record.items)?;

    sqlx::query(
        r#"
        INSERT INTO receipts (
            receipt_id, stored_at, receipt_url, vendor_name, date, time,
            total_amount, subtotal, tax_amount, address, items, raw_text,
            processing_status
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(receipt_id)
    .bind(stored_at)
    .bind(receipt_url)
    .bind(&record.vendor_name)
    .bind(&record.date)
    .bind(&record.time)
    .bind(record.total_amount.as_deref().unwrap_or(""))
    .bind(record.subtotal.as_deref().unwrap_or(""))
    .bind(record.tax_amount.as_deref().unwrap_or(""))
    .bind(&record.address)
    .bind(items_json)
    .bind(&record.raw_text)
    .bind(status)
    .execute(pool)
    .await?;

    Ok(())
}

type ReceiptRow = (
    String,         // receipt_id
    String,         // stored_at
    String,         // receipt_url
    String,         // vendor_name
    String,         // date
    String,         // time
    String,         // total_amount
    String,         // subtotal
    String,         // tax_amount
    String,         // address
    String,         // items JSON
    String,         // raw_text
    String,         // processing_status
);

fn row_to_receipt(r: ReceiptRow) -> Result<StoredReceipt, StorageError> {
    let items: Vec<ReceiptItem> = serde_json::from_str(&r.10)?;
    let opt = |s: String| if s.is_empty() { None } else { Some(s) };
    Ok(StoredReceipt {
        receipt_id: r.0,
        stored_at: r.1,
        receipt_url: r.2,
        processing_status: r.12,
        record: ReceiptRecord {
            vendor_name: r.3,
            date: r.4,
            time: r.5,
            total_amount: opt(r.6),
            subtotal: opt(r.7),
            tax_amount: opt(r.8),
            address: r.9,
            items,
            raw_text: r.11,
        },
    })
}

const RECEIPT_COLUMNS: &str = "receipt_id, stored_at, receipt_url, vendor_name, date, time, \
     total_amount, subtotal, tax_amount, address, items, raw_text, processing_status";

pub async fn get_receipt_by_id(
    pool: &DbPool,
    receipt_id: &str,
) -> Result<Option<StoredReceipt>, StorageError> {
    let row = sqlx::query_as::<_, ReceiptRow>(&format!(
        "SELECT {RECEIPT_COLUMNS} FROM receipts WHERE receipt_id = ?"
    ))
    .bind(receipt_id)
    .fetch_optional(pool)
    .await?;

    row.map(row_to_receipt).transpose()
}

pub async fn list_receipts(pool: &DbPool, limit: i64) -> Result<Vec<StoredReceipt>, StorageError> {
    let rows = sqlx::query_as::<_, ReceiptRow>(&format!(
        "SELECT {RECEIPT_COLUMNS} FROM receipts ORDER BY stored_at DESC LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(row_to_receipt).collect()
}
