pub mod db;

pub use db::{
    create_db, get_receipt_by_id, insert_receipt, list_receipts, DbPool, StorageError,
    StoredReceipt,
};
