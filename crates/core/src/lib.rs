pub mod amount;
pub mod receipt;

pub use amount::amount_string;
pub use receipt::{ReceiptItem, ReceiptRecord, EXTRACTION_ERROR_VENDOR};
