use serde::{Deserialize, Serialize};

/// Sentinel vendor name carried by degraded records.
pub const EXTRACTION_ERROR_VENDOR: &str = "Extraction Error";

/// One purchased line item: the full source line it came from plus the
/// parsed amount rendered as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub description: String,
    pub amount: String,
}

/// The structured output of receipt extraction.
///
/// Every field defaults to empty/absent: any non-empty line sequence
/// produces a record, however little signal it carries. `date` and `time`
/// are kept in the OCR's literal formatting rather than normalized to
/// calendar types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    pub vendor_name: String,
    pub date: String,
    pub time: String,
    pub total_amount: Option<String>,
    pub subtotal: Option<String>,
    pub tax_amount: Option<String>,
    pub address: String,
    pub items: Vec<ReceiptItem>,
    /// Remaining unclassified lines joined with `" | "`, kept for audit.
    pub raw_text: String,
}

impl ReceiptRecord {
    /// The record produced when extraction fails outright: sentinel vendor
    /// name, empty fields, and a short error description in `raw_text`.
    pub fn degraded(reason: &str) -> Self {
        Self {
            vendor_name: EXTRACTION_ERROR_VENDOR.to_string(),
            raw_text: format!("Error: {reason}"),
            ..Self::default()
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.vendor_name == EXTRACTION_ERROR_VENDOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_is_all_empty() {
        let r = ReceiptRecord::default();
        assert!(r.vendor_name.is_empty());
        assert!(r.date.is_empty());
        assert!(r.time.is_empty());
        assert!(r.total_amount.is_none());
        assert!(r.subtotal.is_none());
        assert!(r.tax_amount.is_none());
        assert!(r.address.is_empty());
        assert!(r.items.is_empty());
        assert!(r.raw_text.is_empty());
    }

    #[test]
    fn degraded_record_carries_sentinel_and_reason() {
        let r = ReceiptRecord::degraded("backend unreachable");
        assert_eq!(r.vendor_name, EXTRACTION_ERROR_VENDOR);
        assert_eq!(r.raw_text, "Error: backend unreachable");
        assert!(r.is_degraded());
        assert!(r.total_amount.is_none());
    }

    #[test]
    fn record_serializes_with_snake_case_fields() {
        let r = ReceiptRecord {
            vendor_name: "Starbucks".into(),
            total_amount: Some("5.5".into()),
            items: vec![ReceiptItem { description: "Latte $5.50".into(), amount: "5.5".into() }],
            ..Default::default()
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["vendor_name"], "Starbucks");
        assert_eq!(json["total_amount"], "5.5");
        assert_eq!(json["items"][0]["amount"], "5.5");
    }
}
