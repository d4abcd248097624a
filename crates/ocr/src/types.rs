use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillscan_core::ReceiptRecord;

/// Where a stored document lives, as carried by the trigger event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLocation {
    pub bucket: String,
    pub key: String,
}

impl StorageLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self { bucket: bucket.into(), key: key.into() }
    }

    /// Public object URL recorded alongside the stored receipt.
    pub fn object_url(&self) -> String {
        format!("https://{}.s3.amazonaws.com/{}", self.bucket, self.key)
    }
}

/// Structural analyses the backend may be asked to run. Accepted as
/// configuration and passed through; line extraction ignores their output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureType {
    Tables,
    Forms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Page,
    Line,
    Word,
    Table,
    Cell,
    KeyValueSet,
}

/// One unit of detected text, in the document order the backend reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub block_type: BlockType,
    pub text: String,
}

impl TextBlock {
    pub fn line(text: impl Into<String>) -> Self {
        Self { block_type: BlockType::Line, text: text.into() }
    }
}

/// A non-empty, trimmed line with its zero-based position in reading order.
/// Adjacency of indices implies layout adjacency on the receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrLine {
    pub index: usize,
    pub text: String,
}

/// A monetary value parsed out of a line, with provenance kept as an index
/// into the shared line slice. A single line may yield several candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountCandidate {
    pub value: Decimal,
    pub line_index: usize,
}

/// Keep only line-level blocks, trim them, drop any that trim to empty.
/// Order is preserved; every later extraction pass reads this sequence.
pub fn normalize_lines(blocks: &[TextBlock]) -> Vec<OcrLine> {
    blocks
        .iter()
        .filter(|b| b.block_type == BlockType::Line)
        .map(|b| b.text.trim())
        .filter(|t| !t.is_empty())
        .enumerate()
        .map(|(index, text)| OcrLine { index, text: text.to_string() })
        .collect()
}

/// Outcome of processing one document. Extraction itself never fails;
/// a backend failure yields a degraded record with the cause attached so
/// callers can still store and report it.
#[derive(Debug, Clone)]
pub enum Extraction {
    Complete(ReceiptRecord),
    Degraded { record: ReceiptRecord, reason: String },
}

impl Extraction {
    pub fn record(&self) -> &ReceiptRecord {
        match self {
            Extraction::Complete(record) => record,
            Extraction::Degraded { record, .. } => record,
        }
    }

    pub fn into_record(self) -> ReceiptRecord {
        match self {
            Extraction::Complete(record) => record,
            Extraction::Degraded { record, .. } => record,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Extraction::Degraded { .. })
    }

    /// Processing status persisted with the record.
    pub fn status(&self) -> &'static str {
        match self {
            Extraction::Complete(_) => "completed",
            Extraction::Degraded { .. } => "extraction_degraded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_keeps_only_trimmed_line_blocks() {
        let blocks = vec![
            TextBlock { block_type: BlockType::Page, text: "page 1".into() },
            TextBlock::line("  Starbucks  "),
            TextBlock { block_type: BlockType::Word, text: "Starbucks".into() },
            TextBlock::line("   "),
            TextBlock::line("Total $5.50"),
        ];
        let lines = normalize_lines(&blocks);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], OcrLine { index: 0, text: "Starbucks".into() });
        assert_eq!(lines[1], OcrLine { index: 1, text: "Total $5.50".into() });
    }

    #[test]
    fn normalize_preserves_document_order() {
        let blocks: Vec<TextBlock> = ["c", "a", "b"].iter().map(|t| TextBlock::line(*t)).collect();
        let lines = normalize_lines(&blocks);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["c", "a", "b"]);
    }

    #[test]
    fn object_url_embeds_bucket_and_key() {
        let loc = StorageLocation::new("receipts", "2026/feb/r1.jpg");
        assert_eq!(loc.object_url(), "https://receipts.s3.amazonaws.com/2026/feb/r1.jpg");
    }

    #[test]
    fn extraction_status_strings() {
        let complete = Extraction::Complete(ReceiptRecord::default());
        assert_eq!(complete.status(), "completed");
        assert!(!complete.is_degraded());

        let degraded = Extraction::Degraded {
            record: ReceiptRecord::degraded("boom"),
            reason: "boom".into(),
        };
        assert_eq!(degraded.status(), "extraction_degraded");
        assert!(degraded.is_degraded());
    }
}
