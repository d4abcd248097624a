use tillscan_core::ReceiptRecord;

use crate::extract::Extractor;
use crate::recognizer::OcrBackend;
use crate::types::{normalize_lines, Extraction, FeatureType, StorageLocation};

/// Orchestrates: analyze → normalize lines → extract.
///
/// Stateless across invocations; documents can be processed concurrently by
/// independent calls with no coordination.
pub struct ReceiptPipeline<R: OcrBackend> {
    recognizer: R,
    features: Vec<FeatureType>,
}

impl<R: OcrBackend> ReceiptPipeline<R> {
    pub fn new(recognizer: R, features: Vec<FeatureType>) -> Self {
        Self { recognizer, features }
    }

    /// Process one stored document. Backend failures never propagate: they
    /// come back as a degraded record carrying the failure reason, so the
    /// caller can persist and report it like any other result.
    pub fn process(&self, location: &StorageLocation) -> Extraction {
        match self.recognizer.analyze(location, &self.features) {
            Ok(blocks) => {
                let lines = normalize_lines(&blocks);
                tracing::debug!(
                    key = %location.key,
                    line_count = lines.len(),
                    "extracting receipt fields"
                );
                Extraction::Complete(Extractor::extract(&lines))
            }
            Err(e) => {
                tracing::warn!(key = %location.key, "OCR analysis failed: {e}");
                let reason = e.to_string();
                Extraction::Degraded { record: ReceiptRecord::degraded(&reason), reason }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::MockOcr;
    use tillscan_core::EXTRACTION_ERROR_VENDOR;

    fn loc() -> StorageLocation {
        StorageLocation::new("receipts", "scan.jpg")
    }

    #[test]
    fn process_extracts_fields_from_backend_lines() {
        let pipeline = ReceiptPipeline::new(
            MockOcr::new("Starbucks Reserve\n123 Pike St\nLatte $5.50\nTotal $5.50"),
            vec![FeatureType::Tables, FeatureType::Forms],
        );

        let extraction = pipeline.process(&loc());
        assert!(!extraction.is_degraded());
        let record = extraction.record();
        assert_eq!(record.vendor_name, "Starbucks Reserve");
        assert_eq!(record.address, "123 Pike St");
        assert_eq!(record.total_amount.as_deref(), Some("5.5"));
    }

    #[test]
    fn backend_failure_becomes_degraded_record() {
        let pipeline = ReceiptPipeline::new(MockOcr::failing("access denied"), vec![]);

        let extraction = pipeline.process(&loc());
        assert!(extraction.is_degraded());
        let record = extraction.record();
        assert_eq!(record.vendor_name, EXTRACTION_ERROR_VENDOR);
        assert!(record.raw_text.contains("access denied"));
        assert!(record.total_amount.is_none());
    }

    #[test]
    fn boxed_backend_works_through_pipeline() {
        let backend: Box<dyn OcrBackend> = Box::new(MockOcr::new("SHOP\nTotal $1.00"));
        let pipeline = ReceiptPipeline::new(backend, vec![]);
        let record = pipeline.process(&loc()).into_record();
        assert_eq!(record.total_amount.as_deref(), Some("1.0"));
    }

    #[test]
    fn repeated_processing_is_idempotent() {
        let pipeline = ReceiptPipeline::new(
            MockOcr::new("Starbucks\nSunday, January 5 2025\n10:15 AM\nLatte $5.50"),
            vec![],
        );
        let a = pipeline.process(&loc()).into_record();
        let b = pipeline.process(&loc()).into_record();
        assert_eq!(a, b);
    }
}
