use thiserror::Error;

use crate::types::{FeatureType, StorageLocation, TextBlock};

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Document not readable: {0}")]
    BadDocument(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
}

/// Abstraction over a document-analysis OCR backend.
///
/// Implementations read the document straight from object storage (the
/// backend is handed the storage location, never raw bytes) and return the
/// detected text blocks in reading order. Requested feature analyses are
/// passed through; line extraction does not consume their output.
pub trait OcrBackend: Send + Sync {
    fn analyze(
        &self,
        location: &StorageLocation,
        features: &[FeatureType],
    ) -> Result<Vec<TextBlock>, OcrError>;
}

impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn analyze(
        &self,
        location: &StorageLocation,
        features: &[FeatureType],
    ) -> Result<Vec<TextBlock>, OcrError> {
        (**self).analyze(location, features)
    }
}

// ── Mock backend (always available, used for tests and default wiring) ───────

/// Returns pre-set blocks regardless of location — useful for exercising
/// the extraction pipeline without a real OCR service.
pub struct MockOcr {
    blocks: Vec<TextBlock>,
    error: Option<String>,
}

impl MockOcr {
    /// One `Line` block per newline-separated segment of `text`.
    pub fn new(text: impl AsRef<str>) -> Self {
        let blocks = text.as_ref().lines().map(TextBlock::line).collect();
        Self { blocks, error: None }
    }

    pub fn from_blocks(blocks: Vec<TextBlock>) -> Self {
        Self { blocks, error: None }
    }

    /// A backend that always fails, for exercising degraded handling.
    pub fn failing(message: impl Into<String>) -> Self {
        Self { blocks: vec![], error: Some(message.into()) }
    }
}

impl OcrBackend for MockOcr {
    fn analyze(
        &self,
        _location: &StorageLocation,
        _features: &[FeatureType],
    ) -> Result<Vec<TextBlock>, OcrError> {
        match &self.error {
            Some(msg) => Err(OcrError::Engine(msg.clone())),
            None => Ok(self.blocks.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlockType;

    fn loc() -> StorageLocation {
        StorageLocation::new("bucket", "key.jpg")
    }

    #[test]
    fn mock_splits_text_into_line_blocks() {
        let r = MockOcr::new("STARBUCKS\nTotal $5.50");
        let blocks = r.analyze(&loc(), &[]).unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.block_type == BlockType::Line));
        assert_eq!(blocks[1].text, "Total $5.50");
    }

    #[test]
    fn mock_ignores_location_and_features() {
        let r = MockOcr::new("hello");
        let a = r.analyze(&loc(), &[FeatureType::Tables, FeatureType::Forms]).unwrap();
        let b = r.analyze(&StorageLocation::new("other", "x"), &[]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn failing_mock_returns_engine_error() {
        let r = MockOcr::failing("throttled");
        let err = r.analyze(&loc(), &[]).unwrap_err();
        assert!(matches!(err, OcrError::Engine(_)));
        assert_eq!(err.to_string(), "OCR engine error: throttled");
    }
}
