pub mod extract;
pub mod pipeline;
pub mod recognizer;
pub mod types;

pub use extract::Extractor;
pub use pipeline::ReceiptPipeline;
pub use recognizer::{MockOcr, OcrBackend, OcrError};
pub use types::{
    normalize_lines, AmountCandidate, BlockType, Extraction, FeatureType, OcrLine,
    StorageLocation, TextBlock,
};
