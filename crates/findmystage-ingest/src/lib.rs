//! FindMyStage Ingest: document text extraction, reference links, analysis input.

pub mod document;
pub mod input;
pub mod links;
pub mod pdf;

pub use document::{content_fingerprint, extract_document, DocumentBlob, ExtractedText, MediaType};
pub use input::ProfileInput;
pub use links::{extract_link, LinkExtraction, ReferenceChannel, ReferenceLinks};
