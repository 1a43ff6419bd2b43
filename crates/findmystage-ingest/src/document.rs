//! Document blobs and text extraction entry point.

use std::path::Path;

use findmystage_core::{Error, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::pdf;

/// Declared media types the extractor knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Pdf,
    Unsupported,
}

impl MediaType {
    pub const PDF_MIME: &'static str = "application/pdf";

    /// Classify a declared MIME type. Parameters (`; charset=...`) are ignored.
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime.split(';').next().unwrap_or("").trim().to_lowercase();
        match essence.as_str() {
            Self::PDF_MIME => Self::Pdf,
            _ => Self::Unsupported,
        }
    }

    /// Detect media type from a file extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            _ => Self::Unsupported,
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Pdf)
    }
}

/// An uploaded document held in memory.
///
/// The declared media type is trusted; no magic-byte sniffing is done, so a
/// mislabeled blob only fails once the decoder rejects it.
#[derive(Debug, Clone)]
pub struct DocumentBlob {
    bytes: Vec<u8>,
    media_type: MediaType,
    filename: Option<String>,
}

impl DocumentBlob {
    /// Wrap bytes with their declared MIME type. Only PDF is accepted.
    pub fn new(bytes: Vec<u8>, declared_mime: &str, filename: Option<String>) -> Result<Self> {
        let media_type = MediaType::from_mime(declared_mime);
        if !media_type.is_supported() {
            return Err(Error::UnsupportedMedia(declared_mime.to_string()));
        }
        Ok(Self {
            bytes,
            media_type,
            filename,
        })
    }

    /// Read a document from disk, deriving its media type from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let media_type = MediaType::from_extension(ext);
        if !media_type.is_supported() {
            return Err(Error::UnsupportedMedia(format!(".{}", ext)));
        }
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_string());
        Ok(Self {
            bytes,
            media_type,
            filename,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Page-ordered plain text of a document, pages separated by a blank line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub const PAGE_SEPARATOR: &'static str = "\n\n";

    /// Join page texts in order. Pages with no text still occupy their slot.
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = pages
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(Self::PAGE_SEPARATOR);
        if joined.trim().is_empty() {
            Self::default()
        } else {
            Self(joined)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when no usable text was found.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for ExtractedText {
    fn from(text: String) -> Self {
        if text.trim().is_empty() {
            Self::default()
        } else {
            Self(text)
        }
    }
}

/// Extract the text of a document. All-or-nothing: no partial text on failure.
pub fn extract_document(blob: &DocumentBlob) -> Result<ExtractedText> {
    match blob.media_type() {
        MediaType::Pdf => pdf::extract_text(blob.bytes()),
        MediaType::Unsupported => Err(Error::UnsupportedMedia(
            blob.filename().unwrap_or("document").to_string(),
        )),
    }
}

/// Compute SHA-256 fingerprint of document bytes.
pub fn content_fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
