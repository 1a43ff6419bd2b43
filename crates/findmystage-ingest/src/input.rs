//! Per-request analysis input.

use findmystage_core::{Error, Result};

use crate::document::DocumentBlob;
use crate::links::{ReferenceChannel, ReferenceLinks};

/// Everything the user handed in for one analysis. Owned by the request and
/// dropped once the analysis settles.
#[derive(Debug, Clone, Default)]
pub struct ProfileInput {
    pub document: Option<DocumentBlob>,
    pub reference_links: ReferenceLinks,
}

impl ProfileInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, document: DocumentBlob) -> Self {
        self.document = Some(document);
        self
    }

    pub fn with_link(mut self, channel: ReferenceChannel, url: impl Into<String>) -> Self {
        self.reference_links.set(channel, url);
        self
    }

    /// A document or at least one non-blank link.
    pub fn has_content(&self) -> bool {
        self.document.is_some() || self.reference_links.has_any()
    }

    /// Reject inputs with nothing to analyze.
    pub fn validate(&self) -> Result<()> {
        if self.has_content() {
            Ok(())
        } else {
            Err(Error::InvalidInput(
                "Please provide at least one content source to analyze".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_rejected() {
        let input = ProfileInput::new().with_link(ReferenceChannel::Website, "  ");
        assert!(!input.has_content());
        assert!(matches!(input.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_link_only_input_is_accepted() {
        let input = ProfileInput::new().with_link(ReferenceChannel::ProfessionalNetwork, "https://example.com/in/jane");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_document_only_input_is_accepted() {
        let blob = DocumentBlob::new(vec![1, 2, 3], "application/pdf", Some("cv.pdf".into())).unwrap();
        let input = ProfileInput::new().with_document(blob);
        assert!(input.has_content());
    }
}
