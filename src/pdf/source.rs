//! Source documents fields are flattened onto

use std::path::Path;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use crate::error::{Error, Result};
use crate::layout::PageDimensions;

/// Read-only bytes of the PDF that fields are drawn onto
///
/// Each flatten loads its own working copy, so a source can be shared
/// freely between calls.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    label: String,
    bytes: Vec<u8>,
}

impl SourceDocument {
    /// Wrap in-memory PDF bytes; `label` is used in error messages and logs
    pub fn from_bytes(label: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { label: label.into(), bytes }
    }

    /// Read a PDF file
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        Ok(Self::from_bytes(path.display().to_string(), bytes))
    }

    /// A single blank page of the given size
    pub fn blank(page: PageDimensions) -> Result<Self> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => Dictionary::new(),
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(page.width),
                Object::Real(page.height),
            ],
        });
        doc.objects.insert(pages_id, Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(Self::from_bytes("blank page", bytes))
    }

    /// The default source: one blank US Letter page
    pub fn blank_letter() -> Result<Self> {
        Self::blank(PageDimensions::letter())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Parse a private working copy, rejecting documents without pages
    pub fn load(&self) -> Result<Document> {
        let doc = Document::load_mem(&self.bytes)?;
        if doc.get_pages().is_empty() {
            return Err(Error::EmptyPdf(self.label.clone()));
        }
        Ok(doc)
    }
}

/// The page fields are drawn onto
///
/// Always the first page: a field's `page_number` is kept on the record but
/// not yet used for routing. Per-field page selection would hook in here.
pub fn target_page(doc: &Document, label: &str) -> Result<ObjectId> {
    doc.get_pages()
        .into_iter()
        .next()
        .map(|(_, id)| id)
        .ok_or_else(|| Error::EmptyPdf(label.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::page::page_dimensions;

    #[test]
    fn test_blank_letter_has_one_page() {
        let source = SourceDocument::blank_letter().unwrap();
        let doc = source.load().unwrap();
        assert_eq!(doc.get_pages().len(), 1);

        let page_id = target_page(&doc, source.label()).unwrap();
        assert_eq!(page_dimensions(&doc, page_id).unwrap(), PageDimensions::letter());
    }

    #[test]
    fn test_blank_a4() {
        let source = SourceDocument::blank(PageDimensions::a4()).unwrap();
        let doc = source.load().unwrap();
        let page_id = target_page(&doc, source.label()).unwrap();
        let dims = page_dimensions(&doc, page_id).unwrap();
        assert!((dims.height - 841.89).abs() < 0.01);
    }

    #[test]
    fn test_garbage_bytes_fail_to_load() {
        let source = SourceDocument::from_bytes("garbage", b"not a pdf".to_vec());
        assert!(matches!(source.load(), Err(Error::Pdf(_))));
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = SourceDocument::from_path(Path::new("nonexistent.pdf"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }
}
