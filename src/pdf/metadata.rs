//! PDF metadata extraction

use lopdf::{Document, Object};
use crate::error::{Error, Result};
use crate::layout::PageDimensions;
use crate::pdf::page::{deref, page_dimensions};
use crate::pdf::source::{target_page, SourceDocument};

/// Count pages by reading the Count field from the Pages dictionary
///
/// This is more reliable than get_pages() for nested page trees; we fall
/// back to get_pages() when the catalog is unusual.
fn count_pages_from_catalog(doc: &Document) -> Option<usize> {
    let catalog = doc.catalog().ok()?;
    let pages = match catalog.get(b"Pages").ok().map(|o| deref(doc, o))? {
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    match pages.get(b"Count").ok().map(|o| deref(doc, o))? {
        Object::Integer(n) if *n >= 0 => Some(*n as usize),
        _ => None,
    }
}

/// PDF metadata
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Size of the page fields are flattened onto
    pub first_page: PageDimensions,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
}

fn info_string(doc: &Document, key: &[u8]) -> Option<String> {
    let info = match doc.trailer.get(b"Info").ok().map(|o| deref(doc, o))? {
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    let bytes = info.get(key).ok()?.as_str().ok()?;
    String::from_utf8(bytes.to_vec()).ok()
}

/// Extract metadata from a source document
pub fn extract_metadata(source: &SourceDocument) -> Result<PdfMetadata> {
    let doc = source.load()?;

    let page_count = count_pages_from_catalog(&doc).unwrap_or_else(|| doc.get_pages().len());
    if page_count == 0 {
        return Err(Error::EmptyPdf(source.label().to_string()));
    }

    let page_id = target_page(&doc, source.label())?;

    Ok(PdfMetadata {
        page_count,
        first_page: page_dimensions(&doc, page_id)?,
        title: info_string(&doc, b"Title"),
        author: info_string(&doc, b"Author"),
    })
}
