//! Page-level lopdf helpers: inherited attributes, resources and contents

use lopdf::{Dictionary, Document, Object, ObjectId};
use crate::error::{Error, Result};
use crate::layout::PageDimensions;

/// Page tree depth we are willing to walk looking for inherited attributes
const MAX_TREE_DEPTH: usize = 32;

/// Follow a reference to its object, or return the object itself
pub(crate) fn deref<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

/// Look up a page attribute, walking up the page tree for inheritable ones
/// (`Resources`, `MediaBox`, `CropBox`, `Rotate`)
pub(crate) fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok();

    for _ in 0..MAX_TREE_DEPTH {
        let dict = node?;
        if let Ok(value) = dict.get(key) {
            return Some(deref(doc, value));
        }
        node = match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => doc.get_dictionary(*parent).ok(),
            _ => None,
        };
    }

    None
}

fn number(doc: &Document, object: &Object) -> Option<f32> {
    match deref(doc, object) {
        Object::Integer(n) => Some(*n as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Page size from its (possibly inherited) MediaBox
///
/// Pages without a MediaBox are treated as US Letter.
pub fn page_dimensions(doc: &Document, page_id: ObjectId) -> Result<PageDimensions> {
    let Some(media_box) = inherited(doc, page_id, b"MediaBox") else {
        return Ok(PageDimensions::letter());
    };

    let corners: Vec<f32> = match media_box {
        Object::Array(values) => values.iter().filter_map(|v| number(doc, v)).collect(),
        _ => Vec::new(),
    };
    if corners.len() != 4 {
        return Err(Error::InvalidMediaBox(page_id));
    }

    Ok(PageDimensions {
        width: (corners[2] - corners[0]).abs(),
        height: (corners[3] - corners[1]).abs(),
    })
}

/// A copy of the page's effective Resources dictionary
pub(crate) fn page_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    match inherited(doc, page_id, b"Resources") {
        Some(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    }
}

/// Store a Resources dictionary directly on the page
///
/// The page gets its own copy so resources shared with other pages through
/// the page tree are left untouched.
pub(crate) fn set_page_resources(doc: &mut Document, page_id: ObjectId, resources: Dictionary) -> Result<()> {
    let page_dict = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page_dict.set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Add `object_id` under a fresh name in one resource category
/// (`Font`, `XObject`, ...) and return that name
pub(crate) fn register_resource(
    doc: &Document,
    resources: &mut Dictionary,
    category: &[u8],
    prefix: &str,
    object_id: ObjectId,
) -> String {
    let mut entries = match resources.get(category).map(|o| deref(doc, o)) {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };

    let name = unique_name(&entries, prefix);
    entries.set(name.clone(), Object::Reference(object_id));
    resources.set(category.to_vec(), Object::Dictionary(entries));
    name
}

/// First `{prefix}{n}` not already used in `entries`
fn unique_name(entries: &Dictionary, prefix: &str) -> String {
    (1..)
        .map(|n| format!("{}{}", prefix, n))
        .find(|candidate| !entries.has(candidate.as_bytes()))
        .unwrap_or_else(|| prefix.to_string())
}

/// The page's Contents as a flat list of stream references
///
/// A Contents entry that references an array is spliced open, since a
/// Contents array may only hold streams.
fn content_streams(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let page_dict = doc.get_dictionary(page_id)?;
    let contents = match page_dict.get(b"Contents") {
        Ok(Object::Reference(content_id)) => match doc.get_object(*content_id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*content_id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    };
    Ok(contents)
}

/// Prepend a content stream to a page's Contents
pub(crate) fn prepend_content_to_page(doc: &mut Document, page_id: ObjectId, new_content_id: ObjectId) -> Result<()> {
    let mut contents = content_streams(doc, page_id)?;
    contents.insert(0, Object::Reference(new_content_id));

    let page_dict = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page_dict.set("Contents", Object::Array(contents));
    Ok(())
}

/// Append a content stream to a page's Contents, so it draws on top
pub(crate) fn append_content_to_page(doc: &mut Document, page_id: ObjectId, new_content_id: ObjectId) -> Result<()> {
    let mut contents = content_streams(doc, page_id)?;
    contents.push(Object::Reference(new_content_id));

    let page_dict = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page_dict.set("Contents", Object::Array(contents));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    fn two_level_tree() -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! { "Type" => "Font" });
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(pages_id, Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        }));
        (doc, page_id)
    }

    #[test]
    fn test_inherited_media_box() {
        let (doc, page_id) = two_level_tree();
        let dims = page_dimensions(&doc, page_id).unwrap();
        assert_eq!(dims.width, 595.0);
        assert_eq!(dims.height, 842.0);
    }

    #[test]
    fn test_missing_media_box_defaults_to_letter() {
        let mut doc = Document::with_version("1.5");
        let page_id = doc.add_object(dictionary! { "Type" => "Page" });
        assert_eq!(page_dimensions(&doc, page_id).unwrap(), PageDimensions::letter());
    }

    #[test]
    fn test_malformed_media_box() {
        let mut doc = Document::with_version("1.5");
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into()],
        });
        assert!(matches!(page_dimensions(&doc, page_id), Err(Error::InvalidMediaBox(_))));
    }

    #[test]
    fn test_register_resource_avoids_existing_names() {
        let (doc, page_id) = two_level_tree();
        let mut resources = page_resources(&doc, page_id);
        let name = register_resource(&doc, &mut resources, b"Font", "F", (99, 0));
        assert_eq!(name, "F2");

        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        assert!(fonts.has(b"F1"));
        assert!(fonts.has(b"F2"));
    }

    #[test]
    fn test_contents_order() {
        let mut doc = Document::with_version("1.5");
        let original = doc.add_object(Stream::new(Dictionary::new(), b"0 0 m".to_vec()));
        let page_id = doc.add_object(dictionary! { "Type" => "Page", "Contents" => original });
        let before = doc.add_object(Stream::new(Dictionary::new(), b"q".to_vec()));
        let after = doc.add_object(Stream::new(Dictionary::new(), b"Q".to_vec()));

        prepend_content_to_page(&mut doc, page_id, before).unwrap();
        append_content_to_page(&mut doc, page_id, after).unwrap();

        let contents = doc.get_dictionary(page_id).unwrap().get(b"Contents").unwrap().as_array().unwrap().clone();
        assert_eq!(
            contents,
            vec![Object::Reference(before), Object::Reference(original), Object::Reference(after)]
        );
    }

    #[test]
    fn test_indirect_contents_array_is_spliced() {
        let mut doc = Document::with_version("1.5");
        let original = doc.add_object(Stream::new(Dictionary::new(), b"0 0 m".to_vec()));
        let array_id = doc.add_object(Object::Array(vec![Object::Reference(original)]));
        let page_id = doc.add_object(dictionary! { "Type" => "Page", "Contents" => array_id });
        let before = doc.add_object(Stream::new(Dictionary::new(), b"q".to_vec()));
        let after = doc.add_object(Stream::new(Dictionary::new(), b"Q".to_vec()));

        prepend_content_to_page(&mut doc, page_id, before).unwrap();
        append_content_to_page(&mut doc, page_id, after).unwrap();

        let contents = doc.get_dictionary(page_id).unwrap().get(b"Contents").unwrap().as_array().unwrap().clone();
        assert_eq!(
            contents,
            vec![Object::Reference(before), Object::Reference(original), Object::Reference(after)]
        );
    }
}
