//! Flattening: draw every field onto the source document's first page
//!
//! Screen space (top-left origin, Y down) is converted to PDF space
//! (bottom-left origin, Y up) through [`crate::layout`]. Fields draw in list
//! order, so later fields cover earlier ones where they overlap.

use lopdf::{Dictionary, Document, ObjectId, Stream};
use log::{debug, warn};

use crate::error::Result;
use crate::field::{Field, FieldId, FieldKind};
use crate::layout::image_placement;
use crate::pdf::image::{embed_image, load_field_image, SkipReason};
use crate::pdf::page::{
    append_content_to_page, page_dimensions, page_resources, prepend_content_to_page,
    register_resource, set_page_resources,
};
use crate::pdf::source::{target_page, SourceDocument};
use crate::pdf::text::{add_helvetica, write_text_field};

/// Options for flattening fields
#[derive(Debug, Clone)]
pub struct FlattenOptions {
    /// Inset of text from the box's left and top edges, in points
    pub text_padding: f32,
    /// Line advance as a multiple of the font size
    pub line_height_factor: f32,
    /// Compress uncompressed streams before saving
    pub compress: bool,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            text_padding: 3.0,
            line_height_factor: 1.2,
            compress: true,
        }
    }
}

/// A field that was left out, and why
#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub id: FieldId,
    pub reason: SkipReason,
}

/// Result of a flatten
#[derive(Debug, Clone)]
pub struct Flattened {
    /// The finished PDF
    pub bytes: Vec<u8>,
    /// Fields drawn, in draw order
    pub drawn: Vec<FieldId>,
    /// Fields left out
    pub skipped: Vec<Skipped>,
}

/// Draw `fields` onto the first page of `source` and serialize the result
///
/// Works on a private copy of the source, so concurrent calls with the same
/// inputs are independent and produce identical bytes. Problems with a
/// single image field skip that field; anything wrong with the document
/// itself aborts with an error and no output.
///
/// # Example
///
/// ```no_run
/// use pdf_fields::{FieldKind, FieldModel};
/// use pdf_fields::pdf::{flatten, FlattenOptions, SourceDocument};
///
/// let mut model = FieldModel::default();
/// let id = model.add_field(FieldKind::Text);
/// model.set_text(id, "Hello");
///
/// let source = SourceDocument::blank_letter().expect("blank page");
/// let flattened = flatten(&model.fields(), &source, &FlattenOptions::default())
///     .expect("Failed to flatten");
/// assert_eq!(flattened.drawn, vec![id]);
/// ```
pub fn flatten(fields: &[Field], source: &SourceDocument, options: &FlattenOptions) -> Result<Flattened> {
    let mut doc = source.load()?;
    let page_id = target_page(&doc, source.label())?;
    let page_height = page_dimensions(&doc, page_id)?.height;

    let mut resources = page_resources(&doc, page_id);
    let mut font_name: Option<String> = None;
    let mut content = Vec::new();
    let mut drawn = Vec::new();
    let mut skipped = Vec::new();

    for field in fields {
        if field.page_number != 1 {
            debug!("field {} targets page {}, drawing on page 1", field.id, field.page_number);
        }

        match field.kind {
            FieldKind::Text => {
                let name = match font_name.clone() {
                    Some(name) => name,
                    None => {
                        let font_id = add_helvetica(&mut doc);
                        let name = register_resource(&doc, &mut resources, b"Font", "F", font_id);
                        font_name = Some(name.clone());
                        name
                    }
                };
                write_text_field(
                    &mut content,
                    field,
                    &name,
                    page_height,
                    options.text_padding,
                    options.line_height_factor,
                );
            }
            FieldKind::Image => {
                let image = match load_field_image(field.content.as_deref()) {
                    Ok(image) => image,
                    Err(reason) => {
                        warn!("skipping image field {}: {}", field.id, reason);
                        skipped.push(Skipped { id: field.id, reason });
                        continue;
                    }
                };

                let xobject_id = embed_image(&mut doc, &image)?;
                let name = register_resource(&doc, &mut resources, b"XObject", "Im", xobject_id);
                let rect = image_placement(field.position, field.size, image.intrinsic_size(), page_height);
                content.extend_from_slice(
                    format!(
                        "q\n{} 0 0 {} {} {} cm\n/{} Do\nQ\n",
                        rect.width, rect.height, rect.x, rect.y, name
                    )
                    .as_bytes(),
                );
            }
        }

        debug!("drew {} field {}", field.kind, field.id);
        drawn.push(field.id);
    }

    set_page_resources(&mut doc, page_id, resources)?;
    isolate_page_content(&mut doc, page_id)?;
    let overlay_id = doc.add_object(Stream::new(Dictionary::new(), content));
    append_content_to_page(&mut doc, page_id, overlay_id)?;

    if options.compress {
        doc.compress();
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;

    Ok(Flattened { bytes, drawn, skipped })
}

/// Wrap the page's existing content in `q` ... `Q`
///
/// A page may leave a transformation matrix or colour set at the end of its
/// content; restoring the graphics state puts the overlay back in plain page
/// coordinates.
fn isolate_page_content(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let restore_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
    prepend_content_to_page(doc, page_id, save_id)?;
    append_content_to_page(doc, page_id, restore_id)?;
    Ok(())
}
