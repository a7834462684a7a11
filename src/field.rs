//! Placed field records
//!
//! A field is a text or image box positioned in screen space (origin at the
//! top-left of the editor surface, Y growing downward).

use std::fmt;
use serde::{Deserialize, Serialize};

/// Default font size for new text fields, in points
pub const DEFAULT_FONT_SIZE: u32 = 16;

/// Smallest font size a field can be shrunk to
pub const MIN_FONT_SIZE: u32 = 1;

/// Increment used by the grow/shrink font controls
pub const FONT_SIZE_STEP: i32 = 2;

/// Where new fields land on the surface
pub const DEFAULT_POSITION: Position = Position { top: 50.0, left: 50.0 };

/// Box size of new fields
pub const DEFAULT_SIZE: Size = Size { width: 100.0, height: 100.0 };

/// Unique field identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub u64);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a field draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Image,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Image => "image",
        }
    }

    /// Content a freshly added field starts with
    pub fn empty_content(&self) -> Option<String> {
        match self {
            FieldKind::Text => Some(String::new()),
            FieldKind::Image => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top/left offset in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub top: f32,
    pub left: f32,
}

/// Width and height
///
/// A field's box size in screen pixels, a page-space size in points after
/// [`crate::layout::contain`], or an image's intrinsic size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A placed text or image field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub name: String,
    /// 1-based page index; flattening currently always targets page 1
    pub page_number: u32,
    pub position: Position,
    pub size: Size,
    pub font_size: u32,
    /// Text for text fields, a `data:image/...;base64,` URI for image fields
    pub content: Option<String>,
    pub assignees: Vec<String>,
}

impl Field {
    /// A field with default placement, as created by the "add" action
    pub fn new(id: FieldId, kind: FieldKind) -> Self {
        Self {
            id,
            kind,
            name: format!("{}-{}", kind, id),
            page_number: 1,
            position: DEFAULT_POSITION,
            size: DEFAULT_SIZE,
            font_size: DEFAULT_FONT_SIZE,
            content: kind.empty_content(),
            assignees: Vec::new(),
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == FieldKind::Text
    }

    pub fn is_image(&self) -> bool {
        self.kind == FieldKind::Image
    }
}

/// Partial update merged over an existing field by
/// [`FieldModel::update_field`](crate::model::FieldModel::update_field)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch {
    pub position: Option<Position>,
    pub size: Option<Size>,
    pub content: Option<String>,
    pub font_size: Option<u32>,
    pub assignees: Option<Vec<String>>,
}

impl FieldPatch {
    pub fn position(top: f32, left: f32) -> Self {
        Self { position: Some(Position { top, left }), ..Default::default() }
    }

    pub fn size(width: f32, height: f32) -> Self {
        Self { size: Some(Size::new(width, height)), ..Default::default() }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self { content: Some(content.into()), ..Default::default() }
    }

    pub fn font_size(font_size: u32) -> Self {
        Self { font_size: Some(font_size), ..Default::default() }
    }

    pub fn assignees(assignees: Vec<String>) -> Self {
        Self { assignees: Some(assignees), ..Default::default() }
    }

    /// Merge this patch over `field`; absent attributes are left alone
    pub(crate) fn apply(self, field: &mut Field) {
        if let Some(position) = self.position {
            field.position = position;
        }
        if let Some(size) = self.size {
            field.size = size;
        }
        if let Some(content) = self.content {
            field.content = Some(content);
        }
        if let Some(font_size) = self.font_size {
            field.font_size = font_size.max(MIN_FONT_SIZE);
        }
        if let Some(assignees) = self.assignees {
            field.assignees = assignees;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_text_field_defaults() {
        let field = Field::new(FieldId(7), FieldKind::Text);
        assert_eq!(field.name, "text-7");
        assert_eq!(field.page_number, 1);
        assert_eq!(field.position, DEFAULT_POSITION);
        assert_eq!(field.size, DEFAULT_SIZE);
        assert_eq!(field.font_size, 16);
        assert_eq!(field.content.as_deref(), Some(""));
        assert!(field.assignees.is_empty());
    }

    #[test]
    fn test_new_image_field_has_no_content() {
        let field = Field::new(FieldId(8), FieldKind::Image);
        assert_eq!(field.name, "image-8");
        assert!(field.content.is_none());
    }

    #[test]
    fn test_patch_merges_only_given_attributes() {
        let mut field = Field::new(FieldId(1), FieldKind::Text);
        field.content = Some("keep".to_string());

        FieldPatch::position(10.0, 20.0).apply(&mut field);

        assert_eq!(field.position, Position { top: 10.0, left: 20.0 });
        assert_eq!(field.size, DEFAULT_SIZE);
        assert_eq!(field.content.as_deref(), Some("keep"));
    }

    #[test]
    fn test_patch_font_size_floor() {
        let mut field = Field::new(FieldId(1), FieldKind::Text);
        FieldPatch::font_size(0).apply(&mut field);
        assert_eq!(field.font_size, MIN_FONT_SIZE);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&FieldKind::Image).unwrap();
        assert_eq!(json, "\"image\"");
    }
}
