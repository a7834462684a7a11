//! Field presets
//!
//! A preset is an ordered list of field records that replaces the whole
//! field collection when loaded. Records may omit anything except the field
//! kind; omitted attributes take the same defaults as a newly added field.

use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::field::{
    Field, FieldId, FieldKind, Position, Size, DEFAULT_FONT_SIZE, DEFAULT_POSITION,
    DEFAULT_SIZE, MIN_FONT_SIZE,
};

/// One field as it appears in a preset file
///
/// Accepts the editor's legacy key names (`pageNo`, `assign`) as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FieldId>,
    #[serde(rename = "type", alias = "kind")]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, alias = "pageNo", skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Mirror of `content` kept by older presets; used when `content` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, alias = "assign", skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
}

impl FieldRecord {
    /// A record with only the kind set
    pub fn new(kind: FieldKind) -> Self {
        Self {
            id: None,
            kind,
            name: None,
            page_number: None,
            position: None,
            size: None,
            font_size: None,
            content: None,
            value: None,
            assignees: None,
        }
    }

    /// Build the field, filling gaps with creation defaults
    pub fn into_field(self, id: FieldId) -> Field {
        let kind = self.kind;
        Field {
            id,
            kind,
            name: self.name.unwrap_or_else(|| format!("{}-{}", kind, id)),
            page_number: self.page_number.unwrap_or(1).max(1),
            position: self.position.unwrap_or(DEFAULT_POSITION),
            size: self.size.unwrap_or(DEFAULT_SIZE),
            font_size: self.font_size.unwrap_or(DEFAULT_FONT_SIZE).max(MIN_FONT_SIZE),
            content: self.content.or(self.value).or_else(|| kind.empty_content()),
            assignees: self.assignees.unwrap_or_default(),
        }
    }
}

impl From<&Field> for FieldRecord {
    fn from(field: &Field) -> Self {
        Self {
            id: Some(field.id),
            kind: field.kind,
            name: Some(field.name.clone()),
            page_number: Some(field.page_number),
            position: Some(field.position),
            size: Some(field.size),
            font_size: Some(field.font_size),
            content: field.content.clone(),
            value: None,
            assignees: Some(field.assignees.clone()),
        }
    }
}

/// An ordered list of field records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preset {
    pub records: Vec<FieldRecord>,
}

impl Preset {
    pub fn new(records: Vec<FieldRecord>) -> Self {
        Self { records }
    }

    /// Snapshot existing fields as a preset
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = &'a Field>) -> Self {
        Self { records: fields.into_iter().map(FieldRecord::from).collect() }
    }

    /// Parse a JSON array of field records
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a preset file
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The built-in signing template: signer name, date, signature and witness
pub fn template() -> Preset {
    let text = |id: u64, name: &str, top: f32, left: f32, width: f32, content: &str, who: &[&str]| FieldRecord {
        id: Some(FieldId(id)),
        name: Some(name.to_string()),
        position: Some(Position { top, left }),
        size: Some(Size::new(width, 24.0)),
        font_size: Some(14),
        content: Some(content.to_string()),
        assignees: Some(who.iter().map(|s| s.to_string()).collect()),
        ..FieldRecord::new(FieldKind::Text)
    };

    Preset::new(vec![
        text(1, "signer-name", 120.0, 72.0, 250.0, "Full name", &["signer"]),
        text(2, "signed-on", 120.0, 360.0, 180.0, "Date", &["signer"]),
        FieldRecord {
            id: Some(FieldId(3)),
            name: Some("signature".to_string()),
            position: Some(Position { top: 640.0, left: 72.0 }),
            size: Some(Size::new(200.0, 60.0)),
            assignees: Some(vec!["signer".to_string()]),
            ..FieldRecord::new(FieldKind::Image)
        },
        text(4, "witness-name", 720.0, 72.0, 250.0, "Witness", &["witness"]),
    ])
}
