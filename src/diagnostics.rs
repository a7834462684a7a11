//! Developer-facing dump of the field list
//!
//! Purely observational: nothing reads this output back.

use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::field::{Field, FieldId, FieldKind, Position, Size};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DumpEntry<'a> {
    id: FieldId,
    #[serde(rename = "type")]
    kind: FieldKind,
    content: Option<&'a str>,
    page_number: u32,
    value: Option<&'a str>,
    position: Position,
    size: Size,
    name: &'a str,
    font_size: u32,
    assignees: &'a [String],
}

impl<'a> From<&'a Field> for DumpEntry<'a> {
    fn from(field: &'a Field) -> Self {
        Self {
            id: field.id,
            kind: field.kind,
            content: field.content.as_deref(),
            page_number: field.page_number,
            value: field.content.as_deref(),
            position: field.position,
            size: field.size,
            name: &field.name,
            font_size: field.font_size,
            assignees: &field.assignees,
        }
    }
}

/// Pretty JSON of each field's externally relevant attributes
pub fn dump(fields: &[Field]) -> Result<String> {
    let entries: Vec<DumpEntry<'_>> = fields.iter().map(DumpEntry::from).collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

/// Emit [`dump`] on the log at info level
pub fn log_dump(fields: &[Field]) -> Result<()> {
    info!("{}", dump(fields)?);
    Ok(())
}
