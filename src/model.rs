//! The field model: the authoritative list of placed fields
//!
//! Every mutation swaps in a new collection instead of editing the current
//! one, so a caller holding an earlier [`FieldModel::fields`] snapshot can tell
//! whether anything changed with [`Arc::ptr_eq`]. Mutations that change
//! nothing keep the current collection.

use std::collections::HashSet;
use std::sync::Arc;
use log::{debug, warn};

use crate::field::{
    Field, FieldId, FieldKind, FieldPatch, Position, Size, FONT_SIZE_STEP, MIN_FONT_SIZE,
};
use crate::layout::Surface;
use crate::preset::Preset;

/// Largest id a preset may keep; anything above it is reassigned so the
/// generator always has room to count up
const MAX_KEPT_ID: u64 = i64::MAX as u64;

/// Hands out strictly increasing field ids
///
/// Seeded from the wall clock in milliseconds, and never goes backwards, so
/// an id is not reused even after its field is deleted.
#[derive(Debug, Clone, Default)]
struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    fn next(&mut self) -> FieldId {
        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
        self.last = now.max(self.last.saturating_add(1));
        FieldId(self.last)
    }

    /// Ids above [`MAX_KEPT_ID`] are not accepted and leave the generator alone
    fn observe(&mut self, id: FieldId) -> bool {
        if id.0 > MAX_KEPT_ID {
            return false;
        }
        self.last = self.last.max(id.0);
        true
    }
}

/// Ordered fields, the current selection, and the surface they live on
#[derive(Debug, Clone)]
pub struct FieldModel {
    fields: Arc<[Field]>,
    selection: Option<FieldId>,
    surface: Surface,
    ids: IdGenerator,
}

impl Default for FieldModel {
    fn default() -> Self {
        Self::new(Surface::default())
    }
}

impl FieldModel {
    pub fn new(surface: Surface) -> Self {
        Self {
            fields: Arc::from(Vec::new()),
            selection: None,
            surface,
            ids: IdGenerator::default(),
        }
    }

    /// Current collection snapshot
    pub fn fields(&self) -> Arc<[Field]> {
        Arc::clone(&self.fields)
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    /// Add a field with default placement and return its id
    pub fn add_field(&mut self, kind: FieldKind) -> FieldId {
        let id = self.ids.next();
        let mut field = Field::new(id, kind);
        field.size = self.surface.clamp_size(field.size);

        let mut next = self.fields.to_vec();
        next.push(field);
        self.fields = next.into();

        debug!("added {} field {}", kind, id);
        id
    }

    /// Merge `patch` over the field with `id`; unknown ids are ignored
    ///
    /// Returns whether the collection changed.
    pub fn update_field(&mut self, id: FieldId, patch: FieldPatch) -> bool {
        let surface = self.surface;
        self.modify(id, |field| {
            patch.apply(field);
            field.size = surface.clamp_size(field.size);
        })
    }

    /// Delete a field, clearing the selection if it pointed at it
    pub fn remove_field(&mut self, id: FieldId) -> bool {
        if self.selection == Some(id) {
            self.selection = None;
        }

        let Some(index) = self.index_of(id) else {
            return false;
        };
        let mut next = self.fields.to_vec();
        next.remove(index);
        self.fields = next.into();

        debug!("removed field {}", id);
        true
    }

    /// Move a field, keeping its whole box on the surface
    pub fn move_field(&mut self, id: FieldId, top: f32, left: f32) -> bool {
        let surface = self.surface;
        self.modify(id, |field| {
            field.position = surface.clamp_position(Position { top, left }, field.size);
        })
    }

    /// Resize a field, clamped to `[0, surface]` on each axis
    pub fn resize_field(&mut self, id: FieldId, width: f32, height: f32) -> bool {
        self.update_field(id, FieldPatch::size(width, height))
    }

    /// Scale a field's current size by independent factors
    pub fn scale_field(&mut self, id: FieldId, scale_x: f32, scale_y: f32) -> bool {
        let Some(current) = self.field(id).map(|f| f.size) else {
            return false;
        };
        let scaled = Size::new(current.width * scale_x, current.height * scale_y);
        self.update_field(id, FieldPatch::size(scaled.width, scaled.height))
    }

    /// Replace a field's text
    pub fn set_text(&mut self, id: FieldId, text: impl Into<String>) -> bool {
        self.update_field(id, FieldPatch::content(text))
    }

    /// Attach image data (a `data:image/...;base64,` URI) to an image field
    ///
    /// The URI is not validated here; bad payloads are skipped when flattening.
    pub fn set_image(&mut self, id: FieldId, data_uri: impl Into<String>) -> bool {
        match self.field(id) {
            Some(field) if field.is_image() => self.update_field(id, FieldPatch::content(data_uri)),
            _ => false,
        }
    }

    /// Add `delta` to the font size, never going below [`MIN_FONT_SIZE`]
    pub fn set_font_size(&mut self, id: FieldId, delta: i32) -> bool {
        self.modify(id, |field| {
            let resized = field.font_size as i64 + delta as i64;
            field.font_size = resized.clamp(MIN_FONT_SIZE as i64, u32::MAX as i64) as u32;
        })
    }

    /// Append an assignee; empty or whitespace-only names are rejected
    pub fn add_assignee(&mut self, id: FieldId, name: &str) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        self.modify(id, |field| field.assignees.push(name.to_string()))
    }

    /// Remove every assignee exactly equal to `name`
    pub fn remove_assignee(&mut self, id: FieldId, name: &str) -> bool {
        self.modify(id, |field| field.assignees.retain(|a| a != name))
    }

    /// Replace the whole collection with a preset
    ///
    /// Drops the selection. Records without an id, repeating an id seen
    /// earlier in the preset, or with an id too large to count up from, get
    /// a fresh one.
    pub fn load_preset(&mut self, preset: Preset) {
        let kept: HashSet<FieldId> = preset
            .records
            .iter()
            .filter_map(|r| r.id)
            .filter(|&id| self.ids.observe(id))
            .collect();

        let mut seen = HashSet::new();
        let mut next = Vec::with_capacity(preset.len());
        for record in preset.records {
            let id = match record.id {
                Some(id) if kept.contains(&id) && seen.insert(id) => id,
                Some(id) => {
                    let fresh = self.ids.next();
                    warn!("preset field id {} is repeated or out of range, using {}", id, fresh);
                    seen.insert(fresh);
                    fresh
                }
                None => {
                    let fresh = self.ids.next();
                    seen.insert(fresh);
                    fresh
                }
            };
            let mut field = record.into_field(id);
            field.size = self.surface.clamp_size(field.size);
            next.push(field);
        }

        debug!("loaded preset with {} fields", next.len());
        self.fields = next.into();
        self.selection = None;
    }

    /// Select a field; unknown ids leave the selection alone
    pub fn select(&mut self, id: FieldId) -> bool {
        if self.index_of(id).is_none() {
            return false;
        }
        self.selection = Some(id);
        true
    }

    pub fn deselect(&mut self) {
        self.selection = None;
    }

    pub fn selected(&self) -> Option<FieldId> {
        self.selection
    }

    pub fn selected_field(&self) -> Option<&Field> {
        self.selection.and_then(|id| self.field(id))
    }

    pub fn grow_selected_font(&mut self) -> bool {
        self.on_selection(|model, id| model.set_font_size(id, FONT_SIZE_STEP))
    }

    pub fn shrink_selected_font(&mut self) -> bool {
        self.on_selection(|model, id| model.set_font_size(id, -FONT_SIZE_STEP))
    }

    pub fn delete_selected(&mut self) -> bool {
        self.on_selection(|model, id| model.remove_field(id))
    }

    pub fn edit_selected_text(&mut self, text: &str) -> bool {
        self.on_selection(|model, id| model.set_text(id, text))
    }

    pub fn assign_selected(&mut self, name: &str) -> bool {
        self.on_selection(|model, id| model.add_assignee(id, name))
    }

    pub fn unassign_selected(&mut self, name: &str) -> bool {
        self.on_selection(|model, id| model.remove_assignee(id, name))
    }

    /// Run a selection-driven action; a no-op with nothing selected
    fn on_selection<F>(&mut self, action: F) -> bool
    where
        F: FnOnce(&mut Self, FieldId) -> bool,
    {
        match self.selection {
            Some(id) => action(self, id),
            None => false,
        }
    }

    fn index_of(&self, id: FieldId) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }

    /// Copy-on-write edit of one field
    fn modify<F>(&mut self, id: FieldId, edit: F) -> bool
    where
        F: FnOnce(&mut Field),
    {
        let Some(index) = self.index_of(id) else {
            return false;
        };

        let mut updated = self.fields[index].clone();
        edit(&mut updated);
        if updated == self.fields[index] {
            return false;
        }

        let mut next = self.fields.to_vec();
        next[index] = updated;
        self.fields = next.into();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::DEFAULT_SIZE;
    use crate::preset::FieldRecord;

    fn model_with_text() -> (FieldModel, FieldId) {
        let mut model = FieldModel::default();
        let id = model.add_field(FieldKind::Text);
        (model, id)
    }

    #[test]
    fn test_add_assigns_unique_increasing_ids() {
        let mut model = FieldModel::default();
        let a = model.add_field(FieldKind::Text);
        let b = model.add_field(FieldKind::Image);
        let c = model.add_field(FieldKind::Text);
        assert!(a < b && b < c);
        assert_eq!(model.len(), 3);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let mut model = FieldModel::default();
        let a = model.add_field(FieldKind::Text);
        model.remove_field(a);
        let b = model.add_field(FieldKind::Text);
        assert_ne!(a, b);
    }

    #[test]
    fn test_update_merges_patch() {
        let (mut model, id) = model_with_text();
        model.update_field(id, FieldPatch::content("Hello"));
        model.update_field(id, FieldPatch::position(10.0, 20.0));

        let field = model.field(id).unwrap();
        assert_eq!(field.content.as_deref(), Some("Hello"));
        assert_eq!(field.position, Position { top: 10.0, left: 20.0 });
        assert_eq!(field.size, DEFAULT_SIZE);
        assert_eq!(field.font_size, 16);
    }

    #[test]
    fn test_update_replaces_collection() {
        let (mut model, id) = model_with_text();
        let before = model.fields();
        assert!(model.update_field(id, FieldPatch::content("x")));
        assert!(!Arc::ptr_eq(&before, &model.fields()));
        assert_eq!(before[0].content.as_deref(), Some(""));
    }

    #[test]
    fn test_update_unknown_id_keeps_collection() {
        let (mut model, _) = model_with_text();
        let before = model.fields();
        assert!(!model.update_field(FieldId(1), FieldPatch::content("x")));
        assert!(Arc::ptr_eq(&before, &model.fields()));
    }

    #[test]
    fn test_update_clamps_size_to_surface() {
        let mut model = FieldModel::new(Surface::new(300.0, 400.0));
        let id = model.add_field(FieldKind::Image);
        model.update_field(id, FieldPatch::size(1000.0, -4.0));
        assert_eq!(model.field(id).unwrap().size, Size::new(300.0, 0.0));
    }

    #[test]
    fn test_remove_clears_selection() {
        let (mut model, id) = model_with_text();
        model.select(id);
        assert!(model.remove_field(id));
        assert!(model.field(id).is_none());
        assert_eq!(model.selected(), None);
    }

    #[test]
    fn test_remove_other_keeps_selection() {
        let (mut model, id) = model_with_text();
        let other = model.add_field(FieldKind::Image);
        model.select(id);
        model.remove_field(other);
        assert_eq!(model.selected(), Some(id));
    }

    #[test]
    fn test_font_size_floor() {
        let (mut model, id) = model_with_text();
        for _ in 0..20 {
            model.set_font_size(id, -FONT_SIZE_STEP);
        }
        assert_eq!(model.field(id).unwrap().font_size, MIN_FONT_SIZE);
        model.set_font_size(id, FONT_SIZE_STEP);
        assert_eq!(model.field(id).unwrap().font_size, MIN_FONT_SIZE + 2);
    }

    #[test]
    fn test_assignees() {
        let (mut model, id) = model_with_text();
        assert!(model.add_assignee(id, "alice"));
        assert!(model.add_assignee(id, "bob"));
        assert!(model.add_assignee(id, "alice"));
        assert!(!model.add_assignee(id, "   "));
        assert!(!model.add_assignee(id, ""));
        assert_eq!(model.field(id).unwrap().assignees, vec!["alice", "bob", "alice"]);

        assert!(model.remove_assignee(id, "alice"));
        assert_eq!(model.field(id).unwrap().assignees, vec!["bob"]);
        assert!(!model.remove_assignee(id, "Bob"));
    }

    #[test]
    fn test_move_keeps_box_on_surface() {
        let mut model = FieldModel::new(Surface::new(600.0, 800.0));
        let id = model.add_field(FieldKind::Text);
        model.move_field(id, 790.0, -20.0);
        assert_eq!(model.field(id).unwrap().position, Position { top: 700.0, left: 0.0 });
    }

    #[test]
    fn test_scale_field() {
        let mut model = FieldModel::new(Surface::new(600.0, 250.0));
        let id = model.add_field(FieldKind::Image);
        model.scale_field(id, 1.5, 3.0);
        assert_eq!(model.field(id).unwrap().size, Size::new(150.0, 250.0));
    }

    #[test]
    fn test_set_image_only_on_image_fields() {
        let mut model = FieldModel::default();
        let text = model.add_field(FieldKind::Text);
        let image = model.add_field(FieldKind::Image);
        assert!(!model.set_image(text, "data:image/png;base64,AAAA"));
        assert!(model.set_image(image, "data:image/png;base64,AAAA"));
    }

    #[test]
    fn test_selection_actions_without_selection_are_noops() {
        let (mut model, _) = model_with_text();
        let before = model.fields();
        assert!(!model.grow_selected_font());
        assert!(!model.shrink_selected_font());
        assert!(!model.edit_selected_text("x"));
        assert!(!model.assign_selected("alice"));
        assert!(!model.unassign_selected("alice"));
        assert!(!model.delete_selected());
        assert!(Arc::ptr_eq(&before, &model.fields()));
    }

    #[test]
    fn test_selection_actions() {
        let (mut model, id) = model_with_text();
        assert!(model.select(id));
        model.grow_selected_font();
        model.edit_selected_text("Signed");
        model.assign_selected("alice");

        let field = model.selected_field().unwrap();
        assert_eq!(field.font_size, 18);
        assert_eq!(field.content.as_deref(), Some("Signed"));
        assert_eq!(field.assignees, vec!["alice"]);

        assert!(model.delete_selected());
        assert!(model.is_empty());
        assert_eq!(model.selected(), None);
    }

    #[test]
    fn test_select_unknown_id() {
        let mut model = FieldModel::default();
        assert!(!model.select(FieldId(3)));
        assert_eq!(model.selected(), None);
    }

    #[test]
    fn test_load_preset_replaces_everything() {
        let (mut model, id) = model_with_text();
        model.select(id);

        let mut record = FieldRecord::new(FieldKind::Image);
        record.id = Some(FieldId(5));
        model.load_preset(Preset::new(vec![record, FieldRecord::new(FieldKind::Text)]));

        assert_eq!(model.len(), 2);
        assert!(model.field(id).is_none());
        assert_eq!(model.selected(), None);
        assert!(model.field(FieldId(5)).is_some());
    }

    #[test]
    fn test_load_preset_reassigns_duplicate_ids() {
        let mut model = FieldModel::default();
        let mut a = FieldRecord::new(FieldKind::Text);
        a.id = Some(FieldId(1));
        let b = a.clone();
        model.load_preset(Preset::new(vec![a, b]));

        let fields = model.fields();
        assert_eq!(fields[0].id, FieldId(1));
        assert_ne!(fields[1].id, FieldId(1));
    }

    #[test]
    fn test_new_ids_follow_preset_ids() {
        let mut model = FieldModel::default();
        let mut record = FieldRecord::new(FieldKind::Text);
        record.id = Some(FieldId(u64::MAX / 2));
        model.load_preset(Preset::new(vec![record]));

        let id = model.add_field(FieldKind::Text);
        assert!(id > FieldId(u64::MAX / 2));
    }

    #[test]
    fn test_max_preset_id_is_reassigned() {
        let mut model = FieldModel::default();
        let preset = Preset::from_json(r#"[{"id": 18446744073709551615, "type": "text"}]"#).unwrap();
        model.load_preset(preset);

        let loaded = model.fields()[0].id;
        assert_ne!(loaded, FieldId(u64::MAX));

        let a = model.add_field(FieldKind::Text);
        let b = model.add_field(FieldKind::Text);
        assert!(loaded < a && a < b);
    }
}
