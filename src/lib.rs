//! PDF Fields Library
//!
//! Place text and image fields over a PDF page and flatten them into a
//! finished document. This library provides:
//! - A field model with copy-on-write updates and a selection
//! - Presets: JSON field lists and a built-in signing template
//! - Screen-space to PDF-space coordinate conversion
//! - Flattening fields onto the first page of a source PDF
//! - A JSON dump of the field list for debugging
//!
//! # Example
//!
//! ```no_run
//! use pdf_fields::{FieldKind, FieldModel};
//! use pdf_fields::pdf::{flatten, save_flattened, FlattenOptions, SourceDocument};
//! use std::path::Path;
//!
//! let mut model = FieldModel::default();
//! let id = model.add_field(FieldKind::Text);
//! model.set_text(id, "Signed by me");
//!
//! let source = SourceDocument::from_path(Path::new("contract.pdf")).expect("source PDF");
//! let flattened = flatten(&model.fields(), &source, &FlattenOptions::default())
//!     .expect("Failed to flatten");
//! save_flattened(&flattened.bytes, Path::new(".")).expect("Failed to save");
//! ```

pub mod diagnostics;
pub mod error;
pub mod field;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod preset;

// Re-export commonly used items
pub use error::{Error, Result};
pub use field::{Field, FieldId, FieldKind, FieldPatch, Position, Size};
pub use layout::{PageDimensions, Surface};
pub use model::FieldModel;
pub use preset::{FieldRecord, Preset};
