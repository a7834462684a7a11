//! PDF side: source documents, flattening, output

pub mod flatten;
pub mod image;
pub mod metadata;
pub mod output;
pub mod page;
pub mod source;
pub mod text;

// Re-export commonly used items
pub use flatten::{flatten, FlattenOptions, Flattened, Skipped};
pub use image::{image_data_uri, image_data_uri_from_path, SkipReason};
pub use metadata::{extract_metadata, PdfMetadata};
pub use output::{save_flattened, OUTPUT_FILENAME, OUTPUT_MEDIA_TYPE};
pub use page::page_dimensions;
pub use source::{target_page, SourceDocument};
