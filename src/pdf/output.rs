//! Writing the finished document

use std::io::Write;
use std::path::{Path, PathBuf};
use log::info;
use tempfile::NamedTempFile;
use crate::error::{Error, Result};

/// Name every flattened document is saved under
pub const OUTPUT_FILENAME: &str = "eSign.pdf";

/// Media type of the output
pub const OUTPUT_MEDIA_TYPE: &str = "application/pdf";

/// Save flattened bytes as [`OUTPUT_FILENAME`] inside `dir`
///
/// The bytes go to a temporary file in the same directory first and are
/// renamed into place, so a failed write never leaves a truncated PDF. The
/// temporary file is removed if anything fails.
pub fn save_flattened(bytes: &[u8], dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(Error::FileNotFound(dir.to_path_buf()));
    }

    let target = dir.join(OUTPUT_FILENAME);
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(bytes)?;
    staged.flush()?;
    staged.persist(&target).map_err(|e| Error::Io(e.error))?;

    info!("saved {} ({} bytes, {})", target.display(), bytes.len(), OUTPUT_MEDIA_TYPE);
    Ok(target)
}
