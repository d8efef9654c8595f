//! Crash-safe file replacement for state shared between processes.

use crate::core::error::{Error, Result};
use std::io::Write;
use std::path::Path;

/// Writes `data` to a temp file next to `path`, then renames it over `path`.
///
/// Readers in other processes see either the old or the new content, never a
/// partial write.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)
        .map_err(|e| Error::io(format!("create {}", parent.display()), e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .map_err(|e| Error::io(format!("create temp file in {}", parent.display()), e))?;
    tmp.write_all(data)
        .and_then(|()| tmp.flush())
        .map_err(|e| Error::io(format!("write temp file for {}", path.display()), e))?;
    tmp.persist(path)
        .map_err(|e| Error::io(format!("replace {}", path.display()), e.error))?;

    Ok(())
}
