use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{IndexError, IndexResult};

/// Replace `path` with `contents` in one step.
///
/// The data goes to a temp file in the destination directory, is synced, and
/// is then renamed over the target, so readers see either the old file or
/// the new one. Missing parent directories are created.
pub fn write_atomic(path: &Path, contents: &[u8]) -> IndexResult<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| IndexError::InvalidPath(format!("no parent directory for {}", path.display())))?;
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}
