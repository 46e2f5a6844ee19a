//! Whole-file persistence for the worklog container

use crate::core::{Result, WorklogError};
use crate::model::{CONTAINER_VERSION, WorklogContainer};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::warn;

/// Reads and validates the container, `None` if the file is absent.
pub fn load_container(path: &Path) -> Result<Option<WorklogContainer>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(WorklogError::ReadFailure(format!(
                "{}: {}",
                path.display(),
                e
            )));
        }
    };

    let container: WorklogContainer = serde_json::from_slice(&bytes)
        .map_err(|e| WorklogError::ReadFailure(format!("{}: {}", path.display(), e)))?;

    if container.version != CONTAINER_VERSION {
        warn!(
            path = %path.display(),
            version = %container.version,
            "unexpected worklog container version"
        );
    }

    Ok(Some(container))
}

/// Serializes the container and swaps it in atomically.
pub fn save_container(path: &Path, container: &WorklogContainer) -> Result<()> {
    let json = serde_json::to_vec_pretty(container)
        .map_err(|e| WorklogError::WriteFailure(format!("serialize container: {}", e)))?;
    write_atomic(path, &json)
        .map_err(|e| WorklogError::WriteFailure(format!("{}: {}", path.display(), e)))
}

/// Writes to a temp file next to `path`, syncs it, then renames it over `path`.
///
/// Readers see either the previous or the new content, never a torn write.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.flush()?;
    fsync_file(temp.as_file())?;
    temp.persist(path).map_err(|e| e.error)?;

    fsync_dir(dir)
}

pub fn fsync_file(file: &File) -> io::Result<()> {
    file.sync_all()
}

/// Makes the rename durable. Only meaningful on unix.
#[cfg(unix)]
pub fn fsync_dir(dir: &Path) -> io::Result<()> {
    OpenOptions::new().read(true).open(dir)?.sync_all()
}

#[cfg(not(unix))]
pub fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
