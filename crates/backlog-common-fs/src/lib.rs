//! File system utilities for instant-backlog.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use backlog_common_core::{Error, Result};

pub mod path;

/// Extension of backlog documents.
pub const MARKDOWN_EXTENSION: &str = "md";

/// Does this path name a markdown document?
///
/// The check is case-sensitive: `notes.MD` is not a backlog document.
pub fn is_markdown(path: impl AsRef<Path>) -> bool {
    path.as_ref().extension().and_then(|e| e.to_str()) == Some(MARKDOWN_EXTENSION)
}

/// List the markdown files directly inside `dir` in scan order.
///
/// Scan order sorts by the leading numeric prefix of the filename, then by
/// the full name. Names without a numeric prefix come last. Directories are
/// skipped and the listing is not recursive.
pub fn list_markdown_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let read_dir = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut files = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        if path.is_file() && is_markdown(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| scan_key(a).cmp(&scan_key(b)));
    Ok(files)
}

fn scan_key(path: &Path) -> (bool, u64, String) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let digits: String = name.chars().take_while(|c| c.is_ascii_digit()).collect();
    match digits.parse::<u64>() {
        Ok(n) => (false, n, name),
        Err(_) => (true, 0, name),
    }
}

/// Write to a file atomically (write to temp, then rename).
///
/// The temporary file is a hidden sibling ending in `.tmp`, so directory
/// watchers filtering on `.md` never see it.
pub fn write_atomic(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or(Path::new("."));

    ensure_dir(parent)?;

    let mut temp_path = path.to_path_buf();
    if let Some(name) = path.file_name() {
        temp_path.set_file_name(format!(".{}.tmp", name.to_string_lossy()));
    } else {
        temp_path.push(".tmp");
    }

    {
        let mut file = File::create(&temp_path).map_err(|e| Error::io(&temp_path, e))?;
        file.write_all(contents)
            .map_err(|e| Error::io(&temp_path, e))?;
        file.sync_all().map_err(|e| Error::io(&temp_path, e))?;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::io(path, e)
    })
}

/// Write string to file atomically.
pub fn write_string_atomic(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    write_atomic(path, contents.as_bytes())
}

/// Ensure a directory exists.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
    }
    Ok(())
}

/// Delete a file if it exists. Returns whether something was removed.
pub fn remove_file_if_exists(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Rename a file.
pub fn rename(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
    let from = from.as_ref();
    fs::rename(from, to.as_ref()).map_err(|e| Error::io(from, e))
}

/// Read a whole file as UTF-8.
pub fn read_to_string(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Name of the final path component as a string.
pub fn file_name(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
