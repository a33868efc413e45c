//! Filesystem helpers for library sources.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::LoadError;
use crate::base::constants::SUPPORTED_EXTENSIONS;

/// Extension of `path`, if it has one.
pub fn get_extension(path: &Path) -> Result<&str, LoadError> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| LoadError::NoExtension(path.to_path_buf()))
}

/// Check that `path` carries one of the extensions in `allowed`.
pub fn validate_extension(path: &Path, allowed: &[&str]) -> Result<(), LoadError> {
    let ext = get_extension(path)?;
    if allowed.contains(&ext) {
        Ok(())
    } else {
        Err(LoadError::UnsupportedExtension(path.to_path_buf()))
    }
}

/// Read a source file into memory.
pub fn load_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Recursively collect every file under `dir` with a supported extension, sorted.
pub fn collect_file_paths(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    collect_file_paths_with(dir, SUPPORTED_EXTENSIONS)
}

/// Like [`collect_file_paths`] with an explicit extension list.
pub fn collect_file_paths_with(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| LoadError::Walk {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && validate_extension(path, extensions).is_ok() {
            paths.push(path.to_path_buf());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Best-effort `file://` URI for a path; falls back to the display form.
pub fn path_to_uri(path: &Path) -> String {
    url::Url::from_file_path(path)
        .map(|u| u.to_string())
        .unwrap_or_else(|()| path.display().to_string())
}
