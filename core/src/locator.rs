//! DICOM Locator (C1), grounded on `dcm_sort`/`dcm_file_sort_service`'s use of
//! `walkdir::WalkDir` for unconditional recursive directory traversal.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively enumerates regular files under `root` whose extension matches
/// `extension` case-insensitively. No DICOM magic-byte check is performed
/// here; `extract` decides whether a matched file actually parses. An empty
/// result is not itself an error; the caller treats it as fatal input.
///
/// # Arguments
///
/// * `root` - Directory to walk recursively.
/// * `extension` - Filename extension to match, with or without a leading dot,
///   compared case-insensitively.
///
/// # Returns
///
/// The matched file paths, in `walkdir`'s traversal order.
pub fn locate(root: &Path, extension: &str) -> Vec<PathBuf> {
    let extension = extension.trim_start_matches('.').to_lowercase();
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| matches_extension(entry.path(), &extension))
        .map(|entry| entry.into_path())
        .collect()
}

fn matches_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase() == extension)
        .unwrap_or(false)
}
