use std::ffi::OsStr;
use std::path::Path;
use std::time::SystemTime;

use romtrim_format::ROM_EXTENSIONS;

use crate::error::{Error, Result};

/// Lowercased extension of `path`, without the dot.
pub fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|s| s.to_ascii_lowercase())
}

pub fn is_zip(path: &Path) -> bool {
    matches!(extension(path).as_deref(), Some("zip"))
}

pub fn is_rom(path: &Path) -> bool {
    match extension(path) {
        Some(ext) => ROM_EXTENSIONS.contains(&ext.as_str()),
        None => false,
    }
}

/// Whether the walker should hand this path to the trimmer: a ROM image or
/// a zip container.
pub fn is_candidate(path: &Path) -> bool {
    is_rom(path) || is_zip(path)
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(OsStr::to_str)
        .unwrap_or_default()
        .to_string()
}

pub fn modified_time(path: &Path) -> Result<SystemTime> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|source| Error::ReadMetadata {
            path: path.to_path_buf(),
            source,
        })
}
