//! Input resolution: turning a user-supplied location into an ordered
//! list of document sources, and opening each as a byte stream.
//!
//! A location is either an HTTP(S) URL (one source), a single file (one
//! source), or a directory (its immediate `.xml` files, sorted by name).
//! Directories are not descended recursively.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{SourceError, SourceResult};

/// Is the location an HTTP(S) URL rather than a filesystem path?
pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Resolve a location into an ordered list of document sources.
pub fn resolve(location: &str) -> SourceResult<Vec<String>> {
    if is_url(location) {
        return Ok(vec![location.to_string()]);
    }

    let path = Path::new(location);
    let metadata =
        std::fs::metadata(path).map_err(|e| SourceError::io(location, &e))?;
    if !metadata.is_dir() {
        return Ok(vec![location.to_string()]);
    }

    let entries = std::fs::read_dir(path).map_err(|e| SourceError::io(location, &e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SourceError::io(location, &e))?;
        let entry_path = entry.path();
        if entry_path.is_dir() {
            continue;
        }
        let is_xml = entry_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        if is_xml {
            files.push(entry_path.to_string_lossy().into_owned());
        }
    }

    files.sort();
    Ok(files)
}

/// Open a location as a byte stream.
pub fn open(location: &str) -> SourceResult<Box<dyn Read>> {
    if is_url(location) {
        let response = reqwest::blocking::get(location)
            .and_then(|r| r.error_for_status())
            .map_err(|e| SourceError::http(location, e))?;
        return Ok(Box::new(response));
    }

    let file = File::open(location).map_err(|e| SourceError::io(location, &e))?;
    Ok(Box::new(file))
}
