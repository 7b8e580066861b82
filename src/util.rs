//! Utility functions for vault path handling, hashing and dates

use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use sha2::{Digest, Sha256};

use crate::constants as C;

/// Validate and resolve a vault path, ensuring it stays within the vault directory
/// Returns an error if the path attempts to escape the base directory
pub fn secure_path(base: &Path, relative: &str) -> io::Result<PathBuf> {
    let mut result = base.to_path_buf();

    for component in relative.split(|c| c == '/' || c == '\\') {
        match component {
            "" | "." => continue,
            ".." => {
                if result == base {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "Path traversal detected: cannot escape vault directory",
                    ));
                }
                result.pop();
            }
            _ => {
                // Windows drive prefixes
                if component.len() >= 2 && component.as_bytes()[1] == b':' {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "Absolute paths are not allowed",
                    ));
                }
                result.push(component);
            }
        }
    }

    // Use dunce::canonicalize to avoid UNC prefix on Windows
    if base.exists() && result.exists() {
        let canonical_base = dunce::canonicalize(base).unwrap_or_else(|_| base.to_path_buf());
        let canonical_result = dunce::canonicalize(&result).unwrap_or_else(|_| result.clone());
        if !canonical_result.starts_with(&canonical_base) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Path traversal detected: resolved path escapes vault directory",
            ));
        }
    } else if !result.starts_with(base) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "Path traversal detected: resolved path escapes vault directory",
        ));
    }

    Ok(result)
}

/// Normalize a user-supplied vault path: forward slashes, no leading/trailing separators
pub fn normalize_vault_path(path: &str) -> String {
    path.replace('\\', "/")
        .split(C::VAULT_SEPARATOR)
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Join a folder path and a child name into a vault path
pub fn join_vault_path(folder: &str, name: &str) -> String {
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder, name)
    }
}

/// Whether `path` equals `ancestor` or lies below it
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if ancestor.is_empty() {
        return true;
    }
    path == ancestor
        || (path.starts_with(ancestor) && path.as_bytes().get(ancestor.len()) == Some(&b'/'))
}

/// Re-key `path` from under `old` to under `new`; None when `path` is not within `old`
pub fn rebase_path(path: &str, old: &str, new: &str) -> Option<String> {
    if path == old {
        return Some(new.to_string());
    }
    if is_within(path, old) && !old.is_empty() {
        return Some(format!("{}{}", new, &path[old.len()..]));
    }
    None
}

/// Display title for a file or folder name: everything before the first dot
pub fn title_of(name: &str) -> String {
    name.split('.').next().unwrap_or(name).to_string()
}

/// Expand a leading `~` to the user's home directory
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest.trim_start_matches(|c| c == '/' || c == '\\'));
        }
    }
    PathBuf::from(path)
}

/// Hash file content using SHA256
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Current calendar date, allowing override via WRITING_GOALS_TODAY for testing
pub fn today() -> NaiveDate {
    if let Ok(value) = std::env::var(C::ENV_TODAY) {
        if let Ok(date) = NaiveDate::parse_from_str(value.trim(), C::DATE_FORMAT) {
            return date;
        }
    }
    Local::now().date_naive()
}

/// Serialize `value` as pretty JSON and replace `path` with it in one step
///
/// The content goes to a sibling temporary file first and is renamed over the
/// target, so a failed write leaves the previous file intact.
pub fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> crate::Result<()> {
    let persist = |source: io::Error| crate::GoalError::Persist {
        path: path.to_path_buf(),
        source,
    };

    let content = serde_json::to_string_pretty(value)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(persist)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, content).map_err(persist)?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        persist(e)
    })
}

/// Display a path with forward slashes (cross-platform standard)
pub fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
