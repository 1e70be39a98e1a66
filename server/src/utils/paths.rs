//! Path helpers for user-supplied locations

use std::path::PathBuf;

/// Resolve a user-supplied path to an absolute one.
///
/// `~` and `~/...` expand to the home directory; relative paths are joined
/// onto the current directory without canonicalizing. Blank input resolves
/// to the current directory.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();
    let cwd = || std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    if path.is_empty() {
        return cwd();
    }

    let expanded = match path.strip_prefix('~') {
        Some("") => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => dirs::home_dir()
            .map(|home| home.join(&rest[1..]))
            .unwrap_or_else(|| PathBuf::from(path)),
        _ => PathBuf::from(path),
    };

    if expanded.is_relative() {
        cwd().join(expanded)
    } else {
        expanded
    }
}
