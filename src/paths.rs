// src/paths.rs
//! Lexical path helpers: never touch the filesystem

use std::path::{Path, PathBuf};

/// Why a relative path was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathIssue {
    Absolute,
    ParentTraversal,
    Empty,
}

/// Normalise a user- or config-supplied path that must stay below a root.
///
/// `.` segments, duplicate and trailing separators are dropped. Both `/` and
/// `\` count as separators so `..\secret` cannot slip through.
pub fn normalize_relative(raw: &str) -> Result<PathBuf, PathIssue> {
    if raw.starts_with('/') || raw.starts_with('\\') || Path::new(raw).has_root() {
        return Err(PathIssue::Absolute);
    }

    let mut out = PathBuf::new();
    for segment in raw.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => return Err(PathIssue::ParentTraversal),
            s => out.push(s),
        }
    }

    if out.as_os_str().is_empty() {
        return Err(PathIssue::Empty);
    }
    Ok(out)
}

/// True if the path contains glob metacharacters
pub fn has_wildcards(path: &Path) -> bool {
    path.to_string_lossy().contains(['*', '?', '['])
}

/// Last path component as a string, or `fallback` for roots
pub fn base_name(path: &Path, fallback: &str) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| fallback.to_string())
}

/// Forward-slash rendering of a relative path (rsync filter syntax)
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Expand a leading `~` to the user's home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
