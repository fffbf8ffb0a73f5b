// src/filters.rs
//! Exclude patterns applied while walking local trees
//!
//! Follows rsync's reading of a pattern so that encrypted and plain plans
//! skip the same files. A leading `/` anchors to the walk root. Any other
//! pattern matches the trailing components of the relative path, so a bare
//! name matches at any depth and `build/out` also matches `x/build/out`. A
//! trailing `/` restricts the pattern to directories.

use std::path::{Component, Path};

use glob::{MatchOptions, Pattern};

use crate::error::{Result, SyncError};
use crate::paths::to_slash;

#[derive(Debug, Clone)]
struct Rule {
    pattern: Pattern,
    anchored: bool,
    dir_only: bool,
}

impl Rule {
    fn matches(&self, relative: &Path, is_dir: bool) -> bool {
        if self.dir_only && !is_dir {
            return false;
        }
        if self.anchored {
            return self.pattern.matches_with(&to_slash(relative), MATCH);
        }
        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        (0..parts.len()).any(|start| self.pattern.matches_with(&parts[start..].join("/"), MATCH))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    rules: Vec<Rule>,
}

const MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

impl ExcludeSet {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut rules = Vec::with_capacity(patterns.len());
        for raw in patterns {
            let trimmed = raw.trim();
            let dir_only = trimmed.ends_with('/');
            let trimmed = trimmed.trim_end_matches('/');
            let (body, anchored) = match trimmed.strip_prefix('/') {
                Some(rest) => (rest, true),
                None => (trimmed, false),
            };
            if body.is_empty() {
                continue;
            }
            let pattern = Pattern::new(body).map_err(|e| {
                SyncError::Config(format!("invalid exclude pattern \"{raw}\": {e}"))
            })?;
            rules.push(Rule {
                pattern,
                anchored,
                dir_only,
            });
        }
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// `relative` is relative to the walk root
    pub fn is_excluded(&self, relative: &Path, is_dir: bool) -> bool {
        self.rules.iter().any(|rule| rule.matches(relative, is_dir))
    }
}

/// Excludes that still apply when `subfolder` of an entry is synced on its
/// own: unanchored patterns carry over, anchored ones below `subfolder` are
/// rebased onto it and the rest are dropped.
pub fn rebase_excludes(patterns: &[String], subfolder: &Path) -> Vec<String> {
    let prefix = to_slash(subfolder);
    let prefix = prefix.trim_matches('/');
    patterns
        .iter()
        .filter_map(|raw| {
            let trimmed = raw.trim();
            let Some(anchored) = trimmed.strip_prefix('/') else {
                return Some(trimmed.to_string());
            };
            let rest = anchored.strip_prefix(prefix)?.strip_prefix('/')?;
            (!rest.trim_end_matches('/').is_empty()).then(|| format!("/{rest}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(patterns: &[&str]) -> ExcludeSet {
        let owned: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        ExcludeSet::new(&owned).unwrap()
    }

    fn owned(patterns: &[&str]) -> Vec<String> {
        patterns.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn name_patterns_match_at_any_depth() {
        let s = set(&["*.tmp", "node_modules/"]);
        assert!(s.is_excluded(Path::new("a.tmp"), false));
        assert!(s.is_excluded(Path::new("deep/down/b.tmp"), false));
        assert!(s.is_excluded(Path::new("web/node_modules"), true));
        assert!(!s.is_excluded(Path::new("web/src/main.rs"), false));
    }

    #[test]
    fn leading_slash_anchors_and_other_paths_float() {
        let s = set(&["/private", "build/out"]);
        assert!(s.is_excluded(Path::new("private"), true));
        assert!(!s.is_excluded(Path::new("notes/private"), true));
        assert!(s.is_excluded(Path::new("build/out"), true));
        assert!(s.is_excluded(Path::new("x/build/out"), true));
        assert!(!s.is_excluded(Path::new("build/out2"), true));
        assert!(!s.is_excluded(Path::new("xbuild/out"), true));
    }

    #[test]
    fn trailing_slash_only_excludes_directories() {
        let s = set(&["node_modules/", "/cache/"]);
        assert!(s.is_excluded(Path::new("web/node_modules"), true));
        assert!(!s.is_excluded(Path::new("web/node_modules"), false));
        assert!(s.is_excluded(Path::new("cache"), true));
        assert!(!s.is_excluded(Path::new("cache"), false));
    }

    #[test]
    fn rebasing_keeps_floating_patterns_and_moves_anchored_ones() {
        let patterns = owned(&["*.tmp", "cache/old", "/private/raw", "/private/", "/other"]);
        assert_eq!(
            rebase_excludes(&patterns, Path::new("private")),
            owned(&["*.tmp", "cache/old", "/raw"])
        );
        assert_eq!(
            rebase_excludes(&owned(&["/a/b/c/"]), Path::new("a/b")),
            owned(&["/c/"])
        );
        assert!(rebase_excludes(&owned(&["/privateer/x"]), Path::new("private")).is_empty());
    }

    #[test]
    fn bad_pattern_is_a_config_error() {
        let err = ExcludeSet::new(&["[".to_string()]).unwrap_err();
        assert!(err.is_configuration());
    }
}
