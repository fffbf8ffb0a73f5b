// src/endpoint.rs
//! Endpoint tokens: `location` or `location:relative/path`
//!
//! Resolution is purely lexical. A relative path is checked for absolute
//! roots and parent traversal before anything touches the filesystem.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{Config, Location};
use crate::consts::CIPHERTEXT_ENDING;
use crate::error::{Result, SyncError};
use crate::paths::{normalize_relative, PathIssue};

/// A resolved source or destination of a run
#[derive(Debug, Clone)]
pub struct EndpointSpec<'a> {
    pub location: &'a Location,
    /// Present in pick mode
    pub relative_path: Option<PathBuf>,
    /// The picked path carries the ciphertext marker. Advisory only.
    pub already_encrypted: bool,
}

impl EndpointSpec<'_> {
    pub fn is_pick(&self) -> bool {
        self.relative_path.is_some()
    }
}

/// Split a token at the first `:` into location name and optional path
pub fn split_token(token: &str) -> (&str, Option<&str>) {
    match token.split_once(':') {
        Some((name, path)) if !path.is_empty() => (name, Some(path)),
        Some((name, _)) => (name, None),
        None => (token, None),
    }
}

pub fn resolve_endpoint<'a>(token: &str, config: &'a Config) -> Result<EndpointSpec<'a>> {
    let (name, raw_path) = split_token(token.trim());
    let location = config.location(name)?;

    let relative_path = match raw_path {
        None => None,
        Some(raw) => Some(normalize_relative(raw).map_err(|issue| match issue {
            PathIssue::Absolute | PathIssue::ParentTraversal => SyncError::PathEscape {
                location: name.to_string(),
                path: raw.to_string(),
            },
            PathIssue::Empty => SyncError::Config(format!(
                "\"{token}\": a picked path must name something below the location root"
            )),
        })?),
    };

    let already_encrypted = relative_path
        .as_deref()
        .is_some_and(has_ciphertext_marker);

    if let Some(path) = &relative_path {
        debug!(
            "Pick mode enabled for location \"{name}\": {} (already encrypted: {already_encrypted})",
            path.display()
        );
    }

    Ok(EndpointSpec {
        location,
        relative_path,
        already_encrypted,
    })
}

pub fn has_ciphertext_marker(path: &Path) -> bool {
    path.file_name()
        .map(|n| {
            n.to_string_lossy()
                .to_ascii_lowercase()
                .ends_with(CIPHERTEXT_ENDING)
        })
        .unwrap_or(false)
}
