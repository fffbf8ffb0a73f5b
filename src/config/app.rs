// src/config/app.rs
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use super::defaults::default_search_paths;
use crate::consts::CONFIG_ENV_VAR;
use crate::enums::EncryptionMode;
use crate::error::{Result, SyncError};
use crate::paths::{expand_home, normalize_relative, PathIssue};
use crate::remote::{LocationPath, RemoteHost};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub locations: BTreeMap<String, Location>,
    #[serde(default, rename = "gpg")]
    pub encryption: Option<EncryptionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    /// Filled from the table key after parsing
    #[serde(skip)]
    pub name: String,
    pub root_dir: PathBuf,
    #[serde(default)]
    pub trusted: bool,
    #[serde(default)]
    pub dirs: Vec<DirectoryEntry>,
    #[serde(default, alias = "ssh")]
    pub remote: Option<RemoteHost>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default, alias = "exclude_folders")]
    pub exclude_patterns: Vec<String>,
    #[serde(default, alias = "sensitive_folders")]
    pub sensitive_subfolders: Vec<PathBuf>,
    #[serde(default)]
    pub encryption_mode: EncryptionMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EncryptionConfig {
    pub recipient: String,
    pub tmp_dir: PathBuf,
}

impl Location {
    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Path of `relative` below this location's root
    pub fn path_of(&self, relative: &Path) -> LocationPath {
        LocationPath::new(self.root_dir.join(relative), self.remote.clone())
    }
}

impl DirectoryEntry {
    /// Subfolders that count as sensitive. A fully sensitive entry overrides them.
    pub fn effective_subfolders(&self) -> &[PathBuf] {
        if self.sensitive {
            &[]
        } else {
            &self.sensitive_subfolders
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.finalize()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!("cannot read \"{}\": {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&content)?;
        debug!(
            "Configuration {} contains {} location(s).",
            path.display(),
            config.locations.len()
        );
        Ok(config)
    }

    pub fn location(&self, name: &str) -> Result<&Location> {
        self.locations
            .get(name)
            .ok_or_else(|| SyncError::UnknownLocation {
                name: name.to_string(),
                available: self.location_names(),
            })
    }

    pub fn location_names(&self) -> String {
        self.locations
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn finalize(&mut self) -> Result<()> {
        for (name, location) in self.locations.iter_mut() {
            if name.trim().is_empty() {
                return Err(SyncError::Config("location names must not be empty".into()));
            }
            location.name = name.clone();
            finalize_location(location)?;
        }

        if let Some(gpg) = self.encryption.as_mut() {
            if gpg.recipient.trim().is_empty() {
                return Err(SyncError::Config("gpg.recipient must not be empty".into()));
            }
            if gpg.tmp_dir.as_os_str().is_empty() {
                return Err(SyncError::Config("gpg.tmp_dir must not be empty".into()));
            }
            gpg.tmp_dir = expand_home(&gpg.tmp_dir);
        }
        Ok(())
    }
}

fn finalize_location(location: &mut Location) -> Result<()> {
    let name = location.name.clone();

    if let Some(remote) = &location.remote {
        if remote.username.trim().is_empty() {
            return Err(SyncError::Config(format!(
                "location \"{name}\": please provide an SSH username"
            )));
        }
        if remote.hostname.trim().is_empty() {
            return Err(SyncError::Config(format!(
                "location \"{name}\": please provide an SSH hostname"
            )));
        }
    } else {
        location.root_dir = expand_home(&location.root_dir);
    }

    if !location.root_dir.is_absolute() {
        return Err(SyncError::Config(format!(
            "location \"{name}\": root_dir \"{}\" must be absolute",
            location.root_dir.display()
        )));
    }

    for entry in location.dirs.iter_mut() {
        let raw = entry.path.to_string_lossy().into_owned();
        if raw.len() > 1 && raw.ends_with('/') {
            warn!("Removed trailing slash from path {raw} to avoid misinterpretations.");
        }
        entry.path = checked_relative(&name, &raw, "directory")?;

        let mut subfolders = Vec::with_capacity(entry.sensitive_subfolders.len());
        for sub in &entry.sensitive_subfolders {
            subfolders.push(checked_relative(
                &name,
                &sub.to_string_lossy(),
                "sensitive subfolder",
            )?);
        }
        entry.sensitive_subfolders = collapse_nested(subfolders);

        if entry.sensitive && !entry.sensitive_subfolders.is_empty() {
            debug!(
                "Sensitive subfolders of \"{}\" are ignored because the entire directory is marked sensitive.",
                entry.path.display()
            );
        }
    }
    Ok(())
}

fn checked_relative(location: &str, raw: &str, what: &str) -> Result<PathBuf> {
    normalize_relative(raw).map_err(|issue| {
        let reason = match issue {
            PathIssue::Absolute => "must be relative to root_dir",
            PathIssue::ParentTraversal => "must not contain '..'",
            PathIssue::Empty => "must name a path below root_dir",
        };
        SyncError::Config(format!(
            "location \"{location}\": {what} \"{raw}\" {reason}"
        ))
    })
}

/// Drop duplicates and subfolders already covered by an ancestor
fn collapse_nested(mut subfolders: Vec<PathBuf>) -> Vec<PathBuf> {
    subfolders.sort_by_key(|p| p.components().count());
    let mut kept: Vec<PathBuf> = Vec::new();
    for sub in subfolders {
        if kept.iter().any(|k| sub.starts_with(k)) {
            debug!("Sensitive subfolder {} is covered by an ancestor.", sub.display());
            continue;
        }
        kept.push(sub);
    }
    kept
}

/// Resolve the configuration file: explicit path, `$SYNCBUDDY_CONFIG`,
/// then the default search directories.
pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }

    let candidates = default_search_paths();
    candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .ok_or_else(|| {
            let searched = candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            SyncError::Config(format!("no configuration file found (searched: {searched})"))
        })
}

/// Locate and load the configuration in one step
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = locate(explicit)?;
    Config::load(&path)
}
