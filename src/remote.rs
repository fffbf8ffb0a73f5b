// src/remote.rs
//! SSH-reachable locations and the paths the transfer primitive sees

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::defaults::default_ssh_port;
use crate::consts::SSH_BIN;

/// SSH connection details of a non-local location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteHost {
    pub username: String,
    pub hostname: String,
    #[serde(default = "default_ssh_port")]
    pub port: u16,
}

impl RemoteHost {
    /// `user@host`
    pub fn login(&self) -> String {
        format!("{}@{}", self.username, self.hostname)
    }

    /// Remote shell command handed to `rsync -e`
    pub fn ssh_command(&self) -> String {
        format!("{SSH_BIN} -p {}", self.port)
    }
}

/// A path on a location, local or behind SSH
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LocationPath {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteHost>,
}

impl LocationPath {
    pub fn new(path: impl Into<PathBuf>, remote: Option<RemoteHost>) -> Self {
        Self {
            path: path.into(),
            remote,
        }
    }

    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::new(path, None)
    }

    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Same host, different path
    pub fn join(&self, relative: impl AsRef<Path>) -> Self {
        Self::new(self.path.join(relative), self.remote.clone())
    }

    /// Argument form understood by rsync (`user@host:/path` or `/path`)
    pub fn to_rsync_arg(&self, trailing_slash: bool) -> String {
        let mut raw = self.path.to_string_lossy().into_owned();
        if trailing_slash && !raw.ends_with('/') {
            raw.push('/');
        }
        match &self.remote {
            Some(remote) => format!("{}:{raw}", remote.login()),
            None => raw,
        }
    }
}

impl fmt::Display for LocationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rsync_arg(false))
    }
}

/// Quote a string for a POSIX shell
pub fn shell_quote(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', r"'\''"))
}
