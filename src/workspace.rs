// src/workspace.rs
//! Per-plan scratch directories under the configured `tmp_dir`
//!
//! A workspace holds plaintext or ciphertext staging copies for exactly one
//! plan. It is removed on every exit path: explicit [`Workspace::release`]
//! on success, `Drop` on error or cancellation.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{Builder, TempDir};
use tracing::{debug, warn};

use crate::error::{Result, SyncError};

pub const OUTBOX: &str = "outbox";
pub const INBOX: &str = "inbox";
pub const PLAIN: &str = "plain";
pub const SCRATCH: &str = "scratch";

#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    root: PathBuf,
}

impl Workspace {
    pub fn acquire(tmp_root: &Path, label: &str) -> Result<Self> {
        fs::create_dir_all(tmp_root).map_err(|e| unusable(tmp_root, e))?;
        let dir = Builder::new()
            .prefix(label)
            .tempdir_in(tmp_root)
            .map_err(|e| unusable(tmp_root, e))?;
        let root = dir.path().to_path_buf();
        for sub in [OUTBOX, INBOX, PLAIN, SCRATCH] {
            fs::create_dir(root.join(sub))?;
        }
        debug!("Acquired workspace {}", root.display());
        Ok(Self {
            dir: Some(dir),
            root,
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn outbox(&self) -> PathBuf {
        self.root.join(OUTBOX)
    }

    pub fn inbox(&self) -> PathBuf {
        self.root.join(INBOX)
    }

    pub fn plain(&self) -> PathBuf {
        self.root.join(PLAIN)
    }

    pub fn scratch(&self) -> PathBuf {
        self.root.join(SCRATCH)
    }

    /// Remove the workspace now. A failure is logged, never raised.
    pub fn release(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if let Some(dir) = self.dir.take() {
            match dir.close() {
                Ok(()) => debug!("Removed workspace {}", self.root.display()),
                Err(e) => warn!(
                    "Could not remove workspace {}: {e}. Remove it manually.",
                    self.root.display()
                ),
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.close();
    }
}

fn unusable(tmp_root: &Path, err: std::io::Error) -> SyncError {
    SyncError::Config(format!(
        "tmp_dir \"{}\" is not usable: {err}",
        tmp_root.display()
    ))
}

/// Make sure `tmp_root` accepts a workspace before any plan runs.
pub fn probe(tmp_root: &Path) -> Result<()> {
    Workspace::acquire(tmp_root, "probe-")?.release();
    Ok(())
}
