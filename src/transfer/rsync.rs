// src/transfer/rsync.rs
//! [`Transfer`] backed by the `rsync` binary

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, info};

use crate::consts::{RSYNC_BASE_ARGS, RSYNC_BIN};
use crate::enums::TransferScope;
use crate::error::{Result, SyncError};
use crate::remote::shell_quote;
use crate::transfer::{Transfer, TransferRequest};

#[derive(Debug, Clone)]
pub struct Rsync {
    binary: PathBuf,
}

impl Default for Rsync {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(RSYNC_BIN),
        }
    }
}

impl Rsync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

/// Command line (without the program name) for one request
pub fn rsync_args(request: &TransferRequest<'_>) -> Vec<String> {
    let mut args: Vec<String> = RSYNC_BASE_ARGS.iter().map(|a| a.to_string()).collect();

    for pattern in request.excludes {
        args.push("--exclude".into());
        args.push(pattern.clone());
    }
    if request.dry_run {
        args.push("--dry-run".into());
    }
    if request.delete_extraneous {
        args.push("--delete".into());
    }

    let remote = request
        .source
        .remote
        .as_ref()
        .or(request.destination.remote.as_ref());
    if let Some(host) = remote {
        args.push("-e".into());
        args.push(host.ssh_command());
    }

    // The remote side may not have the destination yet.
    if request.destination.is_remote() && !request.dry_run {
        let dir = request.destination.path.to_string_lossy();
        args.push(format!(
            "--rsync-path=mkdir -p {} && {RSYNC_BIN}",
            shell_quote(&dir)
        ));
    }

    let contents = request.scope == TransferScope::Contents;
    args.push(request.source.to_rsync_arg(contents));
    args.push(request.destination.to_rsync_arg(true));
    args
}

impl Transfer for Rsync {
    fn transfer(&self, request: &TransferRequest<'_>) -> Result<()> {
        if !request.destination.is_remote() && !request.dry_run {
            fs::create_dir_all(&request.destination.path)?;
        }

        let args = rsync_args(request);
        debug!("{} {}", self.binary.display(), args.join(" "));
        info!("Syncing {} -> {}", request.source, request.destination);

        let status = Command::new(&self.binary)
            .args(&args)
            .status()
            .map_err(|e| SyncError::external(RSYNC_BIN, format!("cannot start: {e}")))?;

        if !status.success() {
            return Err(SyncError::external(
                RSYNC_BIN,
                format!(
                    "{status} while syncing {} -> {}",
                    request.source, request.destination
                ),
            ));
        }
        Ok(())
    }
}
