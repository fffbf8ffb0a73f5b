// src/preflight.rs
//! External tools a plan list depends on

use tracing::debug;

use crate::consts::{GPG_BIN, RSYNC_BIN, SSH_BIN};
use crate::error::{Result, SyncError};
use crate::plan::TransferPlan;

pub fn required_tools(plans: &[TransferPlan]) -> Vec<&'static str> {
    let mut tools = vec![RSYNC_BIN];
    if plans
        .iter()
        .any(|p| p.source.is_remote() || p.destination.is_remote())
    {
        tools.push(SSH_BIN);
    }
    if plans.iter().any(|p| p.action.needs_crypto()) {
        tools.push(GPG_BIN);
    }
    tools
}

/// Every required tool must be on `PATH`.
pub fn check_tools(plans: &[TransferPlan]) -> Result<()> {
    for tool in required_tools(plans) {
        let found = which::which(tool).map_err(|_| {
            SyncError::Config(format!("required tool \"{tool}\" was not found in PATH"))
        })?;
        debug!("Using {tool} at {}", found.display());
    }
    Ok(())
}
