// src/cancel.rs
//! Cooperative cancellation
//!
//! The pipeline polls the token between steps; SIGINT and SIGTERM only
//! flip the flag, they never run cleanup themselves. Workspaces are removed
//! when the stage that owns them unwinds.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::debug;

use crate::error::{Result, SyncError};

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token wired to SIGINT and SIGTERM
    pub fn install() -> Result<Self> {
        let token = Self::new();
        token.arm()?;
        Ok(token)
    }

    /// Route SIGINT and SIGTERM to this token. Until then the default
    /// handlers apply, so an interrupt at a prompt ends the process at once.
    pub fn arm(&self) -> Result<()> {
        for signal in [SIGINT, SIGTERM] {
            signal_hook::flag::register(signal, Arc::clone(&self.flag))?;
        }
        debug!("Installed interrupt handlers.");
        Ok(())
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once the token has fired
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(SyncError::Cancelled)
        } else {
            Ok(())
        }
    }
}
