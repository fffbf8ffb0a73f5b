// src/crypto/gpg.rs
//! GnuPG public-key encryption via the `gpg` binary

use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::config::Config;
use crate::consts::GPG_BIN;
use crate::crypto::Cipher;
use crate::error::{Result, SyncError};

#[derive(Debug, Clone, Default)]
pub struct GpgCipher {
    recipient: Option<String>,
}

impl GpgCipher {
    pub fn new(recipient: impl Into<String>) -> Self {
        Self {
            recipient: Some(recipient.into()),
        }
    }

    /// Recipient from the `[gpg]` section; decryption works without one.
    pub fn from_config(config: &Config) -> Self {
        Self {
            recipient: config.encryption.as_ref().map(|e| e.recipient.clone()),
        }
    }

    fn run<I, S>(&self, args: I, input: &Path) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = Command::new(GPG_BIN)
            .args(["--yes", "--quiet"])
            .args(args)
            .arg(input)
            .output()
            .map_err(|e| SyncError::external(GPG_BIN, format!("cannot start: {e}")))?;

        if !output.status.success() {
            return Err(SyncError::external(
                GPG_BIN,
                format!(
                    "{} on {}: {}",
                    output.status,
                    input.display(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        Ok(())
    }
}

impl Cipher for GpgCipher {
    fn encrypt(&self, input: &Path, output: &Path) -> Result<()> {
        let recipient = self.recipient.as_deref().ok_or_else(|| {
            SyncError::MissingEncryptionConfig(format!("encrypting {}", input.display()))
        })?;
        debug!("gpg encrypt {} -> {}", input.display(), output.display());
        self.run(
            [
                OsStr::new("--encrypt"),
                OsStr::new("--recipient"),
                OsStr::new(recipient),
                OsStr::new("--output"),
                output.as_os_str(),
            ],
            input,
        )
    }

    fn decrypt(&self, input: &Path, output: &Path) -> Result<()> {
        debug!("gpg decrypt {} -> {}", input.display(), output.display());
        self.run(
            [
                OsStr::new("--decrypt"),
                OsStr::new("--output"),
                output.as_os_str(),
            ],
            input,
        )
    }
}
