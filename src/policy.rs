// src/policy.rs
//! Sensitivity policy and encryption mode selection
//!
//! [`decide`] is a pure, total function: every combination of inputs maps
//! to exactly one [`Decision`]. Rules, highest priority first:
//!
//! 1. already encrypted, trusted destination   → decrypt
//! 2. already encrypted, untrusted destination → plain (never double-encrypt)
//! 3. sensitive, untrusted destination         → encrypt
//! 4. sensitive, explicit encrypt request      → encrypt
//! 5. partly sensitive, crossing trust levels  → forbidden
//! 6. anything else                            → plain

use tracing::debug;

use crate::config::DirectoryEntry;
use crate::enums::{Action, Decision, EncryptionMode};
use crate::error::{Result, SyncError};

/// Everything the policy needs to know about one transfer unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyInput {
    pub source_trusted: bool,
    pub destination_trusted: bool,
    /// The whole directory entry is sensitive
    pub entry_sensitive: bool,
    /// The unit lies inside a sensitive subfolder
    pub subfolder_sensitive: bool,
    /// The unit is not sensitive itself but has sensitive content below it
    pub contains_sensitive: bool,
    pub already_encrypted: bool,
    pub force_encrypt: bool,
}

impl PolicyInput {
    pub fn is_sensitive(&self) -> bool {
        self.entry_sensitive || self.subfolder_sensitive
    }
}

pub fn decide(input: &PolicyInput) -> Decision {
    let sensitive = input.is_sensitive();

    let decision = if input.already_encrypted {
        if input.destination_trusted {
            Decision::Decrypt
        } else {
            Decision::Plain
        }
    } else if sensitive && (!input.destination_trusted || input.force_encrypt) {
        Decision::Encrypt
    } else if !sensitive
        && input.contains_sensitive
        && input.source_trusted != input.destination_trusted
    {
        Decision::Forbidden
    } else {
        Decision::Plain
    };

    debug!("Policy {input:?} -> {decision:?}");
    decision
}

/// Map a decision onto the pipeline action. `Forbidden` has no action.
pub fn action_for(decision: Decision, already_encrypted: bool) -> Option<Action> {
    match decision {
        Decision::Plain if already_encrypted => Some(Action::TransferOnlyAlreadyEncrypted),
        Decision::Plain => Some(Action::Plain),
        Decision::Encrypt => Some(Action::EncryptThenTransfer),
        Decision::Decrypt => Some(Action::TransferThenDecrypt),
        Decision::Forbidden => None,
    }
}

/// Explicit override wins, then the directory's setting, then per-file
pub fn select_mode(
    entry_mode: Option<EncryptionMode>,
    override_mode: Option<EncryptionMode>,
) -> EncryptionMode {
    override_mode.or(entry_mode).unwrap_or_default()
}

/// Both sides of a directory pair must agree on sensitivity.
///
/// A sensitive source synced into a directory declared non-sensitive (or
/// the other way round) would mix plaintext and protected content.
pub fn check_pair_sensitivity(source: &DirectoryEntry, destination: &DirectoryEntry) -> Result<()> {
    if source.sensitive != destination.sensitive {
        return Err(SyncError::MixedSensitivity(format!(
            "\"{}\" (sensitive={}) and \"{}\" (sensitive={}) must match",
            source.path.display(),
            source.sensitive,
            destination.path.display(),
            destination.sensitive
        )));
    }
    Ok(())
}
