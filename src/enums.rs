// src/enums.rs
//! Public enum types used throughout the crate
//!
//! Central location for the closed variants the policy engine works with:
//! encryption granularity, policy decisions, plan actions and transfer scope.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Encryption granularity for a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EncryptionMode {
    /// One encrypted bundle; hides names and structure, all-or-nothing retrieval
    #[serde(alias = "directory")]
    Archive,
    /// Every file encrypted on its own; names and structure stay visible
    #[default]
    #[serde(alias = "file")]
    PerFile,
}

impl fmt::Display for EncryptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EncryptionMode::Archive => "archive",
            EncryptionMode::PerFile => "per-file",
        })
    }
}

impl std::str::FromStr for EncryptionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "archive" | "directory" => Ok(EncryptionMode::Archive),
            "per-file" | "file" => Ok(EncryptionMode::PerFile),
            other => Err(format!(
                "unknown encryption mode \"{other}\" (expected \"archive\" or \"per-file\")"
            )),
        }
    }
}

/// Outcome of the sensitivity policy for one transfer unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    Plain,
    Encrypt,
    Decrypt,
    Forbidden,
}

/// What the execution pipeline does with a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Plain,
    EncryptThenTransfer,
    TransferThenDecrypt,
    TransferOnlyAlreadyEncrypted,
}

impl Action {
    pub fn needs_crypto(self) -> bool {
        matches!(
            self,
            Action::EncryptThenTransfer | Action::TransferThenDecrypt
        )
    }

    /// Short label used in plan listings
    pub fn label(self) -> &'static str {
        match self {
            Action::Plain => "",
            Action::EncryptThenTransfer => "encrypt",
            Action::TransferThenDecrypt => "decrypt",
            Action::TransferOnlyAlreadyEncrypted => "ciphertext",
        }
    }
}

/// How a transfer treats its source path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransferScope {
    /// Synchronise the contents of the source directory into the destination directory
    Contents,
    /// Copy the source item (file or directory) into the destination directory
    Item,
}
