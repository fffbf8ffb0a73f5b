// src/lib.rs
//! syncbuddy: sync directory trees between named locations
//!
//! Features:
//! - Trusted / untrusted locations (local paths, volumes, SSH hosts)
//! - Automatic GPG encryption of sensitive data leaving trusted storage
//! - Archive or per-file encryption granularity
//! - Pick mode for one-off transfers of a single path
//! - rsync as the transfer engine, scoped scratch workspaces

pub mod cancel;
pub mod config;
pub mod consts;
pub mod crypto;
pub mod endpoint;
pub mod enums;
pub mod export;
pub mod filters;
pub mod matching;
pub mod paths;
pub mod pipeline;
pub mod plan;
pub mod policy;
pub mod preflight;
pub mod prompt;
pub mod remote;
pub mod sync;
pub mod transfer;
pub mod workspace;

pub mod error;

// Re-export everything users need at the crate root
pub use cancel::CancelToken;
pub use config::{load as load_config, Config, DirectoryEntry, EncryptionConfig, Location};
pub use crypto::{Cipher, GpgCipher};
pub use endpoint::{resolve_endpoint, EndpointSpec};
pub use enums::{Action, Decision, EncryptionMode, TransferScope};
pub use error::{Result, SyncError};
pub use pipeline::{Pipeline, PlanOutcome, PlanState, RunReport};
pub use plan::TransferPlan;
pub use remote::{LocationPath, RemoteHost};
pub use sync::{SyncOptions, Syncer};
pub use transfer::{Rsync, Transfer, TransferRequest};
