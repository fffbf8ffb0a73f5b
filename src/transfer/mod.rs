// src/transfer/mod.rs
//! Byte-level transfer of trees between location paths
//!
//! The engine is external; [`Rsync`] drives the `rsync` binary. Tests plug
//! in their own [`Transfer`].

use crate::enums::TransferScope;
use crate::error::Result;
use crate::remote::LocationPath;

pub mod rsync;

pub use rsync::{rsync_args, Rsync};

/// One invocation of the transfer engine
#[derive(Debug, Clone, Copy)]
pub struct TransferRequest<'a> {
    pub source: &'a LocationPath,
    /// Always a directory; created if missing
    pub destination: &'a LocationPath,
    /// `Contents` copies what is below `source`, `Item` copies `source` itself
    pub scope: TransferScope,
    pub excludes: &'a [String],
    pub delete_extraneous: bool,
    pub dry_run: bool,
}

pub trait Transfer {
    fn transfer(&self, request: &TransferRequest<'_>) -> Result<()>;
}
