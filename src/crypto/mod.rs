// src/crypto/mod.rs
//! Encryption layer
//!
//! The primitive itself is external ([`Cipher`], normally GnuPG). This
//! module decides what gets handed to it: a single tarball in archive mode,
//! every file on its own in per-file mode.

use std::path::Path;

use crate::error::Result;

pub mod archive;
pub mod gpg;
pub mod tree;

pub use gpg::GpgCipher;
pub use tree::{decrypt_tree, encrypt_tree};

/// File-to-file encryption primitive
pub trait Cipher {
    fn encrypt(&self, input: &Path, output: &Path) -> Result<()>;
    fn decrypt(&self, input: &Path, output: &Path) -> Result<()>;
}
