// src/config/mod.rs
//! Configuration system for syncbuddy
//!
//! TOML file describing locations, their directories and the GPG settings.
//! Loaded once by the caller and passed around explicitly.

pub use app::{load, locate, Config, DirectoryEntry, EncryptionConfig, Location};

mod app;
pub(crate) mod defaults;
