// src/config/defaults.rs
use std::path::PathBuf;

use crate::consts::{APP_DIR_NAME, DEFAULT_CONFIG_FILE, DEFAULT_SSH_PORT};

pub fn default_ssh_port() -> u16 {
    DEFAULT_SSH_PORT
}

/// Candidate configuration files, in lookup order
pub fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(".").join(DEFAULT_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(APP_DIR_NAME).join(DEFAULT_CONFIG_FILE));
    }
    paths.push(
        PathBuf::from("/etc")
            .join(APP_DIR_NAME)
            .join(DEFAULT_CONFIG_FILE),
    );
    paths
}
