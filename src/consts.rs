// src/consts.rs
//! Shared constants: file markers, defaults and tool names

/// Suffix of every ciphertext produced by the encryption step
pub const CIPHERTEXT_ENDING: &str = ".crypt";

/// Suffix of the plaintext archive built in archive mode (before encryption)
pub const ARCHIVE_ENDING: &str = ".synchive";

/// Default configuration file name, looked up in the search directories
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the configuration path
pub const CONFIG_ENV_VAR: &str = "SYNCBUDDY_CONFIG";

/// Application directory name below the user/system config roots
pub const APP_DIR_NAME: &str = "syncbuddy";

pub const DEFAULT_SSH_PORT: u16 = 22;

/// Number of hex characters of the BLAKE3 plan digest used as plan id
pub const PLAN_ID_LENGTH_HEX: usize = 12;

pub const RSYNC_BIN: &str = "rsync";
pub const SSH_BIN: &str = "ssh";
pub const GPG_BIN: &str = "gpg";

/// Base rsync flags: archive, verbose, compress, overall progress
pub const RSYNC_BASE_ARGS: &[&str] = &["-avz", "--info=progress2"];

/// Returns the full suffix of an encrypted archive bundle (`.synchive.crypt`)
pub fn bundle_ending() -> String {
    format!("{ARCHIVE_ENDING}{CIPHERTEXT_ENDING}")
}
