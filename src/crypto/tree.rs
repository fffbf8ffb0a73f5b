// src/crypto/tree.rs
//! Encrypting a source tree into a workspace and decrypting fetched
//! ciphertext back into plaintext
//!
//! Layout rules shared by both directions:
//! - archive mode writes one `<name>.synchive.crypt` bundle
//! - per-file mode mirrors the tree, every file gaining `.crypt`
//! - a bundle's contents extract into the directory holding it

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::cancel::CancelToken;
use crate::consts::{bundle_ending, ARCHIVE_ENDING, CIPHERTEXT_ENDING};
use crate::crypto::{archive, Cipher};
use crate::enums::{EncryptionMode, TransferScope};
use crate::error::Result;
use crate::filters::ExcludeSet;
use crate::paths::base_name;
use crate::workspace::Workspace;

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Encrypt `source` into the workspace outbox. Returns the number of
/// ciphertext files produced.
///
/// With [`TransferScope::Item`] the source's own name is kept as the top
/// level of the output; with [`TransferScope::Contents`] only what is
/// below it.
pub fn encrypt_tree(
    cipher: &dyn Cipher,
    source: &Path,
    scope: TransferScope,
    mode: EncryptionMode,
    excludes: &ExcludeSet,
    workspace: &Workspace,
    cancel: &CancelToken,
) -> Result<usize> {
    let name = base_name(source, "root");
    let outbox = workspace.outbox();

    match mode {
        EncryptionMode::Archive => {
            let tarball = workspace.scratch().join(format!("{name}{ARCHIVE_ENDING}"));
            let prefix = match scope {
                TransferScope::Item => Some(Path::new(&name)),
                TransferScope::Contents => None,
            };
            let files = archive::pack(source, prefix, excludes, &tarball)?;
            cancel.check()?;

            let bundle = outbox.join(format!("{name}{}", bundle_ending()));
            cipher.encrypt(&tarball, &bundle)?;
            fs::remove_file(&tarball)?;
            info!("Encrypted {files} file(s) of {} into one archive", source.display());
            Ok(1)
        }
        EncryptionMode::PerFile => {
            if source.is_file() {
                cancel.check()?;
                let target = with_suffix(&outbox.join(&name), CIPHERTEXT_ENDING);
                cipher.encrypt(source, &target)?;
                return Ok(1);
            }

            let root = match scope {
                TransferScope::Item => outbox.join(&name),
                TransferScope::Contents => outbox,
            };
            fs::create_dir_all(&root)?;

            let walker = WalkDir::new(source)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| {
                    e.path()
                        .strip_prefix(source)
                        .map(|rel| {
                            rel.as_os_str().is_empty()
                                || !excludes.is_excluded(rel, e.file_type().is_dir())
                        })
                        .unwrap_or(true)
                });

            let mut count = 0;
            for entry in walker {
                let entry = entry.map_err(std::io::Error::from)?;
                let Ok(rel) = entry.path().strip_prefix(source) else {
                    continue;
                };
                if rel.as_os_str().is_empty() {
                    continue;
                }
                let target = root.join(rel);

                if entry.file_type().is_dir() {
                    fs::create_dir_all(&target)?;
                } else if entry.file_type().is_file() {
                    cancel.check()?;
                    cipher.encrypt(entry.path(), &with_suffix(&target, CIPHERTEXT_ENDING))?;
                    count += 1;
                } else {
                    warn!("Skipping {} (not a regular file)", entry.path().display());
                }
            }
            info!("Encrypted {count} file(s) of {}", source.display());
            Ok(count)
        }
    }
}

enum Payload {
    Bundle,
    Single(PathBuf),
    Plain,
}

fn classify(rel: &Path) -> Payload {
    let name = rel
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lower = name.to_ascii_lowercase();

    if lower.ends_with(&bundle_ending()) {
        Payload::Bundle
    } else if lower.ends_with(CIPHERTEXT_ENDING) {
        let stem = &name[..name.len() - CIPHERTEXT_ENDING.len()];
        Payload::Single(rel.with_file_name(stem))
    } else {
        Payload::Plain
    }
}

/// Decrypt everything fetched into `inbox` into `plain`, keeping the
/// relative layout. Files without the ciphertext marker are copied as-is.
/// Returns the number of ciphertext files decrypted.
pub fn decrypt_tree(
    cipher: &dyn Cipher,
    inbox: &Path,
    plain: &Path,
    scratch: &Path,
    cancel: &CancelToken,
) -> Result<usize> {
    let mut count = 0;

    for entry in WalkDir::new(inbox).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let Ok(rel) = entry.path().strip_prefix(inbox) else {
            continue;
        };
        if rel.as_os_str().is_empty() {
            continue;
        }

        if entry.file_type().is_dir() {
            fs::create_dir_all(plain.join(rel))?;
            continue;
        }
        if !entry.file_type().is_file() {
            warn!("Skipping {} (not a regular file)", entry.path().display());
            continue;
        }

        cancel.check()?;
        match classify(rel) {
            Payload::Bundle => {
                let tarball = scratch.join(format!("bundle-{count:04}{ARCHIVE_ENDING}"));
                cipher.decrypt(entry.path(), &tarball)?;
                let target = plain.join(rel.parent().unwrap_or(Path::new("")));
                fs::create_dir_all(&target)?;
                archive::unpack(&tarball, &target)?;
                fs::remove_file(&tarball)?;
                count += 1;
            }
            Payload::Single(stripped) => {
                let target = plain.join(stripped);
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                cipher.decrypt(entry.path(), &target)?;
                count += 1;
            }
            Payload::Plain => {
                debug!("Copying unencrypted {}", rel.display());
                let target = plain.join(rel);
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(entry.path(), target)?;
            }
        }
    }

    info!("Decrypted {count} file(s) from {}", inbox.display());
    Ok(count)
}
