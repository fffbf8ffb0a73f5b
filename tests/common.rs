// tests/common.rs
//! Shared test utilities: logging setup, fixtures and primitive doubles
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

use syncbuddy::filters::ExcludeSet;
use syncbuddy::matching::PairingPrompt;
use syncbuddy::prompt::PlanApproval;
use syncbuddy::{
    CancelToken, Cipher, Config, DirectoryEntry, LocationPath, Result, SyncError, SyncOptions,
    Transfer, TransferPlan, TransferRequest, TransferScope,
};
use walkdir::WalkDir;

#[cfg(feature = "logging")]
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize test-friendly logging. Respects `RUST_LOG`, safe to call repeatedly.
pub fn setup() {
    #[cfg(feature = "logging")]
    tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();
}

// ──────────────────────────────────────────────────────────────
// Fixtures
// ──────────────────────────────────────────────────────────────

pub const RECIPIENT: &str = "backup@example.org";

/// Three locations below `root`: trusted `laptop` and `desktop`, untrusted `usb`.
/// Each has a sensitive archive-mode `docs` and a `photos` directory with a
/// sensitive `private` subfolder.
pub fn fixture_toml(root: &Path) -> String {
    fixture_toml_with_tmp(root, &root.join("tmp"))
}

pub fn fixture_toml_with_tmp(root: &Path, tmp: &Path) -> String {
    let mut toml = format!(
        "[gpg]\nrecipient = \"{RECIPIENT}\"\ntmp_dir = \"{}\"\n",
        tmp.display()
    );
    for (name, trusted) in [("laptop", true), ("usb", false), ("desktop", true)] {
        toml.push_str(&format!(
            r#"
[locations.{name}]
root_dir = "{root}"
trusted = {trusted}

[[locations.{name}.dirs]]
path = "docs"
sensitive = true
encryption_mode = "archive"

[[locations.{name}.dirs]]
path = "photos"
sensitive_subfolders = ["private"]
exclude_patterns = ["*.tmp"]
"#,
            root = root.join(name).display()
        ));
    }
    toml
}

pub fn fixture_config(root: &Path) -> Config {
    Config::from_toml_str(&fixture_toml(root)).unwrap()
}

/// Populate `root/laptop` with a small tree
pub fn seed_laptop(root: &Path) {
    let laptop = root.join("laptop");
    write(&laptop.join("docs/a.txt"), "alpha");
    write(&laptop.join("docs/sub/b.txt"), "bravo");
    write(&laptop.join("photos/p1.jpg"), "photo one");
    write(&laptop.join("photos/scratch.tmp"), "junk");
    write(&laptop.join("photos/private/secret.jpg"), "top secret");
}

pub fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

/// Every regular file below `dir`, relative and sorted
pub fn files_below(dir: &Path) -> Vec<String> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut files: Vec<String> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}

pub fn is_empty_dir(dir: &Path) -> bool {
    fs::read_dir(dir).map(|mut d| d.next().is_none()).unwrap_or(true)
}

pub fn entry(path: &str, sensitive: bool) -> DirectoryEntry {
    DirectoryEntry {
        path: PathBuf::from(path),
        sensitive,
        exclude_patterns: Vec::new(),
        sensitive_subfolders: Vec::new(),
        encryption_mode: Default::default(),
    }
}

// ──────────────────────────────────────────────────────────────
// Primitive doubles
// ──────────────────────────────────────────────────────────────

const FAKE_HEADER: &[u8] = b"FAKEGPG1";
const FAKE_KEY: u8 = 0x5A;

/// Reversible stand-in for gpg: header plus XOR-ed bytes
#[derive(Debug, Default)]
pub struct FakeCipher {
    pub encrypted: Cell<usize>,
    pub decrypted: Cell<usize>,
    pub fail: bool,
}

impl FakeCipher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.encrypted.get() + self.decrypted.get()
    }
}

impl Cipher for FakeCipher {
    fn encrypt(&self, input: &Path, output: &Path) -> Result<()> {
        if self.fail {
            return Err(SyncError::ExternalPrimitive {
                tool: "gpg".into(),
                detail: "scripted failure".into(),
            });
        }
        let mut out = FAKE_HEADER.to_vec();
        out.extend(fs::read(input)?.iter().map(|b| b ^ FAKE_KEY));
        fs::write(output, out)?;
        self.encrypted.set(self.encrypted.get() + 1);
        Ok(())
    }

    fn decrypt(&self, input: &Path, output: &Path) -> Result<()> {
        let data = fs::read(input)?;
        let body = data.strip_prefix(FAKE_HEADER).ok_or_else(|| SyncError::ExternalPrimitive {
            tool: "gpg".into(),
            detail: format!("{} is not ciphertext", input.display()),
        })?;
        fs::write(output, body.iter().map(|b| b ^ FAKE_KEY).collect::<Vec<u8>>())?;
        self.decrypted.set(self.decrypted.get() + 1);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTransfer {
    pub source: LocationPath,
    pub destination: LocationPath,
    pub scope: TransferScope,
    pub excludes: Vec<String>,
    pub delete_extraneous: bool,
    pub dry_run: bool,
}

/// Local stand-in for rsync: copies trees and records every request
#[derive(Debug, Default)]
pub struct LocalCopy {
    pub calls: RefCell<Vec<RecordedTransfer>>,
    /// Fired on the first request, then the request fails
    pub cancel_on_call: Option<CancelToken>,
}

impl LocalCopy {
    pub fn cancelling(token: CancelToken) -> Self {
        Self {
            cancel_on_call: Some(token),
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.calls.borrow().len()
    }
}

fn copy_tree(source: &Path, destination: &Path, excludes: &ExcludeSet) -> Result<()> {
    let walker = WalkDir::new(source).into_iter().filter_entry(|e| {
        let rel = e.path().strip_prefix(source).unwrap();
        rel.as_os_str().is_empty() || !excludes.is_excluded(rel, e.file_type().is_dir())
    });
    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        let target = destination.join(entry.path().strip_prefix(source).unwrap());
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

impl Transfer for LocalCopy {
    fn transfer(&self, request: &TransferRequest<'_>) -> Result<()> {
        self.calls.borrow_mut().push(RecordedTransfer {
            source: request.source.clone(),
            destination: request.destination.clone(),
            scope: request.scope,
            excludes: request.excludes.to_vec(),
            delete_extraneous: request.delete_extraneous,
            dry_run: request.dry_run,
        });

        if let Some(token) = &self.cancel_on_call {
            token.cancel();
            return Err(SyncError::ExternalPrimitive {
                tool: "rsync".into(),
                detail: "interrupted".into(),
            });
        }
        if request.dry_run {
            return Ok(());
        }

        let source = &request.source.path;
        let destination = &request.destination.path;
        if !source.exists() {
            return Err(SyncError::ExternalPrimitive {
                tool: "rsync".into(),
                detail: format!("{} does not exist", source.display()),
            });
        }
        fs::create_dir_all(destination)?;
        let excludes = ExcludeSet::new(request.excludes)?;

        match request.scope {
            TransferScope::Contents => copy_tree(source, destination, &excludes),
            TransferScope::Item => {
                let target = destination.join(source.file_name().unwrap());
                if source.is_dir() {
                    copy_tree(source, &target, &excludes)
                } else {
                    fs::copy(source, target)?;
                    Ok(())
                }
            }
        }
    }
}

// ──────────────────────────────────────────────────────────────
// Operator doubles
// ──────────────────────────────────────────────────────────────

/// Returns a fixed pairing and approves every plan
#[derive(Debug, Default)]
pub struct Scripted {
    pub pairs: Vec<(usize, usize)>,
    pub approvals: usize,
}

impl Scripted {
    pub fn pairing(pairs: Vec<(usize, usize)>) -> Self {
        Self {
            pairs,
            approvals: 0,
        }
    }
}

impl PairingPrompt for Scripted {
    fn request_pairing(
        &mut self,
        _sources: &[DirectoryEntry],
        _destinations: &[DirectoryEntry],
    ) -> Result<Vec<(usize, usize)>> {
        Ok(self.pairs.clone())
    }
}

impl PlanApproval for Scripted {
    fn approve_plans(
        &mut self,
        plans: &[TransferPlan],
        _options: &SyncOptions,
    ) -> Result<Vec<usize>> {
        self.approvals += 1;
        Ok((0..plans.len()).collect())
    }
}
