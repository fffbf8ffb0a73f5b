// src/crypto/archive.rs
//! gzip-compressed tar bundles for archive-mode encryption

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Archive, Builder};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::Result;
use crate::filters::ExcludeSet;

/// Pack `source` into a `.tar.gz` at `output`.
///
/// Entry names are relative to `source`, placed under `prefix` when one is
/// given. A plain file is stored under `prefix` (or its own name).
/// Returns the number of regular files written.
pub fn pack(
    source: &Path,
    prefix: Option<&Path>,
    excludes: &ExcludeSet,
    output: &Path,
) -> Result<usize> {
    let tarball = File::create(output).map_err(|error| {
        io::Error::new(
            error.kind(),
            format!("failed to create archive at {}: {error}", output.display()),
        )
    })?;
    let encoder = GzEncoder::new(tarball, Compression::default());
    let mut builder = Builder::new(encoder);
    builder.follow_symlinks(false);

    let mut files = 0;
    if source.is_file() {
        let name = match prefix {
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(source.file_name().unwrap_or(source.as_os_str())),
        };
        builder.append_path_with_name(source, &name)?;
        files += 1;
    } else {
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

        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            let Ok(rel) = entry.path().strip_prefix(source) else {
                continue;
            };
            let name = match prefix {
                Some(p) => p.join(rel),
                None if rel.as_os_str().is_empty() => continue,
                None => rel.to_path_buf(),
            };

            if entry.file_type().is_dir() {
                builder.append_dir(&name, entry.path())?;
            } else {
                builder.append_path_with_name(entry.path(), &name)?;
                files += 1;
            }
        }
    }

    let encoder = builder.into_inner()?;
    encoder.finish()?;

    debug!("Packed {files} file(s) from {} into {}", source.display(), output.display());
    Ok(files)
}

/// Extract a bundle created by [`pack`] into `destination`.
///
/// Entries that would land outside `destination` are skipped by `tar`.
pub fn unpack(bundle: &Path, destination: &Path) -> Result<()> {
    let decoder = GzDecoder::new(File::open(bundle)?);
    let mut archive = Archive::new(decoder);
    archive.set_preserve_permissions(true);
    archive.set_overwrite(true);
    archive.unpack(destination)?;
    debug!("Unpacked {} into {}", bundle.display(), destination.display());
    Ok(())
}
