// src/matching.rs
//! Pairing of source and destination directories
//!
//! Automatic mode pairs by position. Manual mode delegates to a
//! [`PairingPrompt`] and validates what comes back. Neither touches the
//! configuration.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::DirectoryEntry;
use crate::error::{Result, SyncError};

/// Interactive (or scripted) source of manual pairings.
///
/// Returns zero-based `(source, destination)` index pairs.
pub trait PairingPrompt {
    fn request_pairing(
        &mut self,
        sources: &[DirectoryEntry],
        destinations: &[DirectoryEntry],
    ) -> Result<Vec<(usize, usize)>>;
}

#[derive(Debug, Clone, Copy)]
pub struct DirPair<'a> {
    pub source: &'a DirectoryEntry,
    pub destination: &'a DirectoryEntry,
}

#[derive(Debug, Default)]
pub struct MatchOutcome<'a> {
    pub pairs: Vec<DirPair<'a>>,
    pub unmatched_sources: Vec<&'a DirectoryEntry>,
    pub unmatched_destinations: Vec<&'a DirectoryEntry>,
}

impl MatchOutcome<'_> {
    fn report_unmatched(&self) {
        for src in &self.unmatched_sources {
            warn!(
                "Source directory \"{}\" does not have a matching destination.",
                src.path.display()
            );
        }
        for dst in &self.unmatched_destinations {
            warn!("No source for \"{}\".", dst.path.display());
        }
    }
}

/// First source to first destination, second to second, ...
///
/// Surplus directories on either side are reported, not fatal.
pub fn match_automatic<'a>(
    sources: &'a [DirectoryEntry],
    destinations: &'a [DirectoryEntry],
) -> MatchOutcome<'a> {
    let common = sources.len().min(destinations.len());
    let outcome = MatchOutcome {
        pairs: sources
            .iter()
            .zip(destinations)
            .map(|(source, destination)| DirPair {
                source,
                destination,
            })
            .collect(),
        unmatched_sources: sources[common..].iter().collect(),
        unmatched_destinations: destinations[common..].iter().collect(),
    };
    outcome.report_unmatched();
    debug!("Automatically matched {} directory pair(s).", outcome.pairs.len());
    outcome
}

pub fn match_manual<'a>(
    sources: &'a [DirectoryEntry],
    destinations: &'a [DirectoryEntry],
    prompt: &mut dyn PairingPrompt,
) -> Result<MatchOutcome<'a>> {
    let selected = prompt.request_pairing(sources, destinations)?;

    let mut used_sources = HashSet::new();
    let mut used_destinations = HashSet::new();
    let mut pairs = Vec::with_capacity(selected.len());

    for (src_idx, dst_idx) in selected {
        let source = sources.get(src_idx).ok_or_else(|| {
            SyncError::AmbiguousMatch(format!(
                "source index {} is out of range (1-{})",
                src_idx + 1,
                sources.len()
            ))
        })?;
        let destination = destinations.get(dst_idx).ok_or_else(|| {
            SyncError::AmbiguousMatch(format!(
                "destination index {} is out of range (1-{})",
                dst_idx + 1,
                destinations.len()
            ))
        })?;

        if !used_sources.insert(src_idx) {
            return Err(SyncError::AmbiguousMatch(format!(
                "source \"{}\" was paired more than once",
                source.path.display()
            )));
        }
        if !used_destinations.insert(dst_idx) {
            return Err(SyncError::AmbiguousMatch(format!(
                "destination \"{}\" was paired more than once",
                destination.path.display()
            )));
        }

        debug!(
            "Selected {} -> {}",
            source.path.display(),
            destination.path.display()
        );
        pairs.push(DirPair {
            source,
            destination,
        });
    }

    let outcome = MatchOutcome {
        pairs,
        unmatched_sources: sources
            .iter()
            .enumerate()
            .filter(|(i, _)| !used_sources.contains(i))
            .map(|(_, d)| d)
            .collect(),
        unmatched_destinations: destinations
            .iter()
            .enumerate()
            .filter(|(i, _)| !used_destinations.contains(i))
            .map(|(_, d)| d)
            .collect(),
    };
    outcome.report_unmatched();
    Ok(outcome)
}
