// src/plan.rs
//! Transfer planner: turns endpoints, matched directories and the
//! sensitivity policy into an ordered list of [`TransferPlan`]s
//!
//! Everything here is decided before the first byte moves. Any
//! configuration-level problem surfaces as an error from [`build_plans`]
//! and the pipeline never starts.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{Config, DirectoryEntry, Location};
use crate::consts::PLAN_ID_LENGTH_HEX;
use crate::endpoint::EndpointSpec;
use crate::enums::{Action, Decision, EncryptionMode, TransferScope};
use crate::error::{Result, SyncError};
use crate::filters::rebase_excludes;
use crate::matching::{match_automatic, match_manual, DirPair, PairingPrompt};
use crate::paths::{has_wildcards, to_slash};
use crate::policy::{action_for, check_pair_sensitivity, decide, select_mode, PolicyInput};
use crate::remote::LocationPath;
use crate::sync::SyncOptions;

/// Where a plan came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PlanOrigin {
    Entry { path: PathBuf },
    Subfolder { entry: PathBuf, subfolder: PathBuf },
    Pick { path: PathBuf },
}

/// One unit of work for the execution pipeline. Consumed exactly once.
#[derive(Debug, Clone, Serialize)]
pub struct TransferPlan {
    /// 1-based position; plans execute in this order
    pub index: usize,
    /// Short BLAKE3 digest of the plan, used to name its workspace
    pub id: String,
    pub origin: PlanOrigin,
    pub source: LocationPath,
    pub destination: LocationPath,
    pub scope: TransferScope,
    pub action: Action,
    pub encryption_mode: EncryptionMode,
    pub exclude_patterns: Vec<String>,
    pub delete_extraneous: bool,
}

impl TransferPlan {
    fn draft(
        origin: PlanOrigin,
        source: LocationPath,
        destination: LocationPath,
        scope: TransferScope,
        action: Action,
        encryption_mode: EncryptionMode,
        exclude_patterns: Vec<String>,
        delete_extraneous: bool,
    ) -> Self {
        Self {
            index: 0,
            id: String::new(),
            origin,
            source,
            destination,
            scope,
            action,
            encryption_mode,
            exclude_patterns,
            delete_extraneous,
        }
    }

    /// Human-readable one-liner for listings and logs
    pub fn describe(&self) -> String {
        match self.action {
            Action::Plain => format!("{}  -->  {}", self.source, self.destination),
            Action::TransferOnlyAlreadyEncrypted => {
                format!("{} ---(ciphertext)--> {}", self.source, self.destination)
            }
            action => format!(
                "{} ---({}, {})--> {}",
                self.source,
                action.label(),
                self.encryption_mode,
                self.destination
            ),
        }
    }

    /// Prefix of this plan's scratch directory inside `tmp_dir`
    pub fn workspace_label(&self) -> String {
        format!("plan-{:03}-{}-", self.index, self.id)
    }
}

/// Build every plan for a run, in execution order.
pub fn build_plans(
    config: &Config,
    source: &EndpointSpec<'_>,
    destination: &EndpointSpec<'_>,
    options: &SyncOptions,
    prompt: &mut dyn PairingPrompt,
) -> Result<Vec<TransferPlan>> {
    if source.location.name == destination.location.name {
        return Err(SyncError::Config(
            "source and destination location must not be equal".into(),
        ));
    }

    let mut plans = match (&source.relative_path, &destination.relative_path) {
        (Some(picked), _) => vec![plan_pick(source, picked, destination, options)?],
        (None, Some(_)) => {
            return Err(SyncError::Config(
                "pick mode needs a source path (e.g. \"laptop:docs/report.pdf\")".into(),
            ))
        }
        (None, None) => plan_configured(source.location, destination.location, options, prompt)?,
    };

    assign_identity(&mut plans);
    validate_plans(config, &plans)?;

    debug!("Created {} synchronization plan(s).", plans.len());
    Ok(plans)
}

fn plan_configured(
    src_loc: &Location,
    dst_loc: &Location,
    options: &SyncOptions,
    prompt: &mut dyn PairingPrompt,
) -> Result<Vec<TransferPlan>> {
    let outcome = if options.manual_match {
        match_manual(&src_loc.dirs, &dst_loc.dirs, prompt)?
    } else {
        match_automatic(&src_loc.dirs, &dst_loc.dirs)
    };

    let paired: Vec<&DirectoryEntry> = outcome.pairs.iter().map(|p| p.source).collect();
    let mut plans = Vec::new();
    for pair in outcome.pairs {
        plan_pair(src_loc, dst_loc, pair, &paired, options, &mut plans)?;
    }
    Ok(plans)
}

fn plan_pair(
    src_loc: &Location,
    dst_loc: &Location,
    pair: DirPair<'_>,
    paired: &[&DirectoryEntry],
    options: &SyncOptions,
    plans: &mut Vec<TransferPlan>,
) -> Result<()> {
    let src_entry = pair.source;
    check_pair_sensitivity(src_entry, pair.destination)?;

    let base = PolicyInput {
        source_trusted: src_loc.trusted,
        destination_trusted: dst_loc.trusted,
        force_encrypt: options.force_encrypt,
        ..Default::default()
    };
    let mode = select_mode(Some(src_entry.encryption_mode), options.mode_override);
    let src_base = src_loc.path_of(&src_entry.path);
    let dst_base = dst_loc.path_of(&pair.destination.path);

    // Sensitive content at rest on an untrusted location is ciphertext.
    let at_rest_encrypted = !src_loc.trusted;

    // An entry inside a sensitive entry or subfolder is sensitive too.
    let enclosing = pick_sensitivity(src_loc, &src_entry.path);
    let entry_sensitive = enclosing.entry_sensitive || enclosing.subfolder_sensitive;

    let mut split: Vec<(&Path, Decision)> = Vec::new();
    let mut unsplit_sensitive = false;
    let subfolders: &[PathBuf] = if entry_sensitive {
        &[]
    } else {
        src_entry.effective_subfolders()
    };
    for sub in subfolders {
        if paired.iter().any(|p| p.path == src_entry.path.join(sub)) {
            continue;
        }
        let input = PolicyInput {
            subfolder_sensitive: true,
            already_encrypted: at_rest_encrypted,
            ..base
        };
        let decision = decide(&input);
        if decision == Decision::Plain {
            unsplit_sensitive = true;
            continue;
        }
        if has_wildcards(sub) {
            return Err(SyncError::MixedSensitivity(format!(
                "sensitive subfolder \"{}\" of \"{}\" uses wildcards and cannot be synced separately",
                sub.display(),
                src_entry.path.display()
            )));
        }
        split.push((sub.as_path(), decision));
    }

    // Other entries configured inside this one. Paired ones are synced by
    // their own plan; unpaired sensitive ones must not cross trust levels.
    let mut nested: Vec<PathBuf> = Vec::new();
    for inner in &src_loc.dirs {
        let Ok(rel) = inner.path.strip_prefix(&src_entry.path) else {
            continue;
        };
        if rel.as_os_str().is_empty() {
            continue;
        }
        if paired.iter().any(|p| p.path == inner.path) {
            nested.push(rel.to_path_buf());
            continue;
        }
        let covered = entry_sensitive || split.iter().any(|(sub, _)| rel.starts_with(sub));
        if covered || (!inner.sensitive && inner.sensitive_subfolders.is_empty()) {
            continue;
        }
        let input = PolicyInput {
            subfolder_sensitive: true,
            already_encrypted: at_rest_encrypted,
            ..base
        };
        if decide(&input) != Decision::Plain {
            return Err(SyncError::MixedSensitivity(format!(
                "sensitive directory \"{}\" sits inside \"{}\" but is not synced with it",
                inner.path.display(),
                src_entry.path.display()
            )));
        }
        unsplit_sensitive = true;
    }

    if !split.is_empty() {
        debug!(
            "Splitting \"{}\" into {} sensitive sub-plan(s).",
            src_entry.path.display(),
            split.len()
        );
    } else if unsplit_sensitive {
        debug!("Sensitive subfolders of \"{}\" stay within trust level.", src_entry.path.display());
    }

    let main_input = PolicyInput {
        entry_sensitive,
        contains_sensitive: unsplit_sensitive,
        already_encrypted: entry_sensitive && at_rest_encrypted,
        ..base
    };
    let action = action_for(decide(&main_input), main_input.already_encrypted)
        .ok_or_else(|| mixed_entry_error(src_entry))?;

    let mut excludes = src_entry.exclude_patterns.clone();
    excludes.extend(split.iter().map(|(sub, _)| format!("/{}", to_slash(sub))));
    excludes.extend(nested.iter().map(|rel| format!("/{}", to_slash(rel))));

    plans.push(TransferPlan::draft(
        PlanOrigin::Entry {
            path: src_entry.path.clone(),
        },
        src_base.clone(),
        dst_base.clone(),
        TransferScope::Contents,
        action,
        mode,
        excludes.clone(),
        options.remove_extraneous,
    ));

    for (sub, decision) in split {
        let action = action_for(decision, at_rest_encrypted)
            .ok_or_else(|| mixed_entry_error(src_entry))?;
        plans.push(TransferPlan::draft(
            PlanOrigin::Subfolder {
                entry: src_entry.path.clone(),
                subfolder: sub.to_path_buf(),
            },
            src_base.join(sub),
            dst_base.join(sub),
            TransferScope::Contents,
            action,
            mode,
            rebase_excludes(&excludes, sub),
            options.remove_extraneous,
        ));
    }
    Ok(())
}

fn mixed_entry_error(entry: &DirectoryEntry) -> SyncError {
    SyncError::MixedSensitivity(format!(
        "\"{}\" combines sensitive and non-sensitive content across a trust boundary",
        entry.path.display()
    ))
}

/// Sensitivity a picked path inherits from the configured directories
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PickSensitivity {
    pub entry_sensitive: bool,
    pub subfolder_sensitive: bool,
    pub contains_sensitive: bool,
    pub mode: Option<EncryptionMode>,
}

pub fn pick_sensitivity(location: &Location, picked: &Path) -> PickSensitivity {
    let mut found = PickSensitivity::default();

    for entry in &location.dirs {
        if picked.starts_with(&entry.path) {
            found.mode = Some(entry.encryption_mode);
            if entry.sensitive {
                found.entry_sensitive = true;
                continue;
            }
            for sub in &entry.sensitive_subfolders {
                let full = entry.path.join(sub);
                if has_wildcards(sub) {
                    // Cannot be resolved without the filesystem; assume the worst.
                    found.contains_sensitive = true;
                } else if picked.starts_with(&full) {
                    found.subfolder_sensitive = true;
                } else if full.starts_with(picked) {
                    found.contains_sensitive = true;
                }
            }
        } else if entry.path.starts_with(picked)
            && (entry.sensitive || !entry.sensitive_subfolders.is_empty())
        {
            found.contains_sensitive = true;
        }
    }
    found
}

fn plan_pick(
    source: &EndpointSpec<'_>,
    picked: &Path,
    destination: &EndpointSpec<'_>,
    options: &SyncOptions,
) -> Result<TransferPlan> {
    let src_loc = source.location;
    let dst_loc = destination.location;

    let inherited = pick_sensitivity(src_loc, picked);
    let sensitive = inherited.entry_sensitive || inherited.subfolder_sensitive;

    if options.force_encrypt && source.already_encrypted {
        warn!("You are trying to encrypt an already encrypted source.");
    }

    let input = PolicyInput {
        source_trusted: src_loc.trusted,
        destination_trusted: dst_loc.trusted,
        entry_sensitive: inherited.entry_sensitive || options.force_encrypt,
        subfolder_sensitive: inherited.subfolder_sensitive,
        contains_sensitive: inherited.contains_sensitive,
        already_encrypted: source.already_encrypted || (sensitive && !src_loc.trusted),
        force_encrypt: options.force_encrypt,
    };
    let action = action_for(decide(&input), input.already_encrypted).ok_or_else(|| {
        SyncError::MixedSensitivity(format!(
            "\"{}\" contains sensitive content; pick it separately or pass --encrypt",
            picked.display()
        ))
    })?;

    let dst_dir = match &destination.relative_path {
        Some(path) => path.clone(),
        None => picked.parent().map(Path::to_path_buf).unwrap_or_default(),
    };

    Ok(TransferPlan::draft(
        PlanOrigin::Pick {
            path: picked.to_path_buf(),
        },
        src_loc.path_of(picked),
        dst_loc.path_of(&dst_dir),
        TransferScope::Item,
        action,
        select_mode(inherited.mode, options.mode_override),
        Vec::new(),
        options.remove_extraneous,
    ))
}

fn assign_identity(plans: &mut [TransferPlan]) {
    for (i, plan) in plans.iter_mut().enumerate() {
        plan.index = i + 1;
        let digest = blake3::hash(
            format!(
                "{}|{}|{}|{:?}|{:?}",
                plan.index, plan.source, plan.destination, plan.action, plan.scope
            )
            .as_bytes(),
        );
        plan.id = digest.to_hex().as_str()[..PLAN_ID_LENGTH_HEX].to_string();
    }
}

fn validate_plans(config: &Config, plans: &[TransferPlan]) -> Result<()> {
    for plan in plans {
        if plan.source.is_remote() && plan.destination.is_remote() {
            return Err(SyncError::Config(format!(
                "plan {}: source and destination cannot both be remote",
                plan.index
            )));
        }
        if plan.action.needs_crypto() && config.encryption.is_none() {
            return Err(SyncError::MissingEncryptionConfig(format!(
                "plan {} ({})",
                plan.index,
                plan.describe()
            )));
        }
        if plan.action == Action::EncryptThenTransfer && plan.source.is_remote() {
            return Err(SyncError::Config(format!(
                "plan {}: encryption requires a local source, got {}",
                plan.index, plan.source
            )));
        }
    }
    Ok(())
}
