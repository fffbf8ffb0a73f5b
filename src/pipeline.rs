// src/pipeline.rs
//! Execution pipeline: runs plans one after another
//!
//! Per plan: `Planned → Preparing → [Encrypting] → Transferring →
//! [Decrypting → Transferring] → Done`, or `Failed` / `Aborted` from any
//! step. A plan whose local source does not exist ends `Skipped`. Crypto plans own a [`Workspace`] that is gone before the next plan
//! starts, whatever the outcome.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::cancel::CancelToken;
use crate::crypto::{decrypt_tree, encrypt_tree, Cipher};
use crate::enums::{Action, TransferScope};
use crate::error::{Result, SyncError};
use crate::filters::ExcludeSet;
use crate::plan::TransferPlan;
use crate::remote::LocationPath;
use crate::transfer::{Transfer, TransferRequest};
use crate::workspace::{self, Workspace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanState {
    Planned,
    Preparing,
    Encrypting,
    Transferring,
    Decrypting,
    Done,
    Skipped,
    Failed,
    Aborted,
}

#[derive(Debug)]
pub struct PlanOutcome {
    pub index: usize,
    pub description: String,
    pub state: PlanState,
    /// Step that was running when the plan failed or was aborted
    pub failed_in: Option<PlanState>,
    pub error: Option<SyncError>,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<PlanOutcome>,
    /// The operator declined every plan
    pub declined: bool,
}

impl RunReport {
    pub fn declined() -> Self {
        Self {
            outcomes: Vec::new(),
            declined: true,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| matches!(o.state, PlanState::Done | PlanState::Skipped))
    }

    pub fn cancelled(&self) -> bool {
        self.outcomes.iter().any(|o| o.state == PlanState::Aborted)
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.state == PlanState::Failed)
            .count()
    }

    /// 0 all done (or declined), 1 a plan failed, 130 interrupted
    pub fn exit_code(&self) -> u8 {
        if self.cancelled() {
            130
        } else if self.failed() > 0 {
            1
        } else {
            0
        }
    }
}

pub struct Pipeline<'a> {
    transfer: &'a dyn Transfer,
    cipher: &'a dyn Cipher,
    tmp_dir: Option<&'a Path>,
    cancel: &'a CancelToken,
    dry_run: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        transfer: &'a dyn Transfer,
        cipher: &'a dyn Cipher,
        tmp_dir: Option<&'a Path>,
        cancel: &'a CancelToken,
        dry_run: bool,
    ) -> Self {
        Self {
            transfer,
            cipher,
            tmp_dir,
            cancel,
            dry_run,
        }
    }

    /// Fail fast if any plan needs a workspace that cannot be created.
    pub fn preflight(&self, plans: &[TransferPlan]) -> Result<()> {
        let Some(plan) = plans.iter().find(|p| p.action.needs_crypto()) else {
            return Ok(());
        };
        workspace::probe(self.tmp_root(plan)?)
    }

    /// [`Self::preflight`], then every plan in order
    pub fn run(&self, plans: Vec<TransferPlan>) -> Result<RunReport> {
        self.preflight(&plans)?;
        Ok(self.execute_all(plans))
    }

    pub fn execute_all(&self, plans: Vec<TransferPlan>) -> RunReport {
        let total = plans.len();
        let mut report = RunReport::default();
        let mut plans = plans.into_iter();

        while let Some(plan) = plans.next() {
            info!("[{}/{total}] {}", plan.index, plan.describe());
            let outcome = self.execute(&plan);
            let aborted = outcome.state == PlanState::Aborted;
            report.outcomes.push(outcome);

            if aborted {
                for rest in plans.by_ref() {
                    report.outcomes.push(PlanOutcome {
                        index: rest.index,
                        description: rest.describe(),
                        state: PlanState::Aborted,
                        failed_in: Some(PlanState::Planned),
                        error: None,
                    });
                }
            }
        }

        if report.succeeded() {
            info!("All {total} plan(s) completed.");
        } else {
            warn!(
                "{} of {total} plan(s) failed{}.",
                report.failed(),
                if report.cancelled() { ", run interrupted" } else { "" }
            );
        }
        report
    }

    /// Run a single plan to a terminal state
    pub fn execute(&self, plan: &TransferPlan) -> PlanOutcome {
        if !self.cancel.is_cancelled() && !plan.source.is_remote() && !plan.source.path.exists() {
            warn!("Source {} does not exist. Nothing to synchronize!", plan.source);
            return PlanOutcome {
                index: plan.index,
                description: plan.describe(),
                state: PlanState::Skipped,
                failed_in: None,
                error: None,
            };
        }

        let mut state = PlanState::Planned;
        let result = self.cancel.check().and_then(|()| match plan.action {
            Action::Plain | Action::TransferOnlyAlreadyEncrypted => {
                state = PlanState::Transferring;
                self.transfer_direct(plan)
            }
            Action::EncryptThenTransfer => self.encrypt_then_transfer(plan, &mut state),
            Action::TransferThenDecrypt => self.transfer_then_decrypt(plan, &mut state),
        });

        let (final_state, failed_in, error) = match result {
            Ok(()) => (PlanState::Done, None, None),
            Err(e) if matches!(e, SyncError::Cancelled) || self.cancel.is_cancelled() => {
                warn!("Plan {} aborted while {state:?}.", plan.index);
                (PlanState::Aborted, Some(state), Some(e))
            }
            Err(e) => {
                error!("Plan {} failed while {state:?}: {e}", plan.index);
                (PlanState::Failed, Some(state), Some(e))
            }
        };

        PlanOutcome {
            index: plan.index,
            description: plan.describe(),
            state: final_state,
            failed_in,
            error,
        }
    }

    fn tmp_root(&self, plan: &TransferPlan) -> Result<&'a Path> {
        self.tmp_dir.ok_or_else(|| {
            SyncError::MissingEncryptionConfig(format!("plan {} ({})", plan.index, plan.describe()))
        })
    }

    fn send(
        &self,
        source: &LocationPath,
        destination: &LocationPath,
        scope: TransferScope,
        plan: &TransferPlan,
    ) -> Result<()> {
        self.transfer.transfer(&TransferRequest {
            source,
            destination,
            scope,
            excludes: &plan.exclude_patterns,
            delete_extraneous: plan.delete_extraneous,
            dry_run: self.dry_run,
        })
    }

    /// Ship a staging directory: the whole of it, or each child as an item
    fn send_staged(&self, staged: &Path, plan: &TransferPlan) -> Result<()> {
        match plan.scope {
            TransferScope::Contents => self.send(
                &LocationPath::local(staged),
                &plan.destination,
                TransferScope::Contents,
                plan,
            ),
            TransferScope::Item => {
                for child in sorted_children(staged)? {
                    self.cancel.check()?;
                    self.send(
                        &LocationPath::local(child),
                        &plan.destination,
                        TransferScope::Item,
                        plan,
                    )?;
                }
                Ok(())
            }
        }
    }

    fn transfer_direct(&self, plan: &TransferPlan) -> Result<()> {
        self.send(&plan.source, &plan.destination, plan.scope, plan)
    }

    fn encrypt_then_transfer(&self, plan: &TransferPlan, state: &mut PlanState) -> Result<()> {
        *state = PlanState::Preparing;
        let ws = Workspace::acquire(self.tmp_root(plan)?, &plan.workspace_label())?;
        let excludes = ExcludeSet::new(&plan.exclude_patterns)?;

        *state = PlanState::Encrypting;
        encrypt_tree(
            self.cipher,
            &plan.source.path,
            plan.scope,
            plan.encryption_mode,
            &excludes,
            &ws,
            self.cancel,
        )?;
        self.cancel.check()?;

        *state = PlanState::Transferring;
        self.send_staged(&ws.outbox(), plan)?;

        ws.release();
        Ok(())
    }

    fn transfer_then_decrypt(&self, plan: &TransferPlan, state: &mut PlanState) -> Result<()> {
        *state = PlanState::Preparing;
        let ws = Workspace::acquire(self.tmp_root(plan)?, &plan.workspace_label())?;

        *state = PlanState::Transferring;
        let inbox = LocationPath::local(ws.inbox());
        self.transfer.transfer(&TransferRequest {
            source: &plan.source,
            destination: &inbox,
            scope: plan.scope,
            excludes: &plan.exclude_patterns,
            delete_extraneous: false,
            dry_run: self.dry_run,
        })?;

        if self.dry_run {
            info!("Dry run: not decrypting {}", plan.source);
            ws.release();
            return Ok(());
        }
        self.cancel.check()?;

        *state = PlanState::Decrypting;
        decrypt_tree(self.cipher, &ws.inbox(), &ws.plain(), &ws.scratch(), self.cancel)?;
        self.cancel.check()?;

        *state = PlanState::Transferring;
        self.send_staged(&ws.plain(), plan)?;

        ws.release();
        Ok(())
    }
}

fn sorted_children(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut children = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    children.sort();
    Ok(children)
}
