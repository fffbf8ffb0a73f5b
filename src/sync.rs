// src/sync.rs
//! Invocation surface: `run(source, destination, options)`

use std::path::PathBuf;

use tracing::info;

use crate::cancel::CancelToken;
use crate::config::Config;
use crate::crypto::Cipher;
use crate::endpoint::resolve_endpoint;
use crate::enums::EncryptionMode;
use crate::error::Result;
use crate::matching::PairingPrompt;
use crate::pipeline::{Pipeline, RunReport};
use crate::plan::{build_plans, TransferPlan};
use crate::prompt::PlanApproval;
use crate::transfer::Transfer;

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub dry_run: bool,
    /// Delete destination files that do not exist at the source
    pub remove_extraneous: bool,
    /// Ask the operator to pair directories instead of pairing by position
    pub manual_match: bool,
    /// Skip the confirmation prompt
    pub assume_yes: bool,
    pub force_encrypt: bool,
    pub mode_override: Option<EncryptionMode>,
    pub config_path: Option<PathBuf>,
}

pub struct Syncer<'a> {
    config: &'a Config,
    transfer: &'a dyn Transfer,
    cipher: &'a dyn Cipher,
    cancel: CancelToken,
}

impl<'a> Syncer<'a> {
    pub fn new(
        config: &'a Config,
        transfer: &'a dyn Transfer,
        cipher: &'a dyn Cipher,
        cancel: CancelToken,
    ) -> Self {
        Self {
            config,
            transfer,
            cipher,
            cancel,
        }
    }

    /// Resolve both endpoints and build the plan list. Nothing runs yet.
    pub fn plan(
        &self,
        source: &str,
        destination: &str,
        options: &SyncOptions,
        pairing: &mut dyn PairingPrompt,
    ) -> Result<Vec<TransferPlan>> {
        let src = resolve_endpoint(source, self.config)?;
        let dst = resolve_endpoint(destination, self.config)?;
        build_plans(self.config, &src, &dst, options, pairing)
    }

    fn pipeline(&self, options: &SyncOptions) -> Pipeline<'_> {
        Pipeline::new(
            self.transfer,
            self.cipher,
            self.config.encryption.as_ref().map(|e| e.tmp_dir.as_path()),
            &self.cancel,
            options.dry_run,
        )
    }

    /// Workspace preflight, then operator approval. `None` when the
    /// operator declined every plan.
    pub fn approve(
        &self,
        plans: Vec<TransferPlan>,
        options: &SyncOptions,
        approval: &mut dyn PlanApproval,
    ) -> Result<Option<Vec<TransferPlan>>> {
        if plans.is_empty() {
            return Ok(Some(plans));
        }
        self.pipeline(options).preflight(&plans)?;

        if options.assume_yes {
            return Ok(Some(plans));
        }
        let selected = approval.approve_plans(&plans, options)?;
        if selected.is_empty() {
            info!("No plans selected, nothing was changed.");
            return Ok(None);
        }
        Ok(Some(
            plans
                .into_iter()
                .enumerate()
                .filter(|(i, _)| selected.contains(i))
                .map(|(_, p)| p)
                .collect(),
        ))
    }

    /// Run plans that already passed [`Syncer::approve`]
    pub fn execute_approved(&self, plans: Vec<TransferPlan>, options: &SyncOptions) -> RunReport {
        if plans.is_empty() {
            info!("Nothing to synchronize.");
            return RunReport::default();
        }
        self.pipeline(options).execute_all(plans)
    }

    /// Workspace preflight, operator approval, then the pipeline
    pub fn execute(
        &self,
        plans: Vec<TransferPlan>,
        options: &SyncOptions,
        approval: &mut dyn PlanApproval,
    ) -> Result<RunReport> {
        Ok(match self.approve(plans, options, approval)? {
            Some(plans) => self.execute_approved(plans, options),
            None => RunReport::declined(),
        })
    }

    pub fn run<O: PairingPrompt + PlanApproval>(
        &self,
        source: &str,
        destination: &str,
        options: &SyncOptions,
        operator: &mut O,
    ) -> Result<RunReport> {
        let plans = self.plan(source, destination, options, operator)?;
        self.execute(plans, options, operator)
    }
}
