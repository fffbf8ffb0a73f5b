// src/bin/syncbuddy.rs
//! syncbuddy: sync directories between locations, encrypting on the way out

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use syncbuddy::export::export_plans_to_json;
use syncbuddy::preflight::check_tools;
use syncbuddy::prompt::TerminalPrompt;
use syncbuddy::{
    load_config, CancelToken, EncryptionMode, GpgCipher, Rsync, RunReport, SyncError,
    SyncOptions, Syncer,
};

#[derive(Debug, Parser)]
#[command(name = "syncbuddy", version, about)]
struct Cli {
    /// Source endpoint: `location` or `location:relative/path`
    #[arg(long)]
    src: String,

    /// Destination endpoint: `location` or `location:relative/path`
    #[arg(long)]
    dst: String,

    /// Configuration file (default: $SYNCBUDDY_CONFIG, ./config.toml,
    /// ~/.config/syncbuddy/config.toml, /etc/syncbuddy/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show what would be transferred without changing anything
    #[arg(long)]
    dry: bool,

    /// Delete files at the destination that do not exist at the source
    #[arg(long)]
    remove: bool,

    /// Pair source and destination directories interactively
    #[arg(long = "match")]
    manual_match: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    yes: bool,

    /// Encrypt a picked path even if the destination is trusted
    #[arg(long)]
    encrypt: bool,

    /// Encryption granularity for this run: `archive` or `per-file`
    #[arg(long)]
    mode: Option<EncryptionMode>,

    /// Write the planned transfers as JSON and exit
    #[arg(long, value_name = "PATH")]
    export_plan: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> SyncOptions {
        SyncOptions {
            dry_run: self.dry,
            remove_extraneous: self.remove,
            manual_match: self.manual_match,
            assume_yes: self.yes,
            force_encrypt: self.encrypt,
            mode_override: self.mode,
            config_path: self.config.clone(),
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<u8> {
    let options = cli.options();
    let config = load_config(options.config_path.as_deref())?;

    let cancel = CancelToken::new();
    let transfer = Rsync::new();
    let cipher = GpgCipher::from_config(&config);
    let syncer = Syncer::new(&config, &transfer, &cipher, cancel.clone());

    let stdin = io::stdin();
    let mut operator = TerminalPrompt::new(stdin.lock(), io::stdout());

    let plans = syncer.plan(&cli.src, &cli.dst, &options, &mut operator)?;

    if let Some(path) = &cli.export_plan {
        export_plans_to_json(&plans, path)
            .with_context(|| format!("Failed to export plans to {}", path.display()))?;
        return Ok(0);
    }

    check_tools(&plans)?;

    let Some(plans) = syncer.approve(plans, &options, &mut operator)? else {
        info!("Nothing was transferred.");
        return Ok(RunReport::declined().exit_code());
    };

    // Interrupts at the prompts above end the process directly.
    cancel.arm().context("Failed to install interrupt handlers")?;
    let report = syncer.execute_approved(plans, &options);
    Ok(report.exit_code())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            error!("{err:#}");
            let configuration = err
                .downcast_ref::<SyncError>()
                .is_some_and(SyncError::is_configuration);
            ExitCode::from(if configuration { 2 } else { 1 })
        }
    }
}
