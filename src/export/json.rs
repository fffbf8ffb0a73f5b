// src/export/json.rs
use std::fs;
use std::path::Path;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use crate::error::Result;
use crate::plan::TransferPlan;

pub const EXPORT_FORMAT: &str = "syncbuddy-plan-v1";

/// Plan list as a self-describing JSON document
pub fn plans_to_json(plans: &[TransferPlan]) -> Result<Value> {
    Ok(json!({
        "export_format": EXPORT_FORMAT,
        "exported_at": Utc::now().to_rfc3339(),
        "exporter_version": env!("CARGO_PKG_VERSION"),
        "total_plans": plans.len(),
        "plans": serde_json::to_value(plans)?,
    }))
}

/// Write the plan list to `path` for review or scripting. Nothing runs.
pub fn export_plans_to_json(plans: &[TransferPlan], path: &Path) -> Result<()> {
    let document = plans_to_json(plans)?;
    fs::write(path, serde_json::to_string_pretty(&document)?)?;
    info!("Exported {} plan(s) to {}", plans.len(), path.display());
    Ok(())
}
