// tests/export_tests.rs
mod common;

use std::path::Path;

use common::Scripted;
use syncbuddy::export::{export_plans_to_json, plans_to_json};
use syncbuddy::plan::build_plans;
use syncbuddy::{resolve_endpoint, SyncOptions};
use tempfile::tempdir;

#[test]
fn plans_export_as_versioned_json() {
    common::setup();
    let config = common::fixture_config(Path::new("/srv/sync"));
    let src = resolve_endpoint("laptop", &config).unwrap();
    let dst = resolve_endpoint("usb", &config).unwrap();
    let plans = build_plans(
        &config,
        &src,
        &dst,
        &SyncOptions::default(),
        &mut Scripted::default(),
    )
    .unwrap();

    let doc = plans_to_json(&plans).unwrap();
    assert_eq!(doc["export_format"], "syncbuddy-plan-v1");
    assert_eq!(doc["total_plans"], 3);
    assert_eq!(doc["plans"][0]["action"], "encrypt-then-transfer");
    assert_eq!(doc["plans"][0]["encryption_mode"], "archive");
    assert_eq!(doc["plans"][2]["origin"]["kind"], "subfolder");
    assert_eq!(doc["plans"][1]["source"]["path"], "/srv/sync/laptop/photos");

    let dir = tempdir().unwrap();
    let out = dir.path().join("plans.json");
    export_plans_to_json(&plans, &out).unwrap();
    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(parsed["plans"].as_array().unwrap().len(), 3);
}
