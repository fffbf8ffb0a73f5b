// src/export/mod.rs
pub mod json;

pub use json::{export_plans_to_json, plans_to_json};
