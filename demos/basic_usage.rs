// SPDX-License-Identifier: MIT OR Apache-2.0

//! Basic usage example for the configuration crate.
//!
//! This example demonstrates:
//! - Resolving configuration from env files and injected process variables
//! - Reading typed values by dotted path
//! - Validation findings and posture advisories
//! - Runtime updates with change listeners
//! - Masked export
//!
//! To run this example:
//! ```bash
//! cargo run --example basic_usage
//! ```

use miaoda_config::prelude::*;
use std::fs;
use std::sync::Arc;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    println!("=== Miaoda Configuration: Basic Usage ===\n");

    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join(".env.example"),
        "APP_NAME=miaoda\nOPENAI_API_KEY=\nWINDOW_WIDTH=1280\n",
    )?;
    fs::write(dir.path().join(".env.development"), "DEBUG_MODE=1\nHMR_PORT=1421\n")?;
    fs::write(dir.path().join(".env.local"), "OPENAI_API_KEY=sk-local-demo\n")?;

    let mut manager = ConfigManager::builder()
        .environment(Environment::Development)
        .root(dir.path())
        .process_env([("PORT", "3000")])
        .build();
    manager.load()?;

    println!("--- Example 1: Typed Values ---");
    for path in ["base.port", "ui.window.width", "devTools.debug.enabled", "ui.theme.default"] {
        println!("{} = {}", path, manager.require(path)?);
    }
    println!();

    println!("--- Example 2: Validation ---");
    let result = manager.validate();
    println!(
        "valid: {} ({} errors, {} warnings)",
        result.is_valid,
        result.errors.len(),
        result.warnings.len()
    );
    for advisory in manager.posture() {
        println!("advisory: {}", advisory.message);
    }
    println!();

    println!("--- Example 3: Change Listeners ---");
    let subscription = manager.subscribe(Arc::new(|event: &ChangeEvent| {
        println!("{} changed: {} -> {}", event.key, event.old_value, event.new_value);
    }));
    manager.set("ui.theme.default", "dark")?;
    if let Err(e) = manager.set("ui.theme.colour", "blue") {
        println!("rejected: {}", e);
    }
    subscription.unsubscribe();
    println!();

    println!("--- Example 4: Masked Export ---");
    println!("{}", manager.export(ExportFormat::Json)?);

    Ok(())
}
