//! `ironlog doctor` — diagnose setup problems.

use super::runtime::{self, CliResult};
use ironlog_channels::SignatureVerifier;
use ironlog_config::{AppConfig, ConfigError};
use ironlog_core::Provider;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> CliResult<()> {
    println!("🩺 IronLog Doctor — Setup Diagnostics");
    println!("=====================================\n");

    let mut issues = 0;
    let path = runtime::config_file(config_path);

    if path.exists() {
        println!("  ✅ Config file found: {}", path.display());
    } else {
        println!("  ⚠️  No config file at {} — run `ironlog onboard`", path.display());
        issues += 1;
    }

    let config = match AppConfig::load_path(&path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  {} issue(s) found. See above for details.", issues + 1);
            return Ok(());
        }
    };

    match config.validate_for_serve() {
        Ok(()) => println!("  ✅ All settings required by `ironlog serve` are present"),
        Err(ConfigError::Missing(missing)) => {
            for setting in &missing {
                println!("  ❌ Missing: {setting}");
            }
            issues += missing.len();
        }
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    if let Some(key) = config.discord.public_key.as_deref() {
        match SignatureVerifier::from_hex(key) {
            Ok(_) => println!("  ✅ Discord public key parses"),
            Err(e) => {
                println!("  ❌ Discord public key: {e}");
                issues += 1;
            }
        }
    }

    if config.api_key.is_some() {
        match ironlog_providers::build_from_config(&config) {
            Ok(provider) => match provider.health_check().await {
                Ok(true) => println!("  ✅ Provider '{}' reachable", provider.name()),
                Ok(false) => {
                    println!("  ⚠️  Provider '{}' rejected the health check", provider.name());
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Provider '{}' unreachable: {e}", provider.name());
                    issues += 1;
                }
            },
            Err(e) => {
                println!("  ❌ Provider: {e}");
                issues += 1;
            }
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
