//! Configuration inspection command.
//!
//! - List every key with its effective value
//! - Get a single value
//! - Show config file paths

use super::{OutputMode, load_sync_config};
use crate::cli::ConfigCommands;
use crate::config::{CliOverrides, KNOWN_KEYS, normalize_key, user_config_path, vault_config_path};
use crate::error::{Result, SyncError};
use serde_json::{Map, Value, json};
use std::path::Path;

/// Execute the config command.
///
/// # Errors
///
/// Returns an error if a config layer is invalid or the key is unknown.
pub fn execute(
    command: &ConfigCommands,
    vault: &Path,
    explicit: Option<&Path>,
    overrides: &CliOverrides,
    output: OutputMode,
) -> Result<()> {
    match command {
        ConfigCommands::List => list(vault, explicit, overrides, output),
        ConfigCommands::Get { key } => get(key, vault, explicit, overrides, output),
        ConfigCommands::Path => paths(vault, explicit, output),
    }
}

fn list(
    vault: &Path,
    explicit: Option<&Path>,
    overrides: &CliOverrides,
    output: OutputMode,
) -> Result<()> {
    let config = load_sync_config(vault, explicit, overrides)?;
    let pairs = config.to_pairs();

    if output.json {
        let map: Map<String, Value> = pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), Value::String(value)))
            .collect();
        println!("{}", serde_json::to_string(&map)?);
    } else if output.show_text() {
        for (key, value) in pairs {
            println!("{key}: {value}");
        }
    }
    Ok(())
}

fn get(
    key: &str,
    vault: &Path,
    explicit: Option<&Path>,
    overrides: &CliOverrides,
    output: OutputMode,
) -> Result<()> {
    let canonical = normalize_key(key);
    if !KNOWN_KEYS.contains(&canonical.as_str()) {
        return Err(SyncError::validation(
            "key",
            format!("unknown config key '{key}'"),
        ));
    }

    let config = load_sync_config(vault, explicit, overrides)?;
    let value = config
        .to_pairs()
        .into_iter()
        .find_map(|(k, v)| (k == canonical).then_some(v))
        .unwrap_or_default();

    if output.json {
        println!("{}", json!({ "key": canonical, "value": value }));
    } else if !output.quiet {
        println!("{value}");
    }
    Ok(())
}

fn paths(vault: &Path, explicit: Option<&Path>, output: OutputMode) -> Result<()> {
    let user = user_config_path();
    let vault_path = vault_config_path(vault);

    if output.json {
        let payload = json!({
            "user": user.as_ref().map(|p| p.display().to_string()),
            "vault": vault_path.display().to_string(),
            "explicit": explicit.map(|p| p.display().to_string()),
        });
        println!("{payload}");
    } else if output.show_text() {
        match &user {
            Some(path) => println!("user:  {}", path.display()),
            None => println!("user:  (HOME not set)"),
        }
        println!("vault: {}", vault_path.display());
        if let Some(path) = explicit {
            println!("extra: {}", path.display());
        }
    }
    Ok(())
}
