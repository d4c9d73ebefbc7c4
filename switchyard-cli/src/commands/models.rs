//! Model selection commands.
//!
//! Provides commands for listing models, viewing details, and switching
//! the active model.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use switchyard_models::{
    AuthType, Error, GenerationConfig, ModelCapabilities, SelectionManager, SelectionOptions,
    SelectionSource, SwitchMetadata,
};
use tracing::debug;

use crate::config::{ConfigLoader, SettingsWriter, SwitchyardConfig};

/// Models management arguments.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommands,
}

/// Models subcommands.
#[derive(Subcommand, Debug)]
pub enum ModelsCommands {
    /// List available models
    List {
        /// Auth type to list (defaults to the active one)
        #[arg(long)]
        auth_type: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show detailed model information
    Info {
        /// Model id (e.g., coder-model, gpt-4o)
        model: String,

        /// Auth type to look the model up in
        #[arg(long)]
        auth_type: Option<String>,
    },
    /// Show the active model
    Current {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Switch the active model and save the choice
    Switch {
        /// Model id of the active auth type
        model: String,

        /// Why the switch is made (recorded in logs)
        #[arg(long)]
        reason: Option<String>,
    },
    /// List auth types with registered models
    Providers,
}

/// Run models command.
pub async fn run(args: ModelsArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let manager = build_manager(&config)?;

    match args.command {
        ModelsCommands::List { auth_type, json } => list_models(&manager, auth_type, json).await,
        ModelsCommands::Info { model, auth_type } => {
            show_model_info(&manager, &model, auth_type).await
        }
        ModelsCommands::Current { json } => show_current(&manager, json).await,
        ModelsCommands::Switch { model, reason } => switch_model(&manager, &model, reason).await,
        ModelsCommands::Providers => list_providers(&manager).await,
    }
}

/// Build a selection manager from the loaded configuration.
fn build_manager(config: &SwitchyardConfig) -> Result<SelectionManager> {
    let mut options = SelectionOptions::new().auth_type(config.security.auth.selected_type.clone());
    if let Some(name) = &config.model.name {
        options = options.model_id(name.clone());
    }

    let manager = SelectionManager::from_catalog(Some(&config.model_providers), options)
        .context("Invalid model_providers configuration")?;
    debug!(
        "Registered {} models",
        manager.registry().model_count()
    );
    Ok(manager)
}

/// List models of one auth type.
async fn list_models(
    manager: &SelectionManager,
    auth_type: Option<String>,
    json: bool,
) -> Result<()> {
    let current_auth = manager.current_auth_type().await;
    let current_id = manager.current_model_id().await;
    let auth_type = auth_type.map(AuthType::from).unwrap_or_else(|| current_auth.clone());

    let models = manager.available_models_for(&auth_type);

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    if models.is_empty() {
        println!("No models registered for '{}'.", auth_type);
        println!();
        println!(
            "Add models under [[model_providers.{}]] in {}",
            auth_type,
            ConfigLoader::user_config_path().display()
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("").fg(Color::Cyan),
        Cell::new("Model").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Capabilities").fg(Color::Cyan),
        Cell::new("Description").fg(Color::Cyan),
    ]);

    for model in models {
        let active = model.auth_type == current_auth && model.id == current_id;
        let marker = if active {
            Cell::new("*").fg(Color::Green)
        } else {
            Cell::new("")
        };

        table.add_row(vec![
            marker,
            Cell::new(&model.id),
            Cell::new(&model.label),
            Cell::new(format_capabilities(&model.capabilities)),
            Cell::new(model.description.as_deref().unwrap_or("-")),
        ]);
    }

    println!("{table}");
    Ok(())
}

/// Show detailed information about a specific model.
async fn show_model_info(
    manager: &SelectionManager,
    model_id: &str,
    auth_type: Option<String>,
) -> Result<()> {
    let current_auth = manager.current_auth_type().await;

    // Without an explicit auth type, prefer the active one
    let offered_by = manager.auth_types_for_model(model_id, Some(&current_auth));
    let model = match auth_type {
        Some(auth_type) => manager.get_model(&AuthType::from(auth_type), model_id),
        None => offered_by
            .first()
            .and_then(|auth_type| manager.get_model(auth_type, model_id)),
    };

    let Some(model) = model else {
        bail!("Model '{}' not found", model_id);
    };

    println!("Model: {}", model.id);
    println!("Name: {}", model.name);
    println!("Auth type: {}", model.auth_type);
    println!("Base URL: {}", display_or_dash(&model.base_url));
    if let Some(description) = &model.description {
        println!("Description: {}", description);
    }
    println!();

    println!("Capabilities:");
    println!(
        "  Vision: {}",
        if model.capabilities.vision { "yes" } else { "no" }
    );
    println!();

    println!("Generation config:");
    for (key, value) in format_generation_config(&model.generation_config) {
        println!("  {}: {}", key, value);
    }

    let others: Vec<_> = offered_by
        .iter()
        .filter(|a| **a != model.auth_type)
        .map(AuthType::as_str)
        .collect();
    if !others.is_empty() {
        println!();
        println!("Also offered by: {}", others.join(", "));
    }

    Ok(())
}

/// Show the active model.
async fn show_current(manager: &SelectionManager, json: bool) -> Result<()> {
    let current = match manager.current_model().await {
        Ok(current) => current,
        Err(Error::NoModelSelected { auth_type }) => {
            bail!(
                "No model selected for '{}'. Add models under [[model_providers.{}]]",
                auth_type,
                auth_type
            );
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&current)?);
        return Ok(());
    }

    println!("Auth type: {}", current.auth_type);
    println!("Model: {} ({})", current.model_id, current.model.name);
    println!("Source: {}", current.source);
    println!("Selected at: {}", current.selected_at.to_rfc3339());
    Ok(())
}

/// Switch the active model, persisting the choice to the user config.
async fn switch_model(
    manager: &SelectionManager,
    model_id: &str,
    reason: Option<String>,
) -> Result<()> {
    manager
        .set_change_handler(Arc::new(SettingsWriter::user()))
        .await;

    let previous = manager.current_model_id().await;
    let metadata = SwitchMetadata {
        reason,
        context: Some("switchyard models switch".to_string()),
    };

    match manager
        .switch_model(model_id, SelectionSource::UserManual, metadata)
        .await
    {
        Ok(model) => {
            println!(
                "Switched model: {} -> {} ({})",
                display_or_dash(&previous),
                model.id,
                model.auth_type
            );
            println!("Saved to {}", ConfigLoader::user_config_path().display());

            let project_path = ConfigLoader::project_config_path();
            if let Some(name) = project_model_override(&project_path, &model.id) {
                eprintln!(
                    "Warning: {} sets model.name = \"{}\", which takes precedence over this choice",
                    project_path.display(),
                    name
                );
            }
            Ok(())
        }
        Err(Error::ModelNotFound {
            auth_type,
            model_id,
        }) => {
            let elsewhere = manager.auth_types_for_model(&model_id, None);
            if elsewhere.is_empty() {
                bail!(
                    "Model '{}' not found for '{}'. Run `switchyard models list` to see available models.",
                    model_id,
                    auth_type
                );
            }
            let names: Vec<_> = elsewhere.iter().map(AuthType::as_str).collect();
            bail!(
                "Model '{}' is not offered by '{}' (available via: {})",
                model_id,
                auth_type,
                names.join(", ")
            );
        }
        Err(e) => Err(anyhow::Error::from(e).context("Failed to switch model")),
    }
}

/// List auth types with their model counts and defaults.
async fn list_providers(manager: &SelectionManager) -> Result<()> {
    let current_auth = manager.current_auth_type().await;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("").fg(Color::Cyan),
        Cell::new("Auth type").fg(Color::Cyan),
        Cell::new("Models").fg(Color::Cyan),
        Cell::new("Default").fg(Color::Cyan),
    ]);

    let registry = manager.registry();
    for auth_type in registry.auth_types() {
        let marker = if *auth_type == current_auth { "*" } else { "" };
        let default = registry
            .default_model(auth_type)
            .map(|m| m.id.as_str())
            .unwrap_or("-");

        table.add_row(vec![
            Cell::new(marker),
            Cell::new(auth_type),
            Cell::new(registry.list_models(auth_type).len()),
            Cell::new(default),
        ]);
    }

    println!("{table}");
    Ok(())
}

/// Format capabilities as a comma-separated string.
fn format_capabilities(caps: &ModelCapabilities) -> String {
    let mut parts = Vec::new();

    if caps.vision {
        parts.push("vision");
    }

    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}

/// Format the set fields of a generation config as (key, value) pairs.
fn format_generation_config(config: &GenerationConfig) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();

    let mut push = |key: &'static str, value: Option<String>| {
        if let Some(value) = value {
            rows.push((key, value));
        }
    };

    push("temperature", config.temperature.map(|v| v.to_string()));
    push("top_p", config.top_p.map(|v| v.to_string()));
    push("top_k", config.top_k.map(|v| v.to_string()));
    push("presence_penalty", config.presence_penalty.map(|v| v.to_string()));
    push("frequency_penalty", config.frequency_penalty.map(|v| v.to_string()));
    push("repetition_penalty", config.repetition_penalty.map(|v| v.to_string()));
    push("max_tokens", config.max_tokens.map(|v| v.to_string()));
    push("timeout", config.timeout.map(|v| format!("{v}ms")));
    push("max_retries", config.max_retries.map(|v| v.to_string()));
    push(
        "disable_cache_control",
        config.disable_cache_control.map(|v| v.to_string()),
    );

    rows
}

/// The project config's `model.name`, if it differs from `model_id`.
fn project_model_override(project_config: &Path, model_id: &str) -> Option<String> {
    let project = ConfigLoader::load_from_path(project_config).ok()?;
    project.model.name.filter(|name| name != model_id)
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_models::ModelDefinition;

    #[test]
    fn format_capabilities_vision() {
        assert_eq!(format_capabilities(&ModelCapabilities::vision()), "vision");
    }

    #[test]
    fn format_capabilities_empty() {
        assert_eq!(format_capabilities(&ModelCapabilities::default()), "-");
    }

    #[test]
    fn format_generation_config_skips_unset_fields() {
        let rows = format_generation_config(&GenerationConfig::DEFAULT);
        let keys: Vec<_> = rows.iter().map(|(k, _)| *k).collect();

        assert_eq!(
            keys,
            vec!["temperature", "top_p", "max_tokens", "timeout", "max_retries"]
        );
        assert!(rows.contains(&("timeout", "60000ms".to_string())));
    }

    #[test]
    fn project_model_override_reports_different_name() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[model]\nname = \"gpt-4o-mini\"\n").unwrap();

        assert_eq!(
            project_model_override(&path, "gpt-4o").as_deref(),
            Some("gpt-4o-mini")
        );
        assert_eq!(project_model_override(&path, "gpt-4o-mini"), None);
    }

    #[test]
    fn project_model_override_ignores_missing_or_unset() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        assert_eq!(project_model_override(&missing, "gpt-4o"), None);

        let unset = temp_dir.path().join("config.toml");
        std::fs::write(&unset, "[ui]\ntheme = \"dark\"\n").unwrap();
        assert_eq!(project_model_override(&unset, "gpt-4o"), None);
    }

    #[test]
    fn display_or_dash_replaces_empty() {
        assert_eq!(display_or_dash(""), "-");
        assert_eq!(display_or_dash("x"), "x");
    }

    #[tokio::test]
    async fn build_manager_uses_configured_selection() {
        let mut config = SwitchyardConfig::default();
        config.security.auth.selected_type = AuthType::OPENAI;
        config.model.name = Some("o3".to_string());
        config.model_providers.insert(
            AuthType::OPENAI,
            vec![ModelDefinition::new("gpt-4o"), ModelDefinition::new("o3")],
        );

        let manager = build_manager(&config).unwrap();

        assert_eq!(manager.current_auth_type().await, AuthType::OPENAI);
        assert_eq!(manager.current_model_id().await, "o3");
        assert_eq!(manager.selection_source().await, SelectionSource::Settings);
    }

    #[test]
    fn build_manager_rejects_invalid_catalog() {
        let mut config = SwitchyardConfig::default();
        config
            .model_providers
            .insert(AuthType::OPENAI, vec![ModelDefinition::default()]);

        let err = build_manager(&config).err().unwrap();
        assert!(err.to_string().contains("Invalid model_providers"));
    }
}
