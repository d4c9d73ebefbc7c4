use super::types::{
    AuthConfig, ModelConfig, RawAuthConfig, RawModelConfig, RawSecurityConfig,
    RawSwitchyardConfig, SecurityConfig, SwitchyardConfig,
};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<SwitchyardConfig> {
        let mut raw = RawSwitchyardConfig::default();

        // Layer 1: User config
        if let Some(user_config) = Self::read_raw(&Self::user_config_path())? {
            raw = Self::merge_raw(raw, user_config);
        }

        // Layer 2: Project config
        if let Some(project_config) = Self::read_raw(&Self::project_config_path())? {
            raw = Self::merge_raw(raw, project_config);
        }

        // Convert to final config with defaults applied
        Ok(Self::finalize(raw))
    }

    /// Get user config path
    pub fn user_config_path() -> PathBuf {
        switchyard_paths::user_config_file()
    }

    /// Get project config path
    /// Can be overridden with SWITCHYARD_PROJECT_CONFIG_DIR env var (useful for isolated e2e tests)
    pub fn project_config_path() -> PathBuf {
        switchyard_paths::project_config_file()
    }

    fn read_raw(path: &Path) -> Result<Option<RawSwitchyardConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        debug!("Loading config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Ok(Some(toml::from_str(&contents)?))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    ///
    /// Provider catalogs merge per auth type: an overlay list replaces the
    /// base list for the same auth type, other auth types are kept.
    fn merge_raw(base: RawSwitchyardConfig, overlay: RawSwitchyardConfig) -> RawSwitchyardConfig {
        let mut model_providers = base.model_providers;
        model_providers.extend(overlay.model_providers);

        RawSwitchyardConfig {
            security: RawSecurityConfig {
                auth: RawAuthConfig {
                    selected_type: overlay
                        .security
                        .auth
                        .selected_type
                        .or(base.security.auth.selected_type),
                },
            },
            model: RawModelConfig {
                name: overlay.model.name.or(base.model.name),
            },
            model_providers,
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawSwitchyardConfig) -> SwitchyardConfig {
        SwitchyardConfig {
            security: SecurityConfig {
                auth: AuthConfig {
                    selected_type: raw.security.auth.selected_type.unwrap_or_default(),
                },
            },
            model: ModelConfig {
                name: raw.model.name.filter(|name| !name.is_empty()),
            },
            model_providers: raw.model_providers,
        }
    }

    /// Load a single config file without layering
    pub fn load_from_path(path: &Path) -> Result<SwitchyardConfig> {
        match Self::read_raw(path)? {
            Some(raw) => Ok(Self::finalize(raw)),
            None => Ok(SwitchyardConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use switchyard_models::AuthType;
    use tempfile::TempDir;

    fn raw_from(toml_str: &str) -> RawSwitchyardConfig {
        toml::from_str(toml_str).unwrap()
    }

    // ==================== Load Tests ====================

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.toml");

        let config = ConfigLoader::load_from_path(&path).unwrap();

        assert_eq!(config.security.auth.selected_type, AuthType::QWEN_OAUTH);
        assert!(config.model.name.is_none());
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("invalid.toml");

        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "this is not valid toml {{{{").unwrap();

        assert!(ConfigLoader::load_from_path(&path).is_err());
    }

    #[test]
    fn test_load_empty_model_name_is_unset() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[model]\nname = \"\"\n").unwrap();

        let config = ConfigLoader::load_from_path(&path).unwrap();
        assert!(config.model.name.is_none());
    }

    #[test]
    #[serial]
    fn test_load_layers_project_over_user() {
        let user_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();

        let user_config = user_dir.path().join("switchyard").join("config.toml");
        std::fs::create_dir_all(user_config.parent().unwrap()).unwrap();
        std::fs::write(
            &user_config,
            r#"
[security.auth]
selected_type = "openai"

[model]
name = "gpt-4o"

[[model_providers.openai]]
id = "gpt-4o"
"#,
        )
        .unwrap();
        std::fs::write(
            project_dir.path().join("config.toml"),
            r#"
[model]
name = "o3"

[[model_providers.local]]
id = "llama3"
"#,
        )
        .unwrap();

        // SAFETY: env-mutating tests are serialized
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", user_dir.path());
            std::env::set_var("SWITCHYARD_PROJECT_CONFIG_DIR", project_dir.path());
        }
        let config = ConfigLoader::load();
        unsafe {
            std::env::remove_var("XDG_CONFIG_HOME");
            std::env::remove_var("SWITCHYARD_PROJECT_CONFIG_DIR");
        }
        let config = config.unwrap();

        assert_eq!(config.security.auth.selected_type, AuthType::OPENAI);
        assert_eq!(config.model.name.as_deref(), Some("o3"));
        assert!(config.model_providers.contains_key(&AuthType::OPENAI));
        assert!(config.model_providers.contains_key(&AuthType::from("local")));
    }

    // ==================== Merge Tests ====================

    #[test]
    fn test_merge_raw_overlay_overrides_base() {
        let base = raw_from(
            r#"
[security.auth]
selected_type = "openai"

[model]
name = "base-model"
"#,
        );
        let overlay = raw_from(
            r#"
[model]
name = "overlay-model"
"#,
        );

        let merged = ConfigLoader::merge_raw(base, overlay);

        // None in overlay preserves base
        assert_eq!(merged.security.auth.selected_type, Some(AuthType::OPENAI));
        assert_eq!(merged.model.name, Some("overlay-model".to_string()));
    }

    #[test]
    fn test_merge_raw_replaces_catalog_per_auth_type() {
        let base = raw_from(
            r#"
[[model_providers.openai]]
id = "gpt-4o"

[[model_providers.openai]]
id = "gpt-4o-mini"

[[model_providers.local]]
id = "llama3"
"#,
        );
        let overlay = raw_from(
            r#"
[[model_providers.openai]]
id = "o3"
"#,
        );

        let merged = ConfigLoader::merge_raw(base, overlay);

        let openai: Vec<_> = merged.model_providers[&AuthType::OPENAI]
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(openai, vec!["o3"]);
        assert_eq!(merged.model_providers[&AuthType::from("local")].len(), 1);
    }

    #[test]
    fn test_finalize_applies_defaults() {
        let config = ConfigLoader::finalize(RawSwitchyardConfig::default());
        assert_eq!(config.security.auth.selected_type, AuthType::QWEN_OAUTH);
        assert!(config.model.name.is_none());
    }
}
