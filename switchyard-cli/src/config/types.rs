use serde::{Deserialize, Serialize};
use switchyard_models::{AuthType, ModelCatalog};

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSwitchyardConfig {
    #[serde(default)]
    pub security: RawSecurityConfig,

    #[serde(default)]
    pub model: RawModelConfig,

    /// Model catalogs keyed by auth type
    #[serde(default)]
    pub model_providers: ModelCatalog,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSecurityConfig {
    #[serde(default)]
    pub auth: RawAuthConfig,
}

/// Auth config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawAuthConfig {
    /// Auth type selected for new sessions
    pub selected_type: Option<AuthType>,
}

/// Model config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawModelConfig {
    /// Last selected model id
    pub name: Option<String>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SwitchyardConfig {
    #[serde(default)]
    pub security: SecurityConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default, skip_serializing_if = "ModelCatalog::is_empty")]
    pub model_providers: ModelCatalog,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SecurityConfig {
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Auth type selected for new sessions
    #[serde(default)]
    pub selected_type: AuthType,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModelConfig {
    /// Last selected model id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
