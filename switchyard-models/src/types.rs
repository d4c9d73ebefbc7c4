//! Core types for model management.

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Provider/credential scheme a model is served through.
///
/// Auth types are open-ended: user configuration may introduce any name.
/// The well-known ones are available as associated constants.
///
/// # Examples
///
/// ```
/// use switchyard_models::AuthType;
///
/// let auth = AuthType::from("openai");
/// assert_eq!(auth, AuthType::OPENAI);
/// assert_eq!(auth.to_string(), "openai");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthType(Cow<'static, str>);

impl AuthType {
    /// Built-in OAuth-backed provider. Its catalog cannot be overridden.
    pub const QWEN_OAUTH: AuthType = AuthType(Cow::Borrowed("qwen-oauth"));

    /// OpenAI-compatible API key provider.
    pub const OPENAI: AuthType = AuthType(Cow::Borrowed("openai"));

    /// Create an auth type from any name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Get the auth type name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the protected built-in auth type.
    pub fn is_builtin(&self) -> bool {
        *self == Self::QWEN_OAUTH
    }
}

impl Default for AuthType {
    fn default() -> Self {
        Self::QWEN_OAUTH
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AuthType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AuthType {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Model capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelCapabilities {
    /// Supports vision/image input.
    pub vision: bool,
}

impl ModelCapabilities {
    /// Capabilities for a vision model.
    pub fn vision() -> Self {
        Self { vision: true }
    }
}

/// Sampling and transport parameters for requests to a model.
///
/// Every field is optional. Resolution merges a definition's fields over
/// [`GenerationConfig::DEFAULT`] one field at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f64>,
    /// Maximum output tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Request timeout in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_cache_control: Option<bool>,
}

impl GenerationConfig {
    /// Global defaults applied to every resolved model.
    pub const DEFAULT: GenerationConfig = GenerationConfig {
        temperature: Some(0.7),
        top_p: Some(0.9),
        top_k: None,
        presence_penalty: None,
        frequency_penalty: None,
        repetition_penalty: None,
        max_tokens: Some(4096),
        timeout: Some(60_000),
        max_retries: Some(3),
        disable_cache_control: None,
    };

    /// Overlay `self` on `base`: fields set here win, unset fields fall back.
    pub fn merged_over(self, base: GenerationConfig) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature.or(base.temperature),
            top_p: self.top_p.or(base.top_p),
            top_k: self.top_k.or(base.top_k),
            presence_penalty: self.presence_penalty.or(base.presence_penalty),
            frequency_penalty: self.frequency_penalty.or(base.frequency_penalty),
            repetition_penalty: self.repetition_penalty.or(base.repetition_penalty),
            max_tokens: self.max_tokens.or(base.max_tokens),
            timeout: self.timeout.or(base.timeout),
            max_retries: self.max_retries.or(base.max_retries),
            disable_cache_control: self.disable_cache_control.or(base.disable_cache_control),
        }
    }
}

/// A model as declared in configuration or the built-in catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Model identifier, unique within an auth type. Required.
    #[serde(default)]
    pub id: String,
    /// Display name. Defaults to the id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Endpoint override. Defaults to the auth type's base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<ModelCapabilities>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl ModelDefinition {
    /// Create a definition with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the capabilities.
    pub fn capabilities(mut self, capabilities: ModelCapabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Set the base URL override.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the generation config overrides.
    pub fn generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

/// User-supplied model catalog, keyed by auth type in declaration order.
pub type ModelCatalog = IndexMap<AuthType, Vec<ModelDefinition>>;

/// A model definition with every default applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedModel {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub auth_type: AuthType,
    pub capabilities: ModelCapabilities,
    pub base_url: String,
    pub generation_config: GenerationConfig,
}

/// Display-ready summary of a registered model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailableModel {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub capabilities: ModelCapabilities,
    pub auth_type: AuthType,
    pub is_vision: bool,
}

impl From<&ResolvedModel> for AvailableModel {
    fn from(model: &ResolvedModel) -> Self {
        Self {
            id: model.id.clone(),
            label: model.name.clone(),
            description: model.description.clone(),
            capabilities: model.capabilities,
            auth_type: model.auth_type.clone(),
            is_vision: model.capabilities.vision,
        }
    }
}
