//! Built-in model catalog for the OAuth-backed auth type.

use crate::types::{ModelCapabilities, ModelDefinition};

/// Model selected by default for the built-in auth type.
pub const DEFAULT_QWEN_MODEL: &str = "coder-model";

/// Placeholder base URL; the real endpoint is issued with the OAuth token.
pub const DYNAMIC_QWEN_OAUTH_BASE_URL: &str = "DYNAMIC_QWEN_OAUTH_BASE_URL";

/// Default base URL per auth type.
pub(crate) const DEFAULT_BASE_URLS: &[(&str, &str)] = &[
    ("qwen-oauth", DYNAMIC_QWEN_OAUTH_BASE_URL),
    ("openai", "https://api.openai.com/v1"),
];

/// Get the default base URL for an auth type, if one is registered.
pub(crate) fn default_base_url(auth_type: &str) -> Option<&'static str> {
    DEFAULT_BASE_URLS
        .iter()
        .find(|(a, _)| *a == auth_type)
        .map(|(_, url)| *url)
}

/// The fixed catalog served through the built-in auth type.
pub(crate) fn qwen_oauth_models() -> Vec<ModelDefinition> {
    vec![
        ModelDefinition::new(DEFAULT_QWEN_MODEL)
            .name("Qwen Coder")
            .description("The latest Qwen Coder model from Alibaba Cloud ModelStudio"),
        ModelDefinition::new("vision-model")
            .name("Qwen Vision")
            .description("The latest Qwen Vision model from Alibaba Cloud ModelStudio")
            .capabilities(ModelCapabilities::vision()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_is_in_catalog() {
        assert!(qwen_oauth_models().iter().any(|m| m.id == DEFAULT_QWEN_MODEL));
    }

    #[test]
    fn base_url_for_known_auth_types() {
        assert_eq!(default_base_url("openai"), Some("https://api.openai.com/v1"));
        assert_eq!(
            default_base_url("qwen-oauth"),
            Some(DYNAMIC_QWEN_OAUTH_BASE_URL)
        );
        assert_eq!(default_base_url("anthropic"), None);
    }
}
