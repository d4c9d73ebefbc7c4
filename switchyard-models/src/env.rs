//! Environment-derived model selection.
//!
//! Some auth types let the process environment name the model to start
//! with. The lookup is a trait so embedders and tests can replace the
//! process environment with their own source.
//!
//! # Example
//!
//! ```
//! use switchyard_models::AuthType;
//! use switchyard_models::env::EnvironmentLookup;
//!
//! let lookup = |auth_type: &AuthType| {
//!     (*auth_type == AuthType::OPENAI).then(|| "gpt-4o".to_string())
//! };
//! assert_eq!(lookup.model_for(&AuthType::OPENAI).as_deref(), Some("gpt-4o"));
//! assert_eq!(lookup.model_for(&AuthType::QWEN_OAUTH), None);
//! ```

use std::env;

use tracing::debug;

use crate::AuthType;

/// Environment variable naming the model for each auth type.
const ENV_VARS: &[(&str, &str)] = &[("openai", "OPENAI_MODEL")];

/// Get the environment variable name for an auth type.
pub fn env_var_for_auth_type(auth_type: &AuthType) -> Option<&'static str> {
    ENV_VARS
        .iter()
        .find(|(a, _)| *a == auth_type.as_str())
        .map(|(_, v)| *v)
}

/// Source of an environment-provided model id.
pub trait EnvironmentLookup: Send + Sync {
    /// The model id the environment selects for `auth_type`, if any.
    fn model_for(&self, auth_type: &AuthType) -> Option<String>;
}

impl<F> EnvironmentLookup for F
where
    F: Fn(&AuthType) -> Option<String> + Send + Sync,
{
    fn model_for(&self, auth_type: &AuthType) -> Option<String> {
        self(auth_type)
    }
}

/// Reads model ids from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl EnvironmentLookup for ProcessEnvironment {
    fn model_for(&self, auth_type: &AuthType) -> Option<String> {
        let var = env_var_for_auth_type(auth_type)?;
        let value = env::var(var).ok().filter(|v| !v.trim().is_empty())?;
        debug!(%auth_type, var, "model id provided by environment");
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn env_var_only_defined_for_openai() {
        assert_eq!(env_var_for_auth_type(&AuthType::OPENAI), Some("OPENAI_MODEL"));
        assert_eq!(env_var_for_auth_type(&AuthType::QWEN_OAUTH), None);
        assert_eq!(env_var_for_auth_type(&AuthType::from("local")), None);
    }

    #[test]
    #[serial]
    fn process_environment_reads_openai_model() {
        // SAFETY: env-mutating tests are serialized
        unsafe { env::set_var("OPENAI_MODEL", "gpt-4o") };

        let openai = ProcessEnvironment.model_for(&AuthType::OPENAI);
        let qwen = ProcessEnvironment.model_for(&AuthType::QWEN_OAUTH);

        // SAFETY: env-mutating tests are serialized
        unsafe { env::remove_var("OPENAI_MODEL") };

        assert_eq!(openai.as_deref(), Some("gpt-4o"));
        assert_eq!(qwen, None);
    }

    #[test]
    #[serial]
    fn process_environment_ignores_blank_values() {
        // SAFETY: env-mutating tests are serialized
        unsafe { env::set_var("OPENAI_MODEL", "  ") };

        let openai = ProcessEnvironment.model_for(&AuthType::OPENAI);

        // SAFETY: env-mutating tests are serialized
        unsafe { env::remove_var("OPENAI_MODEL") };

        assert_eq!(openai, None);
    }

    #[test]
    fn closures_act_as_lookups() {
        let lookup = |_: &AuthType| Some("fixed".to_string());
        assert_eq!(lookup.model_for(&AuthType::QWEN_OAUTH).as_deref(), Some("fixed"));
    }
}
