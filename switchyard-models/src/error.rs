//! Error types for model management.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during model operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A catalog entry could not be resolved.
    #[error("invalid model definition for auth type '{auth_type}': {reason}")]
    InvalidModelDefinition { auth_type: String, reason: String },

    /// Model not found for the given auth type.
    #[error("model '{model_id}' not found for auth type '{auth_type}'")]
    ModelNotFound { auth_type: String, model_id: String },

    /// No model is currently selected.
    #[error("no model selected for auth type '{auth_type}'")]
    NoModelSelected { auth_type: String },

    /// A model change handler rejected the switch.
    #[error("model change handler failed: {0}")]
    ChangeHandler(String),
}

impl Error {
    pub(crate) fn model_not_found(auth_type: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self::ModelNotFound {
            auth_type: auth_type.into(),
            model_id: model_id.into(),
        }
    }
}
