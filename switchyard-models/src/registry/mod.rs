//! Model registry for cataloging the models each auth type offers.
//!
//! The registry is built once from the built-in catalog plus an optional
//! user catalog, and is read-only afterwards. Alongside the per-auth-type
//! catalog it keeps a reverse index from model id to the auth types that
//! registered it, so cross-provider lookups never scan the whole catalog.
//!
//! # Example
//!
//! ```
//! use switchyard_models::{AuthType, ModelCatalog, ModelDefinition, ModelRegistry};
//!
//! let mut catalog = ModelCatalog::new();
//! catalog.insert(AuthType::OPENAI, vec![ModelDefinition::new("gpt-4o")]);
//!
//! let registry = ModelRegistry::new(Some(&catalog)).unwrap();
//! assert!(registry.has_model(&AuthType::OPENAI, "gpt-4o"));
//! assert_eq!(registry.default_model(&AuthType::QWEN_OAUTH).unwrap().id, "coder-model");
//! ```

mod builtin;

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::debug;

pub use builtin::{DEFAULT_QWEN_MODEL, DYNAMIC_QWEN_OAUTH_BASE_URL};

use crate::types::{AuthType, AvailableModel, ModelCatalog, ModelDefinition, ResolvedModel};
use crate::{Error, Result};

/// Read-only catalog of resolved models grouped by auth type.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    /// Resolved models per auth type, in registration order.
    models: IndexMap<AuthType, IndexMap<String, ResolvedModel>>,
    /// Model id -> auth types that registered it, in registration order.
    auth_types_by_model: HashMap<String, Vec<AuthType>>,
}

impl ModelRegistry {
    /// Build a registry from the built-in catalog and an optional user catalog.
    ///
    /// Entries supplied for the built-in auth type are ignored so its
    /// catalog stays fixed.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidModelDefinition` if any entry has an empty id.
    /// No registry is produced in that case.
    pub fn new(catalog: Option<&ModelCatalog>) -> Result<Self> {
        let mut registry = Self {
            models: IndexMap::new(),
            auth_types_by_model: HashMap::new(),
        };

        registry.register_all(&AuthType::QWEN_OAUTH, &builtin::qwen_oauth_models())?;

        for (auth_type, definitions) in catalog.into_iter().flatten() {
            if auth_type.is_builtin() {
                debug!(
                    %auth_type,
                    ignored = definitions.len(),
                    "ignoring configured models for built-in auth type"
                );
                continue;
            }
            registry.register_all(auth_type, definitions)?;
        }

        debug!(
            models = registry.model_count(),
            auth_types = registry.models.len(),
            "built model registry"
        );
        Ok(registry)
    }

    fn register_all(&mut self, auth_type: &AuthType, definitions: &[ModelDefinition]) -> Result<()> {
        for definition in definitions {
            let model = resolve(auth_type, definition)?;
            self.register(model);
        }
        Ok(())
    }

    fn register(&mut self, model: ResolvedModel) {
        let auth_type = model.auth_type.clone();
        let id = model.id.clone();

        self.models
            .entry(auth_type.clone())
            .or_default()
            .insert(id.clone(), model);
        self.auth_types_by_model
            .entry(id)
            .or_default()
            .push(auth_type);
    }

    /// List display summaries for an auth type in registration order.
    ///
    /// Returns an empty list for unknown auth types.
    pub fn list_models(&self, auth_type: &AuthType) -> Vec<AvailableModel> {
        self.models
            .get(auth_type)
            .map(|models| models.values().map(AvailableModel::from).collect())
            .unwrap_or_default()
    }

    /// Get a resolved model by exact auth type and id.
    pub fn get_model(&self, auth_type: &AuthType, model_id: &str) -> Option<&ResolvedModel> {
        self.models.get(auth_type)?.get(model_id)
    }

    /// Check whether an auth type offers a model.
    pub fn has_model(&self, auth_type: &AuthType, model_id: &str) -> bool {
        self.get_model(auth_type, model_id).is_some()
    }

    /// Find a model by id across auth types, preferring the first registrant.
    pub fn find_model(&self, model_id: &str) -> Option<&ResolvedModel> {
        let auth_type = self.auth_types_by_model.get(model_id)?.first()?;
        self.get_model(auth_type, model_id)
    }

    /// Auth types with at least one registered model.
    pub fn auth_types(&self) -> Vec<&AuthType> {
        self.models
            .iter()
            .filter(|(_, models)| !models.is_empty())
            .map(|(auth_type, _)| auth_type)
            .collect()
    }

    /// Default model for an auth type.
    ///
    /// The built-in auth type always defaults to [`DEFAULT_QWEN_MODEL`];
    /// every other auth type defaults to its first registered model.
    pub fn default_model(&self, auth_type: &AuthType) -> Option<&ResolvedModel> {
        if auth_type.is_builtin() {
            return self.get_model(auth_type, DEFAULT_QWEN_MODEL);
        }
        self.models
            .get(auth_type)?
            .first()
            .map(|(_, model)| model)
    }

    /// Auth types offering a model id.
    ///
    /// If `preferred` is among them it is moved to the front; the remaining
    /// order is registration order.
    pub fn auth_types_for_model(
        &self,
        model_id: &str,
        preferred: Option<&AuthType>,
    ) -> Vec<AuthType> {
        let Some(auth_types) = self.auth_types_by_model.get(model_id) else {
            return Vec::new();
        };

        let mut result = auth_types.clone();
        if let Some(preferred) = preferred
            && let Some(pos) = result.iter().position(|a| a == preferred)
        {
            let first = result.remove(pos);
            result.insert(0, first);
        }
        result
    }

    /// Total number of registered models across all auth types.
    pub fn model_count(&self) -> usize {
        self.models.values().map(IndexMap::len).sum()
    }
}

/// Apply defaults to a definition.
fn resolve(auth_type: &AuthType, definition: &ModelDefinition) -> Result<ResolvedModel> {
    if definition.id.trim().is_empty() {
        return Err(Error::InvalidModelDefinition {
            auth_type: auth_type.to_string(),
            reason: "model id is required".to_string(),
        });
    }

    let base_url = definition.base_url.clone().unwrap_or_else(|| {
        builtin::default_base_url(auth_type.as_str())
            .unwrap_or_default()
            .to_string()
    });
    let generation_config = definition
        .generation_config
        .unwrap_or_default()
        .merged_over(crate::GenerationConfig::DEFAULT);

    Ok(ResolvedModel {
        id: definition.id.clone(),
        name: definition
            .name
            .clone()
            .unwrap_or_else(|| definition.id.clone()),
        description: definition.description.clone(),
        auth_type: auth_type.clone(),
        capabilities: definition.capabilities.unwrap_or_default(),
        base_url,
        generation_config,
    })
}
