//! SelectionManager for the active model of a session
//!
//! The manager owns the single mutable piece of state in this crate: which
//! auth type and which model are active. Everything else is delegated to the
//! shared, read-only [`ModelRegistry`].

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info, warn};

use crate::env::{EnvironmentLookup, ProcessEnvironment};
use crate::registry::ModelRegistry;
use crate::types::{AuthType, AvailableModel, ModelCatalog, ResolvedModel};
use crate::{Error, Result};

use super::handler::ModelChangeHandler;
use super::state::{CurrentModel, SelectionSource, SelectionState, SwitchMetadata};

/// Inputs for establishing the initial selection.
pub struct SelectionOptions {
    auth_type: AuthType,
    model_id: Option<String>,
    environment: Arc<dyn EnvironmentLookup>,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            auth_type: AuthType::QWEN_OAUTH,
            model_id: None,
            environment: Arc::new(ProcessEnvironment),
        }
    }
}

impl SelectionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Auth type to start with. Defaults to the built-in auth type.
    pub fn auth_type(mut self, auth_type: AuthType) -> Self {
        self.auth_type = auth_type;
        self
    }

    /// Previously persisted model id to try first.
    pub fn model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Replace the process environment as the source of env-provided models.
    pub fn environment(mut self, environment: impl EnvironmentLookup + 'static) -> Self {
        self.environment = Arc::new(environment);
        self
    }
}

/// Manages the active model selection
///
/// SelectionManager provides:
/// - Initial selection with persisted -> environment -> default fallback
/// - Transactional switching with rollback when the change handler fails
/// - Pass-through queries against the registry
///
/// Switches are serialized: a second switch waits until the first one,
/// including its change handler, has finished.
pub struct SelectionManager {
    registry: Arc<ModelRegistry>,
    state: Arc<RwLock<SelectionState>>,
    /// Held for the whole of a switch. Also owns the change handler so it
    /// cannot be replaced while a switch is running.
    switch_guard: Arc<Mutex<HandlerSlot>>,
}

type HandlerSlot = Option<Arc<dyn ModelChangeHandler>>;

impl SelectionManager {
    /// Create a manager over an existing registry
    pub fn new(registry: Arc<ModelRegistry>, options: SelectionOptions) -> Self {
        let state = initial_selection(&registry, options);
        info!(
            auth_type = %state.auth_type,
            model_id = %state.model_id,
            source = %state.source,
            "initialized model selection"
        );

        Self {
            registry,
            state: Arc::new(RwLock::new(state)),
            switch_guard: Arc::new(Mutex::new(None)),
        }
    }

    /// Build the registry from a catalog, then create the manager
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidModelDefinition` if the catalog is malformed.
    pub fn from_catalog(catalog: Option<&ModelCatalog>, options: SelectionOptions) -> Result<Self> {
        let registry = ModelRegistry::new(catalog)?;
        Ok(Self::new(Arc::new(registry), options))
    }

    /// Register the handler notified after every committed switch
    pub async fn set_change_handler(&self, handler: Arc<dyn ModelChangeHandler>) {
        *self.switch_guard.lock().await = Some(handler);
    }

    /// Remove the change handler
    pub async fn clear_change_handler(&self) {
        *self.switch_guard.lock().await = None;
    }

    /// Switch to another model of the current auth type
    ///
    /// The new model is committed before the change handler runs. If the
    /// handler fails, the previous model id is restored and the handler's
    /// error is returned. Source and timestamp keep the attempted values.
    /// Dropping the returned future before the handler finishes also
    /// restores the previous model id.
    ///
    /// # Errors
    ///
    /// Returns `Error::ModelNotFound` if the current auth type does not offer
    /// `model_id`; the selection is left untouched.
    pub async fn switch_model(
        &self,
        model_id: &str,
        source: SelectionSource,
        metadata: SwitchMetadata,
    ) -> Result<ResolvedModel> {
        let guard = Arc::clone(&self.switch_guard).lock_owned().await;
        let handler = (*guard).clone();

        let auth_type = self.state.read().await.auth_type.clone();
        let model = self
            .registry
            .get_model(&auth_type, model_id)
            .cloned()
            .ok_or_else(|| Error::model_not_found(auth_type.as_str(), model_id))?;

        let previous = {
            let mut state = self.state.write().await;
            let previous = std::mem::replace(&mut state.model_id, model.id.clone());
            state.source = source;
            state.selected_at = chrono::Utc::now();
            previous
        };
        info!(
            %auth_type,
            from = %previous,
            to = %model.id,
            %source,
            reason = metadata.reason.as_deref(),
            context = metadata.context.as_deref(),
            "switched model"
        );

        let Some(handler) = handler else {
            return Ok(model);
        };

        // Restores `previous` if this future is dropped before the handler returns.
        let mut pending = PendingSwitch {
            state: Arc::clone(&self.state),
            previous,
            armed: true,
            guard: Some(guard),
        };
        let outcome = handler.on_model_change(&auth_type, &model).await;
        pending.armed = false;

        if let Err(e) = outcome {
            warn!(
                %auth_type,
                model_id = %model.id,
                restored = %pending.previous,
                "model change handler failed: {}",
                e
            );
            self.state.write().await.model_id = std::mem::take(&mut pending.previous);
            return Err(e);
        }

        Ok(model)
    }

    /// Current auth type
    pub async fn current_auth_type(&self) -> AuthType {
        self.state.read().await.auth_type.clone()
    }

    /// Current model id, empty when nothing is selected
    pub async fn current_model_id(&self) -> String {
        self.state.read().await.model_id.clone()
    }

    /// How the current selection was made
    pub async fn selection_source(&self) -> SelectionSource {
        self.state.read().await.source
    }

    /// When the current selection was made
    pub async fn selected_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.state.read().await.selected_at
    }

    /// The current selection with its resolved model
    ///
    /// # Errors
    ///
    /// Returns `Error::NoModelSelected` if nothing is selected, or
    /// `Error::ModelNotFound` if the registry no longer has the model.
    pub async fn current_model(&self) -> Result<CurrentModel> {
        let state = self.state.read().await;
        if !state.is_selected() {
            return Err(Error::NoModelSelected {
                auth_type: state.auth_type.to_string(),
            });
        }

        let model = self
            .registry
            .get_model(&state.auth_type, &state.model_id)
            .ok_or_else(|| Error::model_not_found(state.auth_type.as_str(), &state.model_id))?;

        Ok(CurrentModel {
            auth_type: state.auth_type.clone(),
            model_id: state.model_id.clone(),
            model: model.clone(),
            source: state.source,
            selected_at: state.selected_at,
        })
    }

    /// Models offered by the current auth type
    pub async fn available_models(&self) -> Vec<AvailableModel> {
        let auth_type = self.current_auth_type().await;
        self.registry.list_models(&auth_type)
    }

    /// Models offered by an auth type
    pub fn available_models_for(&self, auth_type: &AuthType) -> Vec<AvailableModel> {
        self.registry.list_models(auth_type)
    }

    /// Check whether the current auth type offers a model
    pub async fn has_model(&self, model_id: &str) -> bool {
        let state = self.state.read().await;
        self.registry.has_model(&state.auth_type, model_id)
    }

    /// Check whether an auth type offers a model
    pub fn has_model_for(&self, auth_type: &AuthType, model_id: &str) -> bool {
        self.registry.has_model(auth_type, model_id)
    }

    /// Look up a resolved model
    pub fn get_model(&self, auth_type: &AuthType, model_id: &str) -> Option<&ResolvedModel> {
        self.registry.get_model(auth_type, model_id)
    }

    /// Default model of an auth type
    pub fn default_model(&self, auth_type: &AuthType) -> Option<&ResolvedModel> {
        self.registry.default_model(auth_type)
    }

    /// Auth types offering a model, `preferred` first if present
    pub fn auth_types_for_model(
        &self,
        model_id: &str,
        preferred: Option<&AuthType>,
    ) -> Vec<AuthType> {
        self.registry.auth_types_for_model(model_id, preferred)
    }

    /// The registry backing this manager
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }
}

/// A committed switch whose change handler has not returned yet.
///
/// Dropping it while armed puts the previous model id back. The switch
/// guard is released only after the restore.
struct PendingSwitch {
    state: Arc<RwLock<SelectionState>>,
    previous: String,
    armed: bool,
    guard: Option<OwnedMutexGuard<HandlerSlot>>,
}

impl Drop for PendingSwitch {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let previous = std::mem::take(&mut self.previous);
        warn!(restored = %previous, "model switch cancelled before the change handler returned");

        if let Ok(mut state) = self.state.try_write() {
            state.model_id = previous;
            return;
        }

        // A reader holds the lock: finish the restore on the runtime, still
        // holding the switch guard so no other switch can start first.
        let state = Arc::clone(&self.state);
        let guard = self.guard.take();
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                state.write().await.model_id = previous;
                drop(guard);
            });
        }
    }
}

/// Resolve the starting selection: persisted id, then environment, then
/// the registry default. Ends unselected if none is usable.
fn initial_selection(registry: &ModelRegistry, options: SelectionOptions) -> SelectionState {
    let SelectionOptions {
        auth_type,
        model_id,
        environment,
    } = options;

    if let Some(id) = model_id.filter(|id| !id.is_empty()) {
        if registry.has_model(&auth_type, &id) {
            return SelectionState::selected(auth_type, id, SelectionSource::Settings);
        }
        warn!(%auth_type, model_id = %id, "persisted model is not available, falling back");
    }

    if let Some(id) = environment.model_for(&auth_type) {
        if registry.has_model(&auth_type, &id) {
            return SelectionState::selected(auth_type, id, SelectionSource::Environment);
        }
        debug!(%auth_type, model_id = %id, "environment model is not available");
    }

    if let Some(model) = registry.default_model(&auth_type) {
        let id = model.id.clone();
        return SelectionState::selected(auth_type, id, SelectionSource::Default);
    }

    debug!(%auth_type, "no model available, starting unselected");
    SelectionState::unselected(auth_type)
}
