//! Change notification for model switches.

use std::future::Future;

use async_trait::async_trait;

use crate::{AuthType, ResolvedModel, Result};

/// Reacts to a committed model switch.
///
/// Returning an error rolls the switch back and the error is handed to the
/// caller of [`switch_model`](super::SelectionManager::switch_model).
#[async_trait]
pub trait ModelChangeHandler: Send + Sync {
    /// Called after the new model has been committed.
    async fn on_model_change(&self, auth_type: &AuthType, model: &ResolvedModel) -> Result<()>;
}

/// Adapts an async closure into a [`ModelChangeHandler`].
///
/// # Example
///
/// ```
/// use switchyard_models::selection::FnHandler;
///
/// let handler = FnHandler::new(|auth_type, model| async move {
///     println!("now using {} via {}", model.id, auth_type);
///     Ok(())
/// });
/// # let _ = handler;
/// ```
pub struct FnHandler<F>(F);

impl<F> FnHandler<F> {
    pub fn new<Fut>(f: F) -> Self
    where
        F: Fn(AuthType, ResolvedModel) -> Fut + Send + Sync,
        Fut: Future<Output = Result<()>> + Send,
    {
        Self(f)
    }
}

#[async_trait]
impl<F, Fut> ModelChangeHandler for FnHandler<F>
where
    F: Fn(AuthType, ResolvedModel) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    async fn on_model_change(&self, auth_type: &AuthType, model: &ResolvedModel) -> Result<()> {
        (self.0)(auth_type.clone(), model.clone()).await
    }
}
