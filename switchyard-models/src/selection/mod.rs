//! Active model selection.
//!
//! A [`SelectionManager`] tracks which auth type and model a session is using
//! and switches between models transactionally: the new model is committed,
//! the registered [`ModelChangeHandler`] is awaited, and the previous model is
//! restored if the handler fails.

mod handler;
mod manager;
mod state;

pub use handler::{FnHandler, ModelChangeHandler};
pub use manager::{SelectionManager, SelectionOptions};
pub use state::{CurrentModel, SelectionSource, SwitchMetadata};
