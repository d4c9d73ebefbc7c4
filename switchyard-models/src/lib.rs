//! Model management for switchyard.
//!
//! This crate provides:
//! - Model registry cataloging the models each auth type offers
//! - Selection manager tracking and switching the active model
//! - Environment lookup for env-provided model ids
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  SelectionManager                    │
//! │   (auth type, model id, source, timestamp)          │
//! │   switch: validate → commit → notify → rollback     │
//! └─────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                   ModelRegistry                      │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐  │
//! │  │ qwen-oauth  │  │   openai    │  │    ...      │  │
//! │  │ (built-in)  │  │ (configured)│  │             │  │
//! │  └─────────────┘  └─────────────┘  └─────────────┘  │
//! └─────────────────────────────────────────────────────┘
//! ```

mod error;
mod types;

pub mod env;
pub mod registry;
pub mod selection;

pub use error::{Error, Result};
pub use registry::ModelRegistry;
pub use selection::{SelectionManager, SelectionOptions, SelectionSource, SwitchMetadata};
pub use types::{
    AuthType, AvailableModel, GenerationConfig, ModelCapabilities, ModelCatalog,
    ModelDefinition, ResolvedModel,
};
