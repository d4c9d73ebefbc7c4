//! Selection state and metadata

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AuthType, ResolvedModel};

/// How the current model selection was established.
///
/// Purely descriptive: any source may overwrite any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    /// Catalog default for the auth type.
    Default,
    /// Provided by the process environment.
    Environment,
    /// Restored from persisted settings.
    Settings,
    /// Set by code on the user's behalf (e.g. a fallback policy).
    ProgrammaticOverride,
    /// Picked by the user.
    UserManual,
}

impl SelectionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Environment => "environment",
            Self::Settings => "settings",
            Self::ProgrammaticOverride => "programmatic_override",
            Self::UserManual => "user_manual",
        }
    }
}

impl fmt::Display for SelectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Informational context attached to a switch. Only logged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchMetadata {
    pub reason: Option<String>,
    pub context: Option<String>,
}

impl SwitchMetadata {
    /// Metadata carrying a reason.
    pub fn reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            context: None,
        }
    }

    /// Attach free-form context.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// The active model with the metadata explaining why it is active.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentModel {
    pub auth_type: AuthType,
    pub model_id: String,
    pub model: ResolvedModel,
    pub source: SelectionSource,
    pub selected_at: DateTime<Utc>,
}

/// Mutable selection owned by the manager.
///
/// An empty `model_id` means nothing is selected.
#[derive(Debug, Clone)]
pub(crate) struct SelectionState {
    pub auth_type: AuthType,
    pub model_id: String,
    pub source: SelectionSource,
    pub selected_at: DateTime<Utc>,
}

impl SelectionState {
    pub fn selected(auth_type: AuthType, model_id: String, source: SelectionSource) -> Self {
        Self {
            auth_type,
            model_id,
            source,
            selected_at: Utc::now(),
        }
    }

    pub fn unselected(auth_type: AuthType) -> Self {
        Self::selected(auth_type, String::new(), SelectionSource::Default)
    }

    pub fn is_selected(&self) -> bool {
        !self.model_id.is_empty()
    }
}
