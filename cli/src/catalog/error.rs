use super::model::{EntityId, EntityKind};

/// Errors surfaced by catalog operations.
///
/// Every variant is caught by the controller that issued the call; none of
/// them is meant to reach a global handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Rejected input, either before the network (missing field) or by the
    /// store itself (e.g. a duplicate name).
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("{kind} {id} no longer exists")]
    NotFound { kind: EntityKind, id: EntityId },
}

impl CatalogError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CatalogError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn transport(message: impl std::fmt::Display) -> Self {
        CatalogError::Transport(message.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }
}
