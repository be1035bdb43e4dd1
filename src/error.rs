use thiserror::Error;

/// Errors surfaced by the reconciliation core.
///
/// Everything except `Transport` is detected locally and raised before any
/// mutation request is issued.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A symbolic name failed to resolve in its tenant-scoped collection
    #[error("{kind} '{name}' not found in tenant '{tenant}'")]
    ReferenceNotFound {
        kind: &'static str,
        name: String,
        tenant: String,
    },

    /// An identifier-based lookup for update or delete matched nothing
    #[error("{0}")]
    NotFound(String),

    /// A business rule or required-parameter rule was violated
    #[error("{0}")]
    ValidationConflict(String),

    /// The named template is missing or is not an L3Out template
    #[error("{0}")]
    Template(String),

    /// Opaque pass-through failure from the REST layer. Fatal to the
    /// invocation; retrying is the caller's responsibility.
    #[error("transport error: {0}")]
    Transport(anyhow::Error),
}

impl From<anyhow::Error> for ReconcileError {
    fn from(err: anyhow::Error) -> Self {
        ReconcileError::Transport(err)
    }
}

/// Result type for reconciliation operations
pub type Result<T> = std::result::Result<T, ReconcileError>;
