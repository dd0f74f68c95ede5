use skill_loop_core::error::CoreError;
use skill_loop_core::types::DbId;

/// Failure of a journey engine operation.
///
/// Expected no-ops (advancing a journey with no active phase) are not
/// errors; they are reported as `Ok(false)`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain-level error: not found, validation, conflict, or a broken
    /// invariant in persisted state.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The transaction failed and was rolled back.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub(crate) fn not_found(entity: &'static str, id: DbId) -> Self {
        Self::Core(CoreError::NotFound { entity, id })
    }

    pub(crate) fn conflict(msg: impl Into<String>) -> Self {
        Self::Core(CoreError::Conflict(msg.into()))
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Core(CoreError::Validation(msg.into()))
    }
}
