//! Error types for the wizard
//!
//! Field problems are never errors here; they travel in
//! [`grievance_core::ErrorMap`]. These cover collaborator faults and
//! misuse of the controller.

use grievance_core::{CoreError, StepId};

/// Main wizard error type
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    /// Form store rejected a read or write
    #[error("form store error: {0}")]
    Store(#[from] StoreError),

    /// Step is not part of this session's sequence
    #[error("step {0} is not available in this session")]
    StepUnavailable(StepId),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),
}

/// Form store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No such field on the draft
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// Value does not fit the field
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Draft could not be converted
    #[error(transparent)]
    Draft(#[from] CoreError),
}

/// Mutation transport errors
///
/// Backend-reported errors are not transport errors; they come back as
/// [`crate::executor::MutationResponse::Errors`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutorError {
    /// Request never reached the backend or the connection dropped
    #[error("network error: {0}")]
    Network(String),

    /// Backend answered with something unreadable
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ExecutorError {
    /// Retrying the same draft may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Reference-data load errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("reference data unavailable: {0}")]
    Unavailable(String),

    #[error("reference data malformed: {0}")]
    Malformed(String),
}
