//! Error types for grievance-core
//!
//! Validation never produces these: it reports field problems through
//! [`crate::validation::ErrorMap`]. Only malformed inputs handed over by a
//! collaborator surface here.

/// Core error type
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Reference tables could not be parsed
    #[error("invalid reference data: {0}")]
    ReferenceData(#[source] serde_json::Error),

    /// Draft could not be (de)serialized
    #[error("invalid draft: {0}")]
    Draft(#[source] serde_json::Error),
}
