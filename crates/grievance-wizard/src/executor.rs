//! Collaborator seams: mutation execution and reference data
//!
//! Implement these traits against the data-fetching client. The controller
//! calls [`MutationExecutor::execute`] exactly once per accepted submission
//! and [`ReferenceDataProvider::fetch`] once per session.

use crate::error::{ExecutorError, ProviderError};
use grievance_core::{MutationInput, ReferenceData};
use serde::{Deserialize, Serialize};

/// Ticket persisted by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTicket {
    pub id: String,
    #[serde(default)]
    pub unicef_id: Option<String>,
}

/// One backend-reported error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    pub message: String,
}

impl ResponseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outcome of a mutation that reached the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationResponse {
    /// Ticket created; the wizard navigates to its detail view
    Data(CreatedTicket),
    /// Rejected with one or more messages
    Errors(Vec<ResponseError>),
}

/// Executes the create-ticket mutation
#[async_trait::async_trait]
pub trait MutationExecutor: Send + Sync {
    async fn execute(&self, payload: &MutationInput) -> Result<MutationResponse, ExecutorError>;
}

/// Supplies reference tables for a session
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ReferenceDataProvider: Send + Sync {
    async fn fetch(&self) -> Result<ReferenceData, ProviderError>;
}
