//! Grievance Wizard
//!
//! Session controller for the four-step ticket wizard. It owns a form store,
//! gates transitions with [`grievance_core::StepValidator`] and submits the
//! built payload through a [`MutationExecutor`].
//!
//! # Example
//!
//! ```rust,ignore
//! use grievance_wizard::prelude::*;
//!
//! # async fn example(executor: Arc<dyn MutationExecutor>, provider: &dyn ReferenceDataProvider) {
//! let config = WizardConfig::new().with_business_area("afghanistan");
//! let wizard = WizardController::start(config, InMemoryFormStore::new(), executor, provider).await;
//!
//! wizard.set_field("category", json!("5"))?;
//! while wizard.can_advance() {
//!     if let Transition::Blocked(errors) = wizard.next() {
//!         // render errors
//!     }
//! }
//! let outcome = wizard.submit().await?;
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod controller;
pub mod error;
pub mod executor;
pub mod store;

// Re-exports for convenience
pub use config::WizardConfig;
pub use controller::{SubmitOutcome, Transition, WizardController};
pub use error::{ExecutorError, ProviderError, StoreError, WizardError};
pub use executor::{
    CreatedTicket, MutationExecutor, MutationResponse, ReferenceDataProvider, ResponseError,
};
pub use store::{FormStore, InMemoryFormStore};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a wizard session
    pub use crate::{
        FormStore, InMemoryFormStore, MutationExecutor, ReferenceDataProvider, SubmitOutcome,
        Transition, WizardConfig, WizardController,
    };
    pub use grievance_core::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
