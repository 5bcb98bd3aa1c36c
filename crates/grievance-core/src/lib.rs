//! Grievance Core
//!
//! The decision layer behind the grievance-ticket wizard:
//! - [`classify`] maps a category/issue-type selection to a [`StepShape`]
//! - [`StepValidator`] checks one step of a [`TicketDraft`]
//! - [`PayloadBuilder`] serializes a draft into the mutation input
//!
//! Everything here is synchronous and free of side effects.
//!
//! # Example
//!
//! ```rust,ignore
//! use grievance_core::prelude::*;
//! use std::sync::Arc;
//!
//! let draft = TicketDraft { category: Some("3".into()), ..TicketDraft::default() };
//! let shape = classify(draft.category.as_deref(), draft.issue_type.as_deref());
//!
//! let validator = StepValidator::new(Arc::new(ReferenceData::new()));
//! let errors = validator.validate_step(StepId::Selection, &draft, &shape);
//! assert_eq!(errors.message("issueType"), Some("Issue Type is required"));
//!
//! let payload = PayloadBuilder::new("afghanistan").build(&draft);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod classifier;
pub mod draft;
pub mod error;
pub mod payload;
pub mod reference;
pub mod types;
pub mod util;
pub mod validation;

// Re-exports for convenience
pub use classifier::{classify, StepShape};
pub use draft::{
    AdminAreaRef, DraftSeed, EntityRef, TicketDraft, UpdateFieldRecord, VerificationAnswers,
};
pub use error::CoreError;
pub use payload::{build_payload, MutationInput, PayloadBuilder, PayloadKind};
pub use reference::{FieldAttribute, FieldGroup, IssueTypeChoice, ReferenceData};
pub use types::{parse_code, Category, DataChangeKind, LookupTarget, StepId};
pub use validation::{ErrorMap, FieldError, StepValidator, ValidationContext};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with grievance drafts
    pub use crate::{
        classify, Category, DataChangeKind, EntityRef, ErrorMap, MutationInput, PayloadBuilder,
        ReferenceData, StepId, StepShape, StepValidator, TicketDraft, UpdateFieldRecord,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
