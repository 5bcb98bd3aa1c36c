//! Form-state store
//!
//! The controller never touches draft fields directly; every read and write
//! goes through a [`FormStore`].

use crate::error::StoreError;
use grievance_core::TicketDraft;
use serde_json::Value;

/// Holds the field values of one wizard session
pub trait FormStore: Send {
    /// Current value of a field, `None` for unknown names
    fn get_field(&self, name: &str) -> Option<Value>;

    /// Replace a field value
    fn set_field(&mut self, name: &str, value: Value) -> Result<(), StoreError>;

    /// Snapshot of the whole draft
    fn get_all(&self) -> TicketDraft;

    /// Discard every value
    fn reset(&mut self);
}

/// Store backed by an owned [`TicketDraft`]
///
/// Field names are the draft's JSON names (`selectedHousehold`,
/// `questionnaire_size`, ...). Writes go through serde so a value of the
/// wrong shape is rejected and the draft stays untouched.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFormStore {
    draft: TicketDraft,
}

impl InMemoryFormStore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_draft(draft: TicketDraft) -> Self {
        Self { draft }
    }

    #[inline]
    #[must_use]
    pub fn draft(&self) -> &TicketDraft {
        &self.draft
    }
}

impl FormStore for InMemoryFormStore {
    fn get_field(&self, name: &str) -> Option<Value> {
        let mut value = self.draft.to_value().ok()?;
        value.as_object_mut()?.remove(name)
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), StoreError> {
        let mut current = self.draft.to_value()?;
        let fields = current
            .as_object_mut()
            .ok_or_else(|| StoreError::UnknownField(name.to_string()))?;
        match fields.get_mut(name) {
            Some(slot) => *slot = value,
            None => return Err(StoreError::UnknownField(name.to_string())),
        }
        self.draft = TicketDraft::from_value(current).map_err(|e| StoreError::InvalidValue {
            field: name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    fn get_all(&self) -> TicketDraft {
        self.draft.clone()
    }

    fn reset(&mut self) {
        self.draft = TicketDraft::default();
    }
}
