//! Category/issue-type classifier
//!
//! Maps a (category, issue type) selection to the [`StepShape`] that drives
//! validation and payload dispatch. Total over every input: unknown or
//! missing codes classify to the default shape.

use crate::draft::TicketDraft;
use crate::types::{Category, DataChangeKind, LookupTarget, StepId};
use serde::Serialize;

/// Derived descriptor of the wizard for one selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepShape {
    /// Recognized category, if any
    pub category: Option<Category>,
    pub step_sequence: &'static [StepId],
    pub requires_issue_type: bool,
    pub data_change_kind: DataChangeKind,
    pub lookup_target: LookupTarget,
}

impl StepShape {
    /// Shape used for unknown selections: generic fields only
    pub const DEFAULT: StepShape = StepShape {
        category: None,
        step_sequence: &StepId::SEQUENCE,
        requires_issue_type: false,
        data_change_kind: DataChangeKind::None,
        lookup_target: LookupTarget::Any,
    };

    /// Steps actually visited; a preset lookup entity skips `Lookup`
    #[must_use]
    pub fn effective_sequence(&self, preset_entity: bool) -> Vec<StepId> {
        self.step_sequence
            .iter()
            .copied()
            .filter(|step| !(preset_entity && *step == StepId::Lookup))
            .collect()
    }

    /// Whether the draft already holds the entity the lookup step selects
    ///
    /// Only then may a preset entity skip `Lookup`.
    #[must_use]
    pub fn lookup_satisfied_by(&self, draft: &TicketDraft) -> bool {
        match self.lookup_target {
            LookupTarget::Household => draft.selected_household.is_some(),
            LookupTarget::Individual => draft.selected_individual.is_some(),
            LookupTarget::Any => draft.has_lookup_entity(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_data_change(&self) -> bool {
        self.category == Some(Category::DataChange)
    }
}

impl Default for StepShape {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Classify a selection given as raw draft codes
#[must_use]
pub fn classify(category: Option<&str>, issue_type: Option<&str>) -> StepShape {
    let Some(category) = category.and_then(Category::from_code) else {
        return StepShape::DEFAULT;
    };

    let data_change_kind = match (category, issue_type) {
        (Category::DataChange, Some(code)) => DataChangeKind::from_issue_type(code),
        _ => DataChangeKind::None,
    };

    StepShape {
        category: Some(category),
        step_sequence: &StepId::SEQUENCE,
        requires_issue_type: category.requires_issue_type(),
        data_change_kind,
        lookup_target: data_change_kind.lookup_target(),
    }
}
