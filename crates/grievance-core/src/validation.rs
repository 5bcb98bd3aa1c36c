//! Step Validator
//!
//! Evaluates the rules of one wizard step against a draft. Validation is
//! pure: the same draft, shape and reference data always produce the same
//! [`ErrorMap`], and nothing is ever raised for a field problem.
//!
//! # Rules by step
//!
//! - `Selection`: category present, issue type present when the category needs one
//! - `Lookup`: the household or individual the data-change kind targets
//! - `Verification`: questionnaire minimum, consent
//! - `Description`: consent, description, data-change sub-forms

use crate::classifier::StepShape;
use crate::draft::{TicketDraft, UpdateFieldRecord};
use crate::reference::{FieldGroup, ReferenceData};
use crate::types::{DataChangeKind, LookupTarget, StepId};
use crate::util::camel_case;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

pub const CATEGORY_REQUIRED: &str = "Category is required";
pub const ISSUE_TYPE_REQUIRED: &str = "Issue Type is required";
pub const HOUSEHOLD_REQUIRED: &str = "Household is Required";
pub const INDIVIDUAL_REQUIRED: &str = "Individual is Required";
pub const CONSENT_REQUIRED: &str = "Consent is required";
pub const DESCRIPTION_REQUIRED: &str = "Description is required";
pub const FIELD_REQUIRED: &str = "Field Required";
pub const INDIVIDUAL_CHANGE_REQUIRED: &str = "Individual Data Change is Required";
pub const HOUSEHOLD_CHANGE_REQUIRED: &str = "Household Data Change is Required";

/// Error entry for one field or field group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldError {
    Message(String),
    Group(IndexMap<String, String>),
}

/// Field name -> error, in the order rules raised them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorMap(IndexMap<String, FieldError>);

impl ErrorMap {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty map means the step may advance
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn insert(&mut self, field: &str, message: &str) {
        self.0
            .insert(field.to_string(), FieldError::Message(message.to_string()));
    }

    /// Record an error nested under a group; a plain message on the group wins
    pub fn insert_nested(&mut self, group: &str, field: &str, message: &str) {
        let entry = self
            .0
            .entry(group.to_string())
            .or_insert_with(|| FieldError::Group(IndexMap::new()));
        if let FieldError::Group(inner) = entry {
            inner.insert(field.to_string(), message.to_string());
        }
    }

    /// Add entries from another map; existing fields keep their error
    pub fn merge(&mut self, other: ErrorMap) {
        for (field, error) in other.0 {
            self.0.entry(field).or_insert(error);
        }
    }

    #[inline]
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.0.get(field)
    }

    /// Message of a non-grouped field
    #[must_use]
    pub fn message(&self, field: &str) -> Option<&str> {
        match self.0.get(field)? {
            FieldError::Message(m) => Some(m.as_str()),
            FieldError::Group(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every message, grouped entries flattened
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.0
            .values()
            .flat_map(|entry| match entry {
                FieldError::Message(m) => vec![m.clone()],
                FieldError::Group(inner) => inner.values().cloned().collect(),
            })
            .collect()
    }
}

/// Tunable thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    /// Minimum questionnaire answers when an entity is selected
    pub min_verified_questions: usize,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self {
            min_verified_questions: 5,
        }
    }
}

/// Validator bound to one session's reference data
#[derive(Debug, Clone, Default)]
pub struct StepValidator {
    reference: Arc<ReferenceData>,
    context: ValidationContext,
}

impl StepValidator {
    /// Validator with default thresholds
    #[must_use]
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self {
            reference,
            context: ValidationContext::default(),
        }
    }

    /// Validator with custom thresholds
    #[must_use]
    pub fn with_context(reference: Arc<ReferenceData>, context: ValidationContext) -> Self {
        Self { reference, context }
    }

    #[inline]
    #[must_use]
    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    #[inline]
    #[must_use]
    pub fn context(&self) -> ValidationContext {
        self.context
    }

    /// Validate the fields owned by `step`
    #[must_use]
    pub fn validate_step(&self, step: StepId, draft: &TicketDraft, shape: &StepShape) -> ErrorMap {
        let mut errors = ErrorMap::new();
        match step {
            StepId::Selection => self.check_selection(draft, shape, &mut errors),
            StepId::Lookup => self.check_lookup(draft, shape, &mut errors),
            StepId::Verification => {
                self.check_questionnaire(draft, &mut errors);
                self.check_consent(draft, &mut errors);
            }
            StepId::Description => {
                self.check_consent(draft, &mut errors);
                self.check_description(draft, &mut errors);
                self.check_data_change(draft, shape, &mut errors, true);
            }
        }
        tracing::trace!(%step, errors = errors.len(), "step validated");
        errors
    }

    /// Step-less validation for editing an existing ticket
    ///
    /// Only field required-ness inside data-change sub-forms is checked.
    #[must_use]
    pub fn validate_ticket_edit(&self, draft: &TicketDraft, shape: &StepShape) -> ErrorMap {
        let mut errors = ErrorMap::new();
        self.check_data_change(draft, shape, &mut errors, false);
        errors
    }

    fn check_selection(&self, draft: &TicketDraft, shape: &StepShape, errors: &mut ErrorMap) {
        if draft.category.is_none() {
            errors.insert("category", CATEGORY_REQUIRED);
        }
        if shape.requires_issue_type && draft.issue_type.is_none() {
            errors.insert("issueType", ISSUE_TYPE_REQUIRED);
        }
    }

    fn check_lookup(&self, draft: &TicketDraft, shape: &StepShape, errors: &mut ErrorMap) {
        match shape.lookup_target {
            LookupTarget::Household if draft.selected_household.is_none() => {
                errors.insert("selectedHousehold", HOUSEHOLD_REQUIRED);
            }
            LookupTarget::Individual if draft.selected_individual.is_none() => {
                errors.insert("selectedIndividual", INDIVIDUAL_REQUIRED);
            }
            _ => {}
        }
    }

    fn check_questionnaire(&self, draft: &TicketDraft, errors: &mut ErrorMap) {
        let applies = draft.selected_household.is_some()
            || (draft.selected_individual.is_some() && !draft.verification_override);
        if !applies {
            return;
        }
        let minimum = self.context.min_verified_questions;
        if draft.verification.confirmed_count() < minimum {
            errors.insert(
                "verificationRequired",
                &format!("Select correctly minimum {minimum} questions"),
            );
        }
    }

    fn check_consent(&self, draft: &TicketDraft, errors: &mut ErrorMap) {
        if !draft.consent {
            errors.insert("consent", CONSENT_REQUIRED);
        }
    }

    fn check_description(&self, draft: &TicketDraft, errors: &mut ErrorMap) {
        if draft.description.trim().is_empty() {
            errors.insert("description", DESCRIPTION_REQUIRED);
        }
    }

    fn check_data_change(
        &self,
        draft: &TicketDraft,
        shape: &StepShape,
        errors: &mut ErrorMap,
        require_change: bool,
    ) {
        if !shape.is_data_change() {
            return;
        }
        match shape.data_change_kind {
            DataChangeKind::AddIndividual => self.check_new_individual(draft, errors),
            DataChangeKind::EditIndividual => {
                if require_change && !has_individual_change(draft) {
                    errors.insert("individualDataUpdateFields", INDIVIDUAL_CHANGE_REQUIRED);
                    return;
                }
                self.check_update_fields(
                    "individualDataUpdateFields",
                    FieldGroup::Individual,
                    &draft.individual_data_update_fields,
                    errors,
                );
            }
            DataChangeKind::EditHousehold => {
                if require_change && !has_named_first(&draft.household_data_update_fields) {
                    errors.insert("householdDataUpdateFields", HOUSEHOLD_CHANGE_REQUIRED);
                    return;
                }
                self.check_update_fields(
                    "householdDataUpdateFields",
                    FieldGroup::Household,
                    &draft.household_data_update_fields,
                    errors,
                );
            }
            DataChangeKind::DeleteIndividual
            | DataChangeKind::DeleteHousehold
            | DataChangeKind::None => {}
        }
    }

    fn check_new_individual(&self, draft: &TicketDraft, errors: &mut ErrorMap) {
        let empty = serde_json::Map::new();
        let data = draft.individual_data.as_ref().unwrap_or(&empty);
        for field in self.reference.required_fields(FieldGroup::AddIndividual) {
            let key = camel_case(field);
            let value = data.get(&key).or_else(|| data.get(field));
            if value.map_or(true, is_missing) {
                errors.insert_nested("individualData", &key, FIELD_REQUIRED);
            }
        }
    }

    fn check_update_fields(
        &self,
        group_name: &str,
        group: FieldGroup,
        records: &[UpdateFieldRecord],
        errors: &mut ErrorMap,
    ) {
        for record in records.iter().filter(|r| r.is_named()) {
            if self.reference.is_required(group, &record.field_name)
                && is_missing(&record.field_value)
            {
                errors.insert_nested(group_name, &record.field_name, FIELD_REQUIRED);
            }
        }
    }
}

/// `null`, empty strings and `false` count as missing; zero never does
#[must_use]
pub fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Bool(true) | Value::Number(_) | Value::Array(_) | Value::Object(_) => false,
    }
}

/// Update rows count only when the first row names a field
fn has_named_first(records: &[UpdateFieldRecord]) -> bool {
    records.first().is_some_and(UpdateFieldRecord::is_named)
}

fn has_individual_change(draft: &TicketDraft) -> bool {
    has_named_first(&draft.individual_data_update_fields)
        || draft
            .individual_change_lists()
            .iter()
            .any(|list| !list.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::draft::EntityRef;
    use crate::reference::FieldAttribute;
    use serde_json::json;

    fn validator() -> StepValidator {
        StepValidator::new(Arc::new(ReferenceData::new()))
    }

    #[test]
    fn zero_is_present() {
        assert!(!is_missing(&json!(0)));
        assert!(!is_missing(&json!(0.0)));
        assert!(is_missing(&json!(null)));
        assert!(is_missing(&json!("")));
        assert!(is_missing(&json!(false)));
        assert!(!is_missing(&json!([])));
    }

    #[test]
    fn selection_requires_issue_type_for_sensitive() {
        let draft = TicketDraft {
            category: Some("3".into()),
            ..TicketDraft::default()
        };
        let shape = classify(draft.category.as_deref(), None);
        let errors = validator().validate_step(StepId::Selection, &draft, &shape);
        assert_eq!(errors.message("issueType"), Some(ISSUE_TYPE_REQUIRED));
        assert!(!errors.contains("category"));
    }

    #[test]
    fn questionnaire_skipped_without_entity() {
        let draft = TicketDraft {
            consent: true,
            ..TicketDraft::default()
        };
        let errors = validator().validate_step(StepId::Verification, &draft, &StepShape::DEFAULT);
        assert!(errors.is_empty());
    }

    #[test]
    fn override_waives_individual_questionnaire() {
        let draft = TicketDraft {
            consent: true,
            selected_individual: Some(EntityRef::new("IND-1")),
            verification_override: true,
            ..TicketDraft::default()
        };
        let errors = validator().validate_step(StepId::Verification, &draft, &StepShape::DEFAULT);
        assert!(errors.is_empty());
    }

    #[test]
    fn grouped_required_fields_for_new_individual() {
        let reference = ReferenceData::new()
            .with_field(FieldGroup::AddIndividual, "full_name", FieldAttribute::required())
            .with_field(FieldGroup::AddIndividual, "phone_no", FieldAttribute::optional());
        let validator = StepValidator::new(Arc::new(reference));

        let mut draft = TicketDraft {
            category: Some("2".into()),
            issue_type: Some("16".into()),
            consent: true,
            description: "new member".into(),
            ..TicketDraft::default()
        };
        let shape = classify(draft.category.as_deref(), draft.issue_type.as_deref());

        let errors = validator.validate_step(StepId::Description, &draft, &shape);
        match errors.get("individualData") {
            Some(FieldError::Group(inner)) => {
                assert_eq!(inner.get("fullName").map(String::as_str), Some(FIELD_REQUIRED));
                assert!(!inner.contains_key("phoneNo"));
            }
            other => panic!("expected grouped error, got {other:?}"),
        }

        let mut data = serde_json::Map::new();
        data.insert("fullName".into(), json!("Jane Doe"));
        draft.individual_data = Some(data);
        assert!(validator.validate_step(StepId::Description, &draft, &shape).is_empty());
    }

    #[test]
    fn error_map_serializes_nested() {
        let mut errors = ErrorMap::new();
        errors.insert("consent", CONSENT_REQUIRED);
        errors.insert_nested("individualData", "sex", FIELD_REQUIRED);
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({ "consent": CONSENT_REQUIRED, "individualData": { "sex": FIELD_REQUIRED } })
        );
        assert_eq!(errors.messages().len(), 2);
    }
}
