use grievance_core::validation::{
    CONSENT_REQUIRED, DESCRIPTION_REQUIRED, FIELD_REQUIRED, HOUSEHOLD_CHANGE_REQUIRED,
    HOUSEHOLD_REQUIRED, INDIVIDUAL_CHANGE_REQUIRED, INDIVIDUAL_REQUIRED,
};
use grievance_core::{
    classify, Category, DataChangeKind, EntityRef, FieldError, ReferenceData, StepId, StepValidator,
    TicketDraft, UpdateFieldRecord,
};
use grievance_test_utils::{answers, data_change_draft, draft, reference_data};
use serde_json::json;
use std::sync::Arc;

fn validator() -> StepValidator {
    StepValidator::new(Arc::new(reference_data()))
}

fn validate(step: StepId, draft: &TicketDraft) -> grievance_core::ErrorMap {
    let shape = classify(draft.category.as_deref(), draft.issue_type.as_deref());
    validator().validate_step(step, draft, &shape)
}

fn ready_for_description(mut draft: TicketDraft) -> TicketDraft {
    draft.consent = true;
    draft.description = "Household reported a change".into();
    draft
}

#[test]
fn add_individual_lookup_requires_household() {
    let mut d = data_change_draft(DataChangeKind::AddIndividual);
    d.selected_household = None;

    let errors = validate(StepId::Lookup, &d);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.message("selectedHousehold"), Some(HOUSEHOLD_REQUIRED));
}

#[test]
fn individual_kinds_require_individual() {
    for kind in [DataChangeKind::EditIndividual, DataChangeKind::DeleteIndividual] {
        let mut d = data_change_draft(kind);
        d.selected_individual = None;
        let errors = validate(StepId::Lookup, &d);
        assert_eq!(errors.message("selectedIndividual"), Some(INDIVIDUAL_REQUIRED));
        assert!(!errors.contains("selectedHousehold"));
    }
}

#[test]
fn lookup_is_optional_for_feedback() {
    let d = draft(Category::NegativeFeedback, None);
    assert!(validate(StepId::Lookup, &d).is_empty());
}

#[test]
fn verification_boundary_at_five_answers() {
    let mut d = draft(Category::GrievanceComplaint, None);
    d.selected_household = Some(EntityRef::new("HH-1"));
    d.consent = true;

    d.verification = answers(4);
    let errors = validate(StepId::Verification, &d);
    assert!(errors.contains("verificationRequired"));
    assert_eq!(errors.len(), 1);

    d.verification = answers(5);
    assert!(validate(StepId::Verification, &d).is_empty());
}

#[test]
fn individual_without_override_needs_questionnaire() {
    let mut d = draft(Category::Referral, None);
    d.selected_individual = Some(EntityRef::new("IND-1"));
    d.consent = true;
    d.verification = answers(2);
    assert!(validate(StepId::Verification, &d).contains("verificationRequired"));

    d.verification_override = true;
    assert!(validate(StepId::Verification, &d).is_empty());
}

#[test]
fn consent_from_verification_onward() {
    let d = draft(Category::PositiveFeedback, None);
    assert!(!validate(StepId::Selection, &d).contains("consent"));
    assert!(!validate(StepId::Lookup, &d).contains("consent"));
    assert_eq!(validate(StepId::Verification, &d).message("consent"), Some(CONSENT_REQUIRED));
    assert_eq!(validate(StepId::Description, &d).message("consent"), Some(CONSENT_REQUIRED));
}

#[test]
fn description_step_requires_description() {
    let mut d = draft(Category::Referral, None);
    d.consent = true;
    assert_eq!(
        validate(StepId::Description, &d).message("description"),
        Some(DESCRIPTION_REQUIRED)
    );
}

#[test]
fn edit_individual_needs_a_change() {
    let mut d = ready_for_description(data_change_draft(DataChangeKind::EditIndividual));

    let errors = validate(StepId::Description, &d);
    assert_eq!(
        errors.message("individualDataUpdateFields"),
        Some(INDIVIDUAL_CHANGE_REQUIRED)
    );

    d.individual_data_update_fields = vec![UpdateFieldRecord::new("phone_no", json!("+93 700"))];
    assert!(validate(StepId::Description, &d).is_empty());
}

#[test]
fn blank_first_update_row_does_not_count() {
    let mut d = ready_for_description(data_change_draft(DataChangeKind::EditIndividual));
    d.individual_data_update_fields = vec![
        UpdateFieldRecord::new("", json!(null)),
        UpdateFieldRecord::new("phone_no", json!("+93 700")),
    ];
    assert!(validate(StepId::Description, &d).contains("individualDataUpdateFields"));
}

#[test]
fn any_change_collection_satisfies_edit_individual() {
    let base = ready_for_description(data_change_draft(DataChangeKind::EditIndividual));
    let setters: [fn(&mut TicketDraft); 9] = [
        |d| d.individual_data_update_fields_documents.push(json!({"type": "NATIONAL_ID"})),
        |d| d.individual_data_update_documents_to_edit.push(json!({"id": "DOC-1"})),
        |d| d.individual_data_update_documents_to_remove.push(json!("DOC-2")),
        |d| d.individual_data_update_fields_identities.push(json!({"partner": "UNHCR"})),
        |d| d.individual_data_update_identities_to_edit.push(json!({"id": "ID-1"})),
        |d| d.individual_data_update_identities_to_remove.push(json!("ID-2")),
        |d| d.individual_data_update_fields_payment_channels.push(json!({"type": "BANK"})),
        |d| d.individual_data_update_payment_channels_to_remove.push(json!("PC-1")),
        |d| d.individual_data_update_payment_channels_to_edit.push(json!({"id": "PC-2"})),
    ];
    for set in setters {
        let mut d = base.clone();
        set(&mut d);
        assert!(validate(StepId::Description, &d).is_empty());
    }
}

#[test]
fn edit_individual_required_field_left_blank() {
    let mut d = ready_for_description(data_change_draft(DataChangeKind::EditIndividual));
    d.individual_data_update_fields = vec![UpdateFieldRecord::new("full_name", json!(""))];

    match validate(StepId::Description, &d).get("individualDataUpdateFields") {
        Some(FieldError::Group(inner)) => {
            assert_eq!(inner.get("full_name").map(String::as_str), Some(FIELD_REQUIRED));
        }
        other => panic!("expected grouped error, got {other:?}"),
    }
}

#[test]
fn edit_household_needs_a_change() {
    let d = ready_for_description(data_change_draft(DataChangeKind::EditHousehold));
    assert_eq!(
        validate(StepId::Description, &d).message("householdDataUpdateFields"),
        Some(HOUSEHOLD_CHANGE_REQUIRED)
    );
}

#[test]
fn zero_satisfies_required_household_field() {
    let mut d = ready_for_description(data_change_draft(DataChangeKind::EditHousehold));
    d.household_data_update_fields = vec![UpdateFieldRecord::new("size", json!(0))];
    assert!(reference_data().is_required(grievance_core::FieldGroup::Household, "size"));

    let errors = validate(StepId::Description, &d);
    assert!(!errors.contains("householdDataUpdateFields"), "{errors:?}");

    d.household_data_update_fields = vec![UpdateFieldRecord::new("size", json!(null))];
    assert!(validate(StepId::Description, &d).contains("householdDataUpdateFields"));
}

#[test]
fn missing_reference_entries_fail_open() {
    let mut d = ready_for_description(data_change_draft(DataChangeKind::AddIndividual));
    d.individual_data = Some(serde_json::Map::new());

    let shape = classify(d.category.as_deref(), d.issue_type.as_deref());
    let empty = StepValidator::new(Arc::new(ReferenceData::new()));
    assert!(empty.validate_step(StepId::Description, &d, &shape).is_empty());

    let errors = validator().validate_step(StepId::Description, &d, &shape);
    match errors.get("individualData") {
        Some(FieldError::Group(inner)) => {
            let fields: Vec<&str> = inner.keys().map(String::as_str).collect();
            assert_eq!(fields, vec!["birthDate", "fullName", "sex"]);
        }
        other => panic!("expected grouped error, got {other:?}"),
    }
}

#[test]
fn validation_is_idempotent() {
    let d = data_change_draft(DataChangeKind::EditIndividual);
    for step in StepId::SEQUENCE {
        assert_eq!(validate(step, &d), validate(step, &d));
    }
}

#[test]
fn ticket_edit_skips_step_rules() {
    let mut d = data_change_draft(DataChangeKind::EditIndividual);
    d.selected_individual = None;
    let shape = classify(d.category.as_deref(), d.issue_type.as_deref());

    assert!(validator().validate_ticket_edit(&d, &shape).is_empty());

    d.individual_data_update_fields = vec![UpdateFieldRecord::new("full_name", json!(null))];
    assert!(validator()
        .validate_ticket_edit(&d, &shape)
        .contains("individualDataUpdateFields"));
}
