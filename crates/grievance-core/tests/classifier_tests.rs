use grievance_core::{classify, Category, DataChangeKind, LookupTarget, StepId, StepShape};
use proptest::prelude::*;

fn category_code() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        (1u32..10).prop_map(|c| Some(c.to_string())),
        "[a-zA-Z_ ]{0,12}".prop_map(Some),
    ]
}

fn issue_type_code() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        (1u32..20).prop_map(|c| Some(c.to_string())),
        "[a-z0-9]{0,6}".prop_map(Some),
    ]
}

#[test]
fn requires_issue_type_for_known_categories() {
    for category in Category::ALL {
        let shape = classify(Some(category.code()), None);
        let expected = matches!(
            category,
            Category::SensitiveGrievance | Category::DataChange
        );
        assert_eq!(shape.requires_issue_type, expected, "{category}");
        assert_eq!(shape.category, Some(category));
    }
}

#[test]
fn every_data_change_kind_has_its_target() {
    for kind in DataChangeKind::KNOWN {
        let shape = classify(Some(Category::DataChange.code()), kind.issue_type_code());
        assert_eq!(shape.data_change_kind, kind);
        let expected = match kind {
            DataChangeKind::EditIndividual | DataChangeKind::DeleteIndividual => {
                LookupTarget::Individual
            }
            _ => LookupTarget::Household,
        };
        assert_eq!(shape.lookup_target, expected);
    }
}

#[test]
fn data_change_without_known_issue_type_has_no_sub_form() {
    let shape = classify(Some("2"), None);
    assert!(shape.requires_issue_type);
    assert_eq!(shape.data_change_kind, DataChangeKind::None);
    assert_eq!(shape.lookup_target, LookupTarget::Any);
}

proptest! {
    #[test]
    fn prop_classify_is_total_and_consistent(
        category in category_code(),
        issue_type in issue_type_code(),
    ) {
        let shape = classify(category.as_deref(), issue_type.as_deref());
        let known = category.as_deref().and_then(Category::from_code);

        prop_assert_eq!(shape.category, known);
        prop_assert_eq!(shape.requires_issue_type, known.is_some_and(Category::requires_issue_type));
        prop_assert_eq!(shape.step_sequence, &StepId::SEQUENCE[..]);
        if known != Some(Category::DataChange) {
            prop_assert_eq!(shape.data_change_kind, DataChangeKind::None);
        }
        if known.is_none() {
            prop_assert_eq!(shape, StepShape::DEFAULT);
        }
    }

    #[test]
    fn prop_classify_is_deterministic(
        category in category_code(),
        issue_type in issue_type_code(),
    ) {
        let a = classify(category.as_deref(), issue_type.as_deref());
        let b = classify(category.as_deref(), issue_type.as_deref());
        prop_assert_eq!(a, b);
    }
}
