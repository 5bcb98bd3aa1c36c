//! Payload Builder
//!
//! Turns a validated draft into the `createGrievanceTicket` mutation input.
//! Dispatch is an exhaustive match over the classified selection; anything
//! without a dedicated builder gets the common envelope only.
//!
//! The extras nesting and every field name below are a backend contract.

use crate::classifier::{classify, StepShape};
use crate::draft::{EntityRef, TicketDraft, UpdateFieldRecord};
use crate::types::{parse_code, Category, DataChangeKind};
use crate::util::camel_case;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level mutation variables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationInput {
    pub input: CreateTicketInput,
}

/// Issue type as sent to the backend
///
/// Sensitive-grievance and add/edit-individual tickets send the parsed
/// integer; the remaining data-change paths forward the raw code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IssueTypeValue {
    Parsed(Option<i64>),
    Raw(String),
}

/// Common envelope plus optional extras
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketInput {
    pub business_area: String,
    pub description: String,
    pub assigned_to: Option<String>,
    /// `null` when the draft code is not numeric
    pub category: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<IssueTypeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner: Option<Option<i64>>,
    pub consent: bool,
    pub language: String,
    /// Area p-code
    pub admin: Option<String>,
    pub area: String,
    pub priority: Option<i64>,
    pub urgency: Option<i64>,
    pub linked_tickets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<TicketExtras>,
}

/// `extras.category.*` or `extras.issueType.*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TicketExtras {
    Category(CategoryExtras),
    IssueType(IssueTypeExtras),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryExtras {
    PositiveFeedbackTicketExtras(FeedbackExtras),
    NegativeFeedbackTicketExtras(FeedbackExtras),
    ReferralTicketExtras(FeedbackExtras),
    GrievanceComplaintTicketExtras(ComplaintExtras),
    SensitiveGrievanceTicketExtras(ComplaintExtras),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueTypeExtras {
    AddIndividualIssueTypeExtras(AddIndividualExtras),
    IndividualDataUpdateIssueTypeExtras(IndividualUpdateExtras),
    HouseholdDataUpdateIssueTypeExtras(HouseholdUpdateExtras),
    IndividualDeleteIssueTypeExtras(IndividualDeleteExtras),
    HouseholdDeleteIssueTypeExtras(HouseholdDeleteExtras),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackExtras {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub household: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub individual: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintExtras {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub household: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub individual: Option<String>,
    pub payment_record: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddIndividualExtras {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub household: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub individual_data: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualUpdateExtras {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub individual: Option<String>,
    pub individual_data: IndividualDataUpdate,
}

/// Flat field updates next to the document/identity/payment-channel lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualDataUpdate {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub documents: Vec<Value>,
    pub documents_to_remove: Vec<Value>,
    pub documents_to_edit: Vec<Value>,
    pub identities: Vec<Value>,
    pub identities_to_remove: Vec<Value>,
    pub identities_to_edit: Vec<Value>,
    pub payment_channels: Vec<Value>,
    pub payment_channels_to_remove: Vec<Value>,
    pub payment_channels_to_edit: Vec<Value>,
    pub flex_fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdUpdateExtras {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub household: Option<String>,
    pub household_data: HouseholdDataUpdate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdDataUpdate {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub flex_fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualDeleteExtras {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub individual: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdDeleteExtras {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub household: Option<String>,
}

/// Which builder a selection dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Default,
    PositiveFeedback,
    NegativeFeedback,
    Referral,
    GrievanceComplaint,
    SensitiveGrievance,
    AddIndividual,
    EditIndividual,
    EditHousehold,
    DeleteIndividual,
    DeleteHousehold,
}

impl PayloadKind {
    /// Two-level dispatch: category first, issue type for data changes
    #[must_use]
    pub fn for_shape(shape: &StepShape) -> Self {
        match (shape.category, shape.data_change_kind) {
            (Some(Category::PositiveFeedback), _) => PayloadKind::PositiveFeedback,
            (Some(Category::NegativeFeedback), _) => PayloadKind::NegativeFeedback,
            (Some(Category::Referral), _) => PayloadKind::Referral,
            (Some(Category::GrievanceComplaint), _) => PayloadKind::GrievanceComplaint,
            (Some(Category::SensitiveGrievance), _) => PayloadKind::SensitiveGrievance,
            (Some(Category::DataChange), DataChangeKind::AddIndividual) => PayloadKind::AddIndividual,
            (Some(Category::DataChange), DataChangeKind::EditIndividual) => {
                PayloadKind::EditIndividual
            }
            (Some(Category::DataChange), DataChangeKind::EditHousehold) => {
                PayloadKind::EditHousehold
            }
            (Some(Category::DataChange), DataChangeKind::DeleteIndividual) => {
                PayloadKind::DeleteIndividual
            }
            (Some(Category::DataChange), DataChangeKind::DeleteHousehold) => {
                PayloadKind::DeleteHousehold
            }
            (Some(Category::DataChange), DataChangeKind::None) | (None, _) => PayloadKind::Default,
        }
    }
}

/// Builds mutation input for one business area
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    business_area: String,
}

impl PayloadBuilder {
    #[must_use]
    pub fn new(business_area: impl Into<String>) -> Self {
        Self {
            business_area: business_area.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn business_area(&self) -> &str {
        &self.business_area
    }

    /// Build the payload for the draft's own category and issue type
    #[must_use]
    pub fn build(&self, draft: &TicketDraft) -> MutationInput {
        let shape = classify(draft.category.as_deref(), draft.issue_type.as_deref());
        self.build_for(&shape, draft)
    }

    /// Build the payload for an already classified selection
    #[must_use]
    pub fn build_for(&self, shape: &StepShape, draft: &TicketDraft) -> MutationInput {
        let kind = PayloadKind::for_shape(shape);
        tracing::debug!(?kind, "building ticket payload");

        let mut input = self.envelope(draft);
        match kind {
            PayloadKind::Default => {}
            PayloadKind::PositiveFeedback => {
                input.extras = Some(TicketExtras::Category(
                    CategoryExtras::PositiveFeedbackTicketExtras(feedback_extras(draft)),
                ));
            }
            PayloadKind::NegativeFeedback => {
                input.extras = Some(TicketExtras::Category(
                    CategoryExtras::NegativeFeedbackTicketExtras(feedback_extras(draft)),
                ));
            }
            PayloadKind::Referral => {
                input.extras = Some(TicketExtras::Category(CategoryExtras::ReferralTicketExtras(
                    feedback_extras(draft),
                )));
            }
            PayloadKind::GrievanceComplaint => {
                input.extras = Some(TicketExtras::Category(
                    CategoryExtras::GrievanceComplaintTicketExtras(complaint_extras(draft)),
                ));
            }
            PayloadKind::SensitiveGrievance => {
                input.issue_type = Some(parsed_issue_type(draft));
                input.partner = Some(draft.partner.as_deref().and_then(parse_code));
                input.extras = Some(TicketExtras::Category(
                    CategoryExtras::SensitiveGrievanceTicketExtras(complaint_extras(draft)),
                ));
            }
            PayloadKind::AddIndividual => {
                input.issue_type = Some(parsed_issue_type(draft));
                input.extras = Some(TicketExtras::IssueType(
                    IssueTypeExtras::AddIndividualIssueTypeExtras(AddIndividualExtras {
                        household: entity_id(draft.selected_household.as_ref()),
                        individual_data: draft.individual_data.clone(),
                    }),
                ));
            }
            PayloadKind::EditIndividual => {
                input.issue_type = Some(parsed_issue_type(draft));
                input.extras = Some(TicketExtras::IssueType(
                    IssueTypeExtras::IndividualDataUpdateIssueTypeExtras(IndividualUpdateExtras {
                        individual: entity_id(draft.selected_individual.as_ref()),
                        individual_data: individual_update(draft),
                    }),
                ));
            }
            PayloadKind::EditHousehold => {
                input.issue_type = raw_issue_type(draft);
                let (fields, flex_fields) =
                    split_updates(&draft.household_data_update_fields, FlexKeys::Original);
                input.extras = Some(TicketExtras::IssueType(
                    IssueTypeExtras::HouseholdDataUpdateIssueTypeExtras(HouseholdUpdateExtras {
                        household: entity_id(draft.selected_household.as_ref()),
                        household_data: HouseholdDataUpdate {
                            fields,
                            flex_fields,
                        },
                    }),
                ));
            }
            PayloadKind::DeleteIndividual => {
                input.issue_type = raw_issue_type(draft);
                input.extras = Some(TicketExtras::IssueType(
                    IssueTypeExtras::IndividualDeleteIssueTypeExtras(IndividualDeleteExtras {
                        individual: entity_id(draft.selected_individual.as_ref()),
                    }),
                ));
            }
            PayloadKind::DeleteHousehold => {
                input.issue_type = raw_issue_type(draft);
                input.extras = Some(TicketExtras::IssueType(
                    IssueTypeExtras::HouseholdDeleteIssueTypeExtras(HouseholdDeleteExtras {
                        household: entity_id(draft.selected_household.as_ref()),
                    }),
                ));
            }
        }

        MutationInput { input }
    }

    fn envelope(&self, draft: &TicketDraft) -> CreateTicketInput {
        CreateTicketInput {
            business_area: self.business_area.clone(),
            description: draft.description.clone(),
            assigned_to: draft.assigned_to.clone(),
            category: draft.category.as_deref().and_then(parse_code),
            issue_type: None,
            partner: None,
            consent: draft.consent,
            language: draft.language.clone(),
            admin: draft.admin.as_ref().map(|a| a.p_code.clone()),
            area: draft.area.clone(),
            priority: draft.priority,
            urgency: draft.urgency,
            linked_tickets: draft.selected_related_tickets.clone(),
            extras: None,
        }
    }
}

/// Build the mutation input for an explicit category and issue type
#[must_use]
pub fn build_payload(
    business_area: &str,
    category: Option<&str>,
    issue_type: Option<&str>,
    draft: &TicketDraft,
) -> MutationInput {
    let shape = classify(category, issue_type);
    PayloadBuilder::new(business_area).build_for(&shape, draft)
}

/// How flex-field keys are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlexKeys {
    CamelCase,
    /// Household flex data is stored under the original names
    Original,
}

fn split_updates(
    records: &[UpdateFieldRecord],
    flex_keys: FlexKeys,
) -> (Map<String, Value>, Map<String, Value>) {
    let mut fields = Map::new();
    let mut flex = Map::new();
    for record in records.iter().filter(|r| r.is_named()) {
        if record.is_flex_field {
            let key = match flex_keys {
                FlexKeys::CamelCase => camel_case(&record.field_name),
                FlexKeys::Original => record.field_name.clone(),
            };
            flex.insert(key, record.field_value.clone());
        } else {
            fields.insert(camel_case(&record.field_name), record.field_value.clone());
        }
    }
    (fields, flex)
}

fn individual_update(draft: &TicketDraft) -> IndividualDataUpdate {
    let (fields, flex_fields) =
        split_updates(&draft.individual_data_update_fields, FlexKeys::CamelCase);
    IndividualDataUpdate {
        fields,
        documents: draft.individual_data_update_fields_documents.clone(),
        documents_to_remove: draft.individual_data_update_documents_to_remove.clone(),
        documents_to_edit: draft.individual_data_update_documents_to_edit.clone(),
        identities: draft.individual_data_update_fields_identities.clone(),
        identities_to_remove: draft.individual_data_update_identities_to_remove.clone(),
        identities_to_edit: draft.individual_data_update_identities_to_edit.clone(),
        payment_channels: draft.individual_data_update_fields_payment_channels.clone(),
        payment_channels_to_remove: draft
            .individual_data_update_payment_channels_to_remove
            .clone(),
        payment_channels_to_edit: draft.individual_data_update_payment_channels_to_edit.clone(),
        flex_fields,
    }
}

fn entity_id(entity: Option<&EntityRef>) -> Option<String> {
    entity.map(|e| e.id.clone())
}

fn feedback_extras(draft: &TicketDraft) -> FeedbackExtras {
    FeedbackExtras {
        household: entity_id(draft.selected_household.as_ref()),
        individual: entity_id(draft.selected_individual.as_ref()),
    }
}

fn complaint_extras(draft: &TicketDraft) -> ComplaintExtras {
    ComplaintExtras {
        household: entity_id(draft.selected_household.as_ref()),
        individual: entity_id(draft.selected_individual.as_ref()),
        payment_record: draft.selected_payment_records.clone(),
    }
}

fn parsed_issue_type(draft: &TicketDraft) -> IssueTypeValue {
    IssueTypeValue::Parsed(draft.issue_type.as_deref().and_then(parse_code))
}

fn raw_issue_type(draft: &TicketDraft) -> Option<IssueTypeValue> {
    draft.issue_type.clone().map(IssueTypeValue::Raw)
}
