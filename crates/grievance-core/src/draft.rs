//! Ticket draft - the form state built up across wizard steps
//!
//! Field names serialize in the camelCase the form store and the renderer
//! bind to. Questionnaire answers keep their historical `questionnaire_*`
//! names.

use crate::error::CoreError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Reference to a household or individual record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub id: String,
    #[serde(default)]
    pub unicef_id: Option<String>,
}

impl EntityRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            unicef_id: None,
        }
    }
}

/// Administrative area selection
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAreaRef {
    pub p_code: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// One row of a data-update form
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateFieldRecord {
    pub field_name: String,
    pub field_value: Value,
    pub is_flex_field: bool,
}

impl UpdateFieldRecord {
    pub fn new(field_name: impl Into<String>, field_value: Value) -> Self {
        Self {
            field_name: field_name.into(),
            field_value,
            is_flex_field: false,
        }
    }

    pub fn flex(field_name: impl Into<String>, field_value: Value) -> Self {
        Self {
            field_name: field_name.into(),
            field_value,
            is_flex_field: true,
        }
    }

    /// Rows without a field name are blank form lines
    #[inline]
    #[must_use]
    pub fn is_named(&self) -> bool {
        !self.field_name.is_empty()
    }
}

/// Verification questionnaire answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationAnswers {
    #[serde(rename = "questionnaire_size")]
    pub size: bool,
    #[serde(rename = "questionnaire_maleChildrenCount")]
    pub male_children_count: bool,
    #[serde(rename = "questionnaire_femaleChildrenCount")]
    pub female_children_count: bool,
    #[serde(rename = "questionnaire_childrenDisabledCount")]
    pub children_disabled_count: bool,
    #[serde(rename = "questionnaire_headOfHousehold")]
    pub head_of_household: bool,
    #[serde(rename = "questionnaire_countryOrigin")]
    pub country_origin: bool,
    #[serde(rename = "questionnaire_address")]
    pub address: bool,
    #[serde(rename = "questionnaire_village")]
    pub village: bool,
    #[serde(rename = "questionnaire_admin1")]
    pub admin1: bool,
    #[serde(rename = "questionnaire_admin2")]
    pub admin2: bool,
    #[serde(rename = "questionnaire_fullName")]
    pub full_name: bool,
    #[serde(rename = "questionnaire_birthDate")]
    pub birth_date: bool,
    #[serde(rename = "questionnaire_phoneNo")]
    pub phone_no: bool,
    #[serde(rename = "questionnaire_relationship")]
    pub relationship: bool,
    #[serde(rename = "questionnaire_sex")]
    pub sex: bool,
}

impl VerificationAnswers {
    /// Number of tracked questionnaire fields
    pub const TRACKED: usize = 15;

    fn answers(&self) -> [bool; Self::TRACKED] {
        [
            self.size,
            self.male_children_count,
            self.female_children_count,
            self.children_disabled_count,
            self.head_of_household,
            self.country_origin,
            self.address,
            self.village,
            self.admin1,
            self.admin2,
            self.full_name,
            self.birth_date,
            self.phone_no,
            self.relationship,
            self.sex,
        ]
    }

    /// Count of questions answered correctly
    #[must_use]
    pub fn confirmed_count(&self) -> usize {
        self.answers().into_iter().filter(|a| *a).count()
    }
}

/// Mutable form state of one wizard session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketDraft {
    #[serde(deserialize_with = "code")]
    pub category: Option<String>,
    #[serde(deserialize_with = "code")]
    pub issue_type: Option<String>,
    pub sub_category: Option<String>,
    pub description: String,
    pub comments: String,
    pub admin: Option<AdminAreaRef>,
    pub area: String,
    pub language: String,
    pub consent: bool,
    pub priority: Option<i64>,
    pub urgency: Option<i64>,
    #[serde(deserialize_with = "code")]
    pub partner: Option<String>,
    pub assigned_to: Option<String>,

    pub selected_household: Option<EntityRef>,
    pub selected_individual: Option<EntityRef>,
    pub selected_payment_records: Vec<String>,
    pub selected_related_tickets: Vec<String>,

    pub individual_data: Option<Map<String, Value>>,
    pub individual_data_update_fields: Vec<UpdateFieldRecord>,
    pub household_data_update_fields: Vec<UpdateFieldRecord>,

    pub individual_data_update_fields_documents: Vec<Value>,
    pub individual_data_update_documents_to_edit: Vec<Value>,
    pub individual_data_update_documents_to_remove: Vec<Value>,
    pub individual_data_update_fields_identities: Vec<Value>,
    pub individual_data_update_identities_to_edit: Vec<Value>,
    pub individual_data_update_identities_to_remove: Vec<Value>,
    pub individual_data_update_fields_payment_channels: Vec<Value>,
    pub individual_data_update_payment_channels_to_edit: Vec<Value>,
    pub individual_data_update_payment_channels_to_remove: Vec<Value>,

    #[serde(flatten)]
    pub verification: VerificationAnswers,
    /// Individual-only lookups may skip the questionnaire
    pub verification_override: bool,
}

impl TicketDraft {
    /// Empty draft
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft pre-populated from a prior ticket or feedback record
    #[must_use]
    pub fn from_seed(seed: DraftSeed) -> Self {
        Self {
            category: seed.category,
            issue_type: seed.issue_type,
            description: seed.description.unwrap_or_default(),
            admin: seed.admin,
            area: seed.area.unwrap_or_default(),
            language: seed.language.unwrap_or_default(),
            selected_household: seed.household,
            selected_individual: seed.individual,
            selected_related_tickets: seed.linked_ticket.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Build a draft from the form store's JSON object
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        serde_json::from_value(value).map_err(CoreError::Draft)
    }

    /// JSON object with every field present, `null` for unset options
    pub fn to_value(&self) -> Result<Value, CoreError> {
        serde_json::to_value(self).map_err(CoreError::Draft)
    }

    /// Whether a household or individual is already attached
    #[inline]
    #[must_use]
    pub fn has_lookup_entity(&self) -> bool {
        self.selected_household.is_some() || self.selected_individual.is_some()
    }

    /// Document, identity and payment-channel change lists of an individual edit
    #[must_use]
    pub fn individual_change_lists(&self) -> [&[Value]; 9] {
        [
            &self.individual_data_update_fields_documents,
            &self.individual_data_update_documents_to_edit,
            &self.individual_data_update_documents_to_remove,
            &self.individual_data_update_fields_identities,
            &self.individual_data_update_identities_to_edit,
            &self.individual_data_update_identities_to_remove,
            &self.individual_data_update_fields_payment_channels,
            &self.individual_data_update_payment_channels_to_edit,
            &self.individual_data_update_payment_channels_to_remove,
        ]
    }
}

/// Values carried over from an earlier record when the wizard opens
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftSeed {
    pub category: Option<String>,
    pub issue_type: Option<String>,
    pub household: Option<EntityRef>,
    pub individual: Option<EntityRef>,
    pub description: Option<String>,
    pub admin: Option<AdminAreaRef>,
    pub area: Option<String>,
    pub language: Option<String>,
    pub linked_ticket: Option<String>,
}

/// Codes arrive as strings from selects and as numbers from stored records
fn code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected a code, got {other}"))),
    }
}
