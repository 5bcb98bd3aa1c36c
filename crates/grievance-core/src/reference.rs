//! Reference data injected into validation
//!
//! Field-attribute dictionaries and the issue-type catalog are fetched once
//! per wizard session. Every lookup fails open: a field missing from the
//! dictionary, or an entry that cannot be read, is "not required".

use crate::error::CoreError;
use crate::util::camel_case;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Attributes of one configurable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldAttribute {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub required: bool,
}

impl FieldAttribute {
    #[inline]
    #[must_use]
    pub const fn required() -> Self {
        Self { required: true }
    }

    #[inline]
    #[must_use]
    pub const fn optional() -> Self {
        Self { required: false }
    }
}

/// One entry of the issue-type catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueTypeChoice {
    #[serde(deserialize_with = "code_string")]
    pub value: String,
    pub name: String,
}

/// Which field dictionary a lookup targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    AddIndividual,
    Individual,
    Household,
}

/// Read-only lookup tables for one wizard session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReferenceData {
    #[serde(deserialize_with = "lenient_fields")]
    pub add_individual_fields: BTreeMap<String, FieldAttribute>,
    #[serde(deserialize_with = "lenient_fields")]
    pub individual_fields: BTreeMap<String, FieldAttribute>,
    #[serde(deserialize_with = "lenient_fields")]
    pub household_fields: BTreeMap<String, FieldAttribute>,
    /// Category code -> selectable issue types
    pub issue_type_choices: BTreeMap<String, Vec<IssueTypeChoice>>,
}

impl ReferenceData {
    /// Empty tables: nothing is required, no labels resolve
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the backend's JSON representation
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        serde_json::from_str(raw).map_err(CoreError::ReferenceData)
    }

    #[must_use]
    pub fn with_field(mut self, group: FieldGroup, name: &str, attribute: FieldAttribute) -> Self {
        self.fields_mut(group).insert(name.to_string(), attribute);
        self
    }

    #[must_use]
    pub fn with_issue_types(mut self, category: &str, choices: Vec<IssueTypeChoice>) -> Self {
        self.issue_type_choices.insert(category.to_string(), choices);
        self
    }

    #[inline]
    #[must_use]
    pub fn fields(&self, group: FieldGroup) -> &BTreeMap<String, FieldAttribute> {
        match group {
            FieldGroup::AddIndividual => &self.add_individual_fields,
            FieldGroup::Individual => &self.individual_fields,
            FieldGroup::Household => &self.household_fields,
        }
    }

    fn fields_mut(&mut self, group: FieldGroup) -> &mut BTreeMap<String, FieldAttribute> {
        match group {
            FieldGroup::AddIndividual => &mut self.add_individual_fields,
            FieldGroup::Individual => &mut self.individual_fields,
            FieldGroup::Household => &mut self.household_fields,
        }
    }

    /// Whether a field is flagged required; looks up the raw name, then its camelCase form
    #[must_use]
    pub fn is_required(&self, group: FieldGroup, name: &str) -> bool {
        let fields = self.fields(group);
        fields
            .get(name)
            .or_else(|| fields.get(&camel_case(name)))
            .is_some_and(|attr| attr.required)
    }

    /// Names of all required fields in a group, in stable order
    pub fn required_fields(&self, group: FieldGroup) -> impl Iterator<Item = &str> + '_ {
        self.fields(group)
            .iter()
            .filter(|(_, attr)| attr.required)
            .map(|(name, _)| name.as_str())
    }

    /// Issue types selectable for a category
    #[must_use]
    pub fn issue_types(&self, category: &str) -> &[IssueTypeChoice] {
        self.issue_type_choices
            .get(category.trim())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Display label of an issue type within its category
    #[must_use]
    pub fn issue_type_label(&self, category: &str, issue_type: &str) -> Option<&str> {
        self.issue_types(category)
            .iter()
            .find(|choice| choice.value == issue_type.trim())
            .map(|choice| choice.name.as_str())
    }
}

/// Anything other than `true` reads as not required
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(matches!(value, Value::Bool(true)))
}

/// Unreadable entries become optional fields; the rest of the table survives
fn lenient_fields<'de, D>(deserializer: D) -> Result<BTreeMap<String, FieldAttribute>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .map(|(name, entry)| {
            let attribute: FieldAttribute = serde_json::from_value(entry).unwrap_or_default();
            (name, attribute)
        })
        .collect())
}

fn code_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected an issue type code, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_required_flag_fails_open() {
        let data = ReferenceData::from_json(
            r#"{
                "householdFields": {
                    "size": { "required": true },
                    "village": { "required": "yes" },
                    "address": {}
                }
            }"#,
        )
        .unwrap();

        assert!(data.is_required(FieldGroup::Household, "size"));
        assert!(!data.is_required(FieldGroup::Household, "village"));
        assert!(!data.is_required(FieldGroup::Household, "address"));
        assert!(!data.is_required(FieldGroup::Household, "unknown"));
    }

    #[test]
    fn malformed_entry_keeps_rest_of_table() {
        let data = ReferenceData::from_json(
            r#"{
                "householdFields": { "size": { "required": true }, "village": true },
                "individualFields": { "full_name": { "required": true }, "sex": [1, 2] },
                "addIndividualFields": "unavailable"
            }"#,
        )
        .unwrap();

        assert!(data.is_required(FieldGroup::Household, "size"));
        assert!(!data.is_required(FieldGroup::Household, "village"));
        assert!(data.is_required(FieldGroup::Individual, "full_name"));
        assert!(!data.is_required(FieldGroup::Individual, "sex"));
        assert_eq!(data.required_fields(FieldGroup::AddIndividual).count(), 0);
    }

    #[test]
    fn camel_case_fallback() {
        let data = ReferenceData::new().with_field(
            FieldGroup::AddIndividual,
            "fullName",
            FieldAttribute::required(),
        );
        assert!(data.is_required(FieldGroup::AddIndividual, "full_name"));
    }

    #[test]
    fn issue_type_labels() {
        let data = ReferenceData::from_json(
            r#"{ "issueTypeChoices": { "2": [ { "value": 16, "name": "Add Individual" } ] } }"#,
        )
        .unwrap();
        assert_eq!(data.issue_type_label("2", "16"), Some("Add Individual"));
        assert_eq!(data.issue_type_label("3", "16"), None);
    }
}
