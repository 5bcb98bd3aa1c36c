//! Shared enumerations for grievance tickets
//!
//! Category and issue-type codes are a versioned enumeration shared with the
//! backend. The string form lives in the draft, the integer form goes into
//! mutation payloads, so the exact values must never drift.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level ticket classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    DataChange,
    SensitiveGrievance,
    GrievanceComplaint,
    NegativeFeedback,
    Referral,
    PositiveFeedback,
}

impl Category {
    /// Every category the wizard can create
    pub const ALL: [Category; 6] = [
        Category::DataChange,
        Category::SensitiveGrievance,
        Category::GrievanceComplaint,
        Category::NegativeFeedback,
        Category::Referral,
        Category::PositiveFeedback,
    ];

    /// Backend code
    #[inline]
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Category::DataChange => "2",
            Category::SensitiveGrievance => "3",
            Category::GrievanceComplaint => "4",
            Category::NegativeFeedback => "5",
            Category::Referral => "6",
            Category::PositiveFeedback => "7",
        }
    }

    /// Resolve a backend code; unknown codes yield `None`
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code.trim())
    }

    /// Whether tickets of this category must carry an issue type
    #[inline]
    #[must_use]
    pub const fn requires_issue_type(self) -> bool {
        matches!(self, Category::SensitiveGrievance | Category::DataChange)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::DataChange => "DATA_CHANGE",
            Category::SensitiveGrievance => "SENSITIVE_GRIEVANCE",
            Category::GrievanceComplaint => "GRIEVANCE_COMPLAINT",
            Category::NegativeFeedback => "NEGATIVE_FEEDBACK",
            Category::Referral => "REFERRAL",
            Category::PositiveFeedback => "POSITIVE_FEEDBACK",
        };
        f.write_str(name)
    }
}

/// Data-change sub-form selected by the issue type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataChangeKind {
    AddIndividual,
    EditIndividual,
    EditHousehold,
    DeleteIndividual,
    DeleteHousehold,
    #[default]
    None,
}

impl DataChangeKind {
    /// Known data-change kinds, excluding `None`
    pub const KNOWN: [DataChangeKind; 5] = [
        DataChangeKind::AddIndividual,
        DataChangeKind::EditIndividual,
        DataChangeKind::EditHousehold,
        DataChangeKind::DeleteIndividual,
        DataChangeKind::DeleteHousehold,
    ];

    /// Backend issue-type code, `None` for the empty kind
    #[inline]
    #[must_use]
    pub const fn issue_type_code(self) -> Option<&'static str> {
        match self {
            DataChangeKind::EditHousehold => Some("13"),
            DataChangeKind::EditIndividual => Some("14"),
            DataChangeKind::DeleteIndividual => Some("15"),
            DataChangeKind::AddIndividual => Some("16"),
            DataChangeKind::DeleteHousehold => Some("17"),
            DataChangeKind::None => None,
        }
    }

    /// Resolve a data-change issue-type code
    #[must_use]
    pub fn from_issue_type(code: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|k| k.issue_type_code() == Some(code.trim()))
            .unwrap_or(DataChangeKind::None)
    }

    /// Which entity the lookup step must select
    #[inline]
    #[must_use]
    pub const fn lookup_target(self) -> LookupTarget {
        match self {
            DataChangeKind::AddIndividual
            | DataChangeKind::EditHousehold
            | DataChangeKind::DeleteHousehold => LookupTarget::Household,
            DataChangeKind::EditIndividual | DataChangeKind::DeleteIndividual => {
                LookupTarget::Individual
            }
            DataChangeKind::None => LookupTarget::Any,
        }
    }
}

/// Entity a ticket must be attached to during lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LookupTarget {
    Household,
    Individual,
    /// Optional lookup; either or neither may be selected
    Any,
}

/// Wizard step identifiers, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepId {
    Selection,
    Lookup,
    Verification,
    Description,
}

impl StepId {
    /// Canonical four-step sequence
    pub const SEQUENCE: [StepId; 4] = [
        StepId::Selection,
        StepId::Lookup,
        StepId::Verification,
        StepId::Description,
    ];

    /// Zero-based position in the canonical sequence
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Terminal step triggers submission
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, StepId::Description)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Parse the leading decimal integer of a code
///
/// Skips leading whitespace, accepts an optional sign and reads the longest
/// digit prefix. Returns `None` when no digit is found.
#[must_use]
pub fn parse_code(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let value: i64 = rest[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}
