//! Testing utilities for the grievance workspace
//!
//! Shared fixtures, scripted collaborators and tracing setup.

#![allow(missing_docs)]

use grievance_core::{
    Category, DataChangeKind, EntityRef, FieldAttribute, FieldGroup, IssueTypeChoice,
    MutationInput, ReferenceData, TicketDraft, VerificationAnswers,
};
use grievance_wizard::{
    CreatedTicket, ExecutorError, MutationExecutor, MutationResponse, ProviderError,
    ReferenceDataProvider, ResponseError,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test subscriber once; honours `RUST_LOG`
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Reference tables mirroring a typical business-area setup
pub fn reference_data() -> ReferenceData {
    ReferenceData::new()
        .with_field(FieldGroup::AddIndividual, "full_name", FieldAttribute::required())
        .with_field(FieldGroup::AddIndividual, "birth_date", FieldAttribute::required())
        .with_field(FieldGroup::AddIndividual, "sex", FieldAttribute::required())
        .with_field(FieldGroup::AddIndividual, "phone_no", FieldAttribute::optional())
        .with_field(FieldGroup::Individual, "full_name", FieldAttribute::required())
        .with_field(FieldGroup::Individual, "phone_no", FieldAttribute::optional())
        .with_field(FieldGroup::Household, "size", FieldAttribute::required())
        .with_field(FieldGroup::Household, "village", FieldAttribute::optional())
        .with_issue_types(
            Category::DataChange.code(),
            vec![
                choice("13", "Household Data Update"),
                choice("14", "Individual Data Update"),
                choice("15", "Withdraw Individual"),
                choice("16", "Add Individual"),
                choice("17", "Withdraw Household"),
            ],
        )
        .with_issue_types(
            Category::SensitiveGrievance.code(),
            vec![choice("1", "Data breach"), choice("2", "Bribery, corruption or kickback")],
        )
}

fn choice(value: &str, name: &str) -> IssueTypeChoice {
    IssueTypeChoice {
        value: value.to_string(),
        name: name.to_string(),
    }
}

/// Draft with a category and optional issue type
pub fn draft(category: Category, issue_type: Option<&str>) -> TicketDraft {
    TicketDraft {
        category: Some(category.code().to_string()),
        issue_type: issue_type.map(str::to_string),
        ..TicketDraft::default()
    }
}

/// Data-change draft for a known kind, with its lookup target attached
pub fn data_change_draft(kind: DataChangeKind) -> TicketDraft {
    let mut draft = draft(Category::DataChange, kind.issue_type_code());
    match kind {
        DataChangeKind::AddIndividual
        | DataChangeKind::EditHousehold
        | DataChangeKind::DeleteHousehold => {
            draft.selected_household = Some(EntityRef::new("HH-0001"));
        }
        DataChangeKind::EditIndividual | DataChangeKind::DeleteIndividual => {
            draft.selected_individual = Some(EntityRef::new("IND-0001"));
        }
        DataChangeKind::None => {}
    }
    draft
}

/// Questionnaire with the first `count` answers confirmed
pub fn answers(count: usize) -> VerificationAnswers {
    let mut a = VerificationAnswers::default();
    let slots: [&mut bool; VerificationAnswers::TRACKED] = [
        &mut a.size,
        &mut a.male_children_count,
        &mut a.female_children_count,
        &mut a.children_disabled_count,
        &mut a.head_of_household,
        &mut a.country_origin,
        &mut a.address,
        &mut a.village,
        &mut a.admin1,
        &mut a.admin2,
        &mut a.full_name,
        &mut a.birth_date,
        &mut a.phone_no,
        &mut a.relationship,
        &mut a.sex,
    ];
    for slot in slots.into_iter().take(count) {
        *slot = true;
    }
    a
}

/// Executor that replays scripted responses and records every payload
///
/// Once the script runs out every call creates `TICKET-<n>`.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    script: Mutex<VecDeque<Result<MutationResponse, ExecutorError>>>,
    calls: Mutex<Vec<MutationInput>>,
    yield_first: bool,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Yield to the runtime once before answering
    pub fn yielding(mut self) -> Self {
        self.yield_first = true;
        self
    }

    pub fn then(self, response: Result<MutationResponse, ExecutorError>) -> Self {
        self.script.lock().push_back(response);
        self
    }

    pub fn then_errors(self, messages: &[&str]) -> Self {
        let errors = messages.iter().map(|m| ResponseError::new(*m)).collect();
        self.then(Ok(MutationResponse::Errors(errors)))
    }

    pub fn calls(&self) -> Vec<MutationInput> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait::async_trait]
impl MutationExecutor for ScriptedExecutor {
    async fn execute(&self, payload: &MutationInput) -> Result<MutationResponse, ExecutorError> {
        let n = {
            let mut calls = self.calls.lock();
            calls.push(payload.clone());
            calls.len()
        };
        if self.yield_first {
            tokio::task::yield_now().await;
        }
        let scripted = self.script.lock().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(MutationResponse::Data(CreatedTicket {
                id: format!("TICKET-{n}"),
                unicef_id: None,
            }))
        })
    }
}

/// Provider returning fixed tables
#[derive(Debug, Clone, Default)]
pub struct StaticProvider(pub ReferenceData);

#[async_trait::async_trait]
impl ReferenceDataProvider for StaticProvider {
    async fn fetch(&self) -> Result<ReferenceData, ProviderError> {
        Ok(self.0.clone())
    }
}

/// Provider that always fails
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingProvider;

#[async_trait::async_trait]
impl ReferenceDataProvider for FailingProvider {
    async fn fetch(&self) -> Result<ReferenceData, ProviderError> {
        Err(ProviderError::Unavailable("choices query failed".into()))
    }
}
