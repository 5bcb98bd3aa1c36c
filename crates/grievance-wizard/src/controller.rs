//! Wizard Controller
//!
//! Drives a ticket draft through `Selection -> Lookup -> Verification ->
//! Description`. Every forward move is gated by the step validator; the
//! terminal step submits through the injected [`MutationExecutor`].
//!
//! # Validation timing
//!
//! Before the verification step, field changes revalidate the current step
//! immediately. From verification onward only explicit `next`/`submit`
//! attempts validate, unless an earlier attempt at or past verification
//! failed: that latches eager validation for the rest of the session.
//!
//! # Submission
//!
//! At most one submission is in flight. Repeated `submit` calls return
//! [`SubmitOutcome::Suppressed`] until the outstanding one settles. A
//! submission is never cancelled once issued.

use crate::config::WizardConfig;
use crate::error::WizardError;
use crate::executor::{CreatedTicket, MutationExecutor, MutationResponse, ReferenceDataProvider};
use crate::store::{FormStore, InMemoryFormStore};
use grievance_core::{
    classify, ErrorMap, PayloadBuilder, ReferenceData, StepId, StepShape, StepValidator,
    TicketDraft,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Result of a navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Step changed
    Moved { from: StepId, to: StepId },
    /// Validation failed; the step did not change
    Blocked(ErrorMap),
    /// Nothing to do (first/last step, or a submission is in flight)
    Stayed,
}

/// Result of a submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Ticket persisted; the draft has been cleared
    Created(CreatedTicket),
    /// Terminal-step validation failed; nothing was sent
    Rejected(ErrorMap),
    /// Backend or transport reported errors; the draft is kept for a retry
    Failed(Vec<String>),
    /// Another submission is still in flight
    Suppressed,
    /// Not on the terminal step, or the ticket was already created
    NotReady,
}

#[derive(Debug, Clone)]
struct WizardState {
    step: StepId,
    errors: ErrorMap,
    submission_errors: Vec<String>,
    eager: bool,
    created: Option<CreatedTicket>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            step: StepId::Selection,
            errors: ErrorMap::new(),
            submission_errors: Vec::new(),
            eager: false,
            created: None,
        }
    }
}

/// Releases the in-flight flag when the submission settles
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One wizard session
///
/// Owns the session's form store exclusively. All methods take `&self` so a
/// rendering layer can hold the controller behind an `Arc`.
pub struct WizardController<S: FormStore = InMemoryFormStore> {
    config: WizardConfig,
    store: Mutex<S>,
    executor: Arc<dyn MutationExecutor>,
    validator: StepValidator,
    builder: PayloadBuilder,
    preset_entity: bool,
    reference_degraded: bool,
    state: Mutex<WizardState>,
    in_flight: AtomicBool,
}

impl<S: FormStore> std::fmt::Debug for WizardController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardController")
            .field("config", &self.config)
            .field("preset_entity", &self.preset_entity)
            .field("reference_degraded", &self.reference_degraded)
            .field("state", &*self.state.lock())
            .field("in_flight", &self.in_flight.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl<S: FormStore> WizardController<S> {
    /// Create a session over an already loaded reference data set
    ///
    /// A draft that arrives with a household or individual attached skips
    /// the lookup step.
    pub fn new(
        config: WizardConfig,
        store: S,
        executor: Arc<dyn MutationExecutor>,
        reference: ReferenceData,
    ) -> Self {
        let preset_entity = store.get_all().has_lookup_entity();
        let validator =
            StepValidator::with_context(Arc::new(reference), config.validation_context());
        let builder = PayloadBuilder::new(config.business_area.clone());
        Self {
            config,
            store: Mutex::new(store),
            executor,
            validator,
            builder,
            preset_entity,
            reference_degraded: false,
            state: Mutex::new(WizardState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Create a session, fetching reference data once
    ///
    /// A failed fetch does not block the wizard: it runs with empty
    /// reference tables (nothing extra is required) and reports
    /// [`Self::reference_degraded`].
    pub async fn start(
        config: WizardConfig,
        store: S,
        executor: Arc<dyn MutationExecutor>,
        provider: &dyn ReferenceDataProvider,
    ) -> Self {
        match provider.fetch().await {
            Ok(reference) => Self::new(config, store, executor, reference),
            Err(e) => {
                tracing::warn!(error = %e, "reference data unavailable, continuing without it");
                let mut controller = Self::new(config, store, executor, ReferenceData::new());
                controller.reference_degraded = true;
                controller
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    #[must_use]
    pub fn current_step(&self) -> StepId {
        self.state.lock().step
    }

    /// Errors of the last validation of the current step
    #[must_use]
    pub fn errors(&self) -> ErrorMap {
        self.state.lock().errors.clone()
    }

    /// Messages of the last failed submission
    #[must_use]
    pub fn submission_errors(&self) -> Vec<String> {
        self.state.lock().submission_errors.clone()
    }

    /// Whether the one-way eager-validation latch is set
    #[must_use]
    pub fn eager_validation(&self) -> bool {
        self.state.lock().eager
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn can_advance(&self) -> bool {
        !self.is_submitting() && !self.current_step().is_terminal()
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        !self.is_submitting() && self.previous_step(self.current_step()).is_some()
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        let state = self.state.lock();
        state.step.is_terminal() && state.created.is_none() && !self.is_submitting()
    }

    /// Ticket created by a successful submission; the renderer navigates to it
    #[must_use]
    pub fn created_ticket(&self) -> Option<CreatedTicket> {
        self.state.lock().created.clone()
    }

    /// Reference data could not be loaded at session start
    #[inline]
    #[must_use]
    pub fn reference_degraded(&self) -> bool {
        self.reference_degraded
    }

    /// Session arrived with a household or individual attached
    #[inline]
    #[must_use]
    pub fn preset_entity(&self) -> bool {
        self.preset_entity
    }

    #[must_use]
    pub fn draft(&self) -> TicketDraft {
        self.store.lock().get_all()
    }

    #[must_use]
    pub fn shape(&self) -> StepShape {
        shape_of(&self.draft())
    }

    /// Steps this session visits
    ///
    /// Lookup is skipped only while the preset entity is the one the current
    /// selection targets.
    #[must_use]
    pub fn sequence(&self) -> Vec<StepId> {
        let draft = self.draft();
        let shape = shape_of(&draft);
        shape.effective_sequence(self.skips_lookup(&draft, &shape))
    }

    /// Display label of the selected issue type
    #[must_use]
    pub fn issue_type_label(&self) -> Option<String> {
        let draft = self.draft();
        let category = draft.category.as_deref()?;
        let issue_type = draft.issue_type.as_deref()?;
        self.validator
            .reference()
            .issue_type_label(category, issue_type)
            .map(str::to_string)
    }

    /// Write a field through the form store
    ///
    /// A new category clears the issue type. The current step is revalidated
    /// when the timing policy asks for it.
    pub fn set_field(&self, name: &str, value: Value) -> Result<(), WizardError> {
        {
            let mut store = self.store.lock();
            let previous_category = (name == "category").then(|| store.get_field("category"));
            store.set_field(name, value)?;
            if let Some(previous) = previous_category {
                if store.get_field("category") != previous {
                    store.set_field("issueType", Value::Null)?;
                }
            }
        }

        let (step, eager) = {
            let state = self.state.lock();
            (state.step, state.eager)
        };
        if eager || (self.config.validate_on_change && step < StepId::Verification) {
            let errors = self.validate_current(step);
            self.state.lock().errors = errors;
        }
        Ok(())
    }

    /// Validate the current step and advance when it passes
    pub fn next(&self) -> Transition {
        if self.is_submitting() {
            return Transition::Stayed;
        }
        let draft = self.draft();
        let shape = shape_of(&draft);
        let sequence = shape.effective_sequence(self.skips_lookup(&draft, &shape));

        let mut state = self.state.lock();
        let from = state.step;
        let Some(to) = sequence.iter().copied().find(|s| *s > from) else {
            return Transition::Stayed;
        };

        let errors = self.validator.validate_step(from, &draft, &shape);
        if !errors.is_empty() {
            if from >= StepId::Verification && !state.eager {
                tracing::debug!(step = %from, "eager validation latched");
                state.eager = true;
            }
            tracing::debug!(step = %from, errors = errors.len(), "step blocked");
            state.errors = errors.clone();
            return Transition::Blocked(errors);
        }

        state.errors = ErrorMap::new();
        state.step = to;
        tracing::info!(%from, %to, "wizard advanced");
        Transition::Moved { from, to }
    }

    /// Go to the previous step without validating
    pub fn back(&self) -> Transition {
        if self.is_submitting() {
            return Transition::Stayed;
        }
        let mut state = self.state.lock();
        let from = state.step;
        let Some(to) = self.previous_step(from) else {
            return Transition::Stayed;
        };
        state.step = to;
        state.errors = ErrorMap::new();
        tracing::info!(%from, %to, "wizard went back");
        Transition::Moved { from, to }
    }

    /// Jump to a step
    ///
    /// Backward jumps never validate. Forward jumps validate each step on the
    /// way and stop at the first one that fails.
    pub fn jump_to(&self, target: StepId) -> Result<Transition, WizardError> {
        if !self.sequence().contains(&target) {
            return Err(WizardError::StepUnavailable(target));
        }
        if self.is_submitting() {
            return Ok(Transition::Stayed);
        }

        let origin = self.current_step();
        if target < origin {
            let mut state = self.state.lock();
            state.step = target;
            state.errors = ErrorMap::new();
            tracing::info!(from = %origin, to = %target, "wizard jumped back");
            return Ok(Transition::Moved {
                from: origin,
                to: target,
            });
        }

        while self.current_step() < target {
            match self.next() {
                Transition::Moved { .. } => {}
                other => return Ok(other),
            }
        }
        if origin == target {
            return Ok(Transition::Stayed);
        }
        Ok(Transition::Moved {
            from: origin,
            to: target,
        })
    }

    /// Validate the terminal step, build the payload and execute it
    pub async fn submit(&self) -> Result<SubmitOutcome, WizardError> {
        if !self.can_submit_now() {
            return Ok(SubmitOutcome::NotReady);
        }
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("submission already in flight");
            return Ok(SubmitOutcome::Suppressed);
        };

        let draft = self.draft();
        let shape = shape_of(&draft);
        // the selection may have changed after Lookup was passed or skipped
        let mut errors = self.validator.validate_step(StepId::Description, &draft, &shape);
        errors.merge(self.validator.validate_step(StepId::Lookup, &draft, &shape));
        if !errors.is_empty() {
            let mut state = self.state.lock();
            state.eager = true;
            state.errors = errors.clone();
            state.submission_errors.clear();
            tracing::debug!(errors = errors.len(), "submission blocked by validation");
            return Ok(SubmitOutcome::Rejected(errors));
        }

        let payload = self.builder.build_for(&shape, &draft);
        tracing::info!(business_area = %self.config.business_area, "submitting ticket");

        match self.executor.execute(&payload).await {
            Ok(MutationResponse::Data(ticket)) => {
                self.store.lock().reset();
                let mut state = self.state.lock();
                state.errors = ErrorMap::new();
                state.submission_errors.clear();
                state.created = Some(ticket.clone());
                tracing::info!(ticket_id = %ticket.id, "ticket created");
                Ok(SubmitOutcome::Created(ticket))
            }
            Ok(MutationResponse::Errors(errors)) => {
                let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
                tracing::warn!(count = messages.len(), "ticket mutation rejected");
                self.state.lock().submission_errors = messages.clone();
                Ok(SubmitOutcome::Failed(messages))
            }
            Err(e) => {
                tracing::warn!(error = %e, retryable = e.is_retryable(), "ticket mutation failed");
                let messages = vec![e.to_string()];
                self.state.lock().submission_errors = messages.clone();
                Ok(SubmitOutcome::Failed(messages))
            }
        }
    }

    fn can_submit_now(&self) -> bool {
        let state = self.state.lock();
        state.step.is_terminal() && state.created.is_none()
    }

    fn skips_lookup(&self, draft: &TicketDraft, shape: &StepShape) -> bool {
        self.preset_entity && shape.lookup_satisfied_by(draft)
    }

    fn previous_step(&self, from: StepId) -> Option<StepId> {
        self.sequence().into_iter().rev().find(|s| *s < from)
    }

    fn validate_current(&self, step: StepId) -> ErrorMap {
        let draft = self.draft();
        self.validator.validate_step(step, &draft, &shape_of(&draft))
    }
}

fn shape_of(draft: &TicketDraft) -> StepShape {
    classify(draft.category.as_deref(), draft.issue_type.as_deref())
}
