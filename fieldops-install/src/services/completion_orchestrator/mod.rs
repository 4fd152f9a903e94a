//! Completion save orchestrator
//!
//! Sequences one completion submit across the job, application and item
//! ledger resources and reports partial failure.
//!
//! # Step order
//! VALIDATE → CREDENTIALS → MEDIA → JOB_RECORD → APPLICATION → LEDGER
//!
//! Each step lives in its own `step_*` module. Credentials, media and the
//! ledger only run for a Confirmed + Done submit. The application step runs
//! whenever the form or the job names a linked application; the job is
//! fetched for it when no earlier step did. A step that returns
//! [`StepStatus::Failed`] halts the pipeline; every later step is recorded
//! as skipped. Only a credential failure or a job record failure can halt.
//!
//! There is no rollback: a job record saved before a later warning stays
//! saved, and re-submitting is safe (credentials are checked before
//! issuing, the ledger is recomputed from what is persisted).

use crate::backend::JobOrderBackend;
use crate::models::{
    CompletionForm, Credential, JobRecord, MediaKind, SaveReport, SaveSession, Severity,
};
use crate::resolver;
use crate::services::form_validator::{self, ValidationError};
use chrono::Utc;
use fieldops_common::config::DEFAULT_WRITE_CONCURRENCY;
use fieldops_common::events::{EventBus, FieldOpsEvent, SaveState, SaveStep, StepStatus};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;

mod step_application;
mod step_credentials;
mod step_job_record;
mod step_ledger;
mod step_media;

/// Why a submit was refused before any side effect
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Job id is required")]
    MissingJobId,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("A save for job {0} is already in progress")]
    AlreadyInFlight(String),
}

/// Mutable state of one submit, threaded through the steps
struct SaveRun {
    session: SaveSession,
    report: SaveReport,
    /// Form with orphaned selections stripped
    form: CompletionForm,
    /// Set by the credential step
    credential: Option<Credential>,
    /// Job as fetched by the credential step, or by the application lookup
    job_record: Option<JobRecord>,
    /// Persisted URL per media kind, passed through or freshly uploaded
    media_urls: BTreeMap<MediaKind, String>,
}

impl SaveRun {
    fn job_id(&self) -> &str {
        &self.form.job_id
    }

    /// Application to update: the form's, else the one on the fetched job
    fn application_id(&self) -> Option<String> {
        let from_form = self.form.application_id.as_deref();
        let from_job = self
            .job_record
            .as_ref()
            .and_then(|job| job.application_id.as_deref());
        from_form
            .filter(|id| !id.trim().is_empty())
            .or_else(|| from_job.filter(|id| !id.trim().is_empty()))
            .map(str::to_string)
    }
}

/// Removes the job id from the in-flight set on every exit path
struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
    job_id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        in_flight.remove(&self.job_id);
    }
}

/// Completion save orchestrator service
pub struct CompletionOrchestrator {
    backend: Arc<dyn JobOrderBackend>,
    event_bus: EventBus,
    ledger_concurrency: usize,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl CompletionOrchestrator {
    pub fn new(backend: Arc<dyn JobOrderBackend>, event_bus: EventBus) -> Self {
        Self {
            backend,
            event_bus,
            ledger_concurrency: DEFAULT_WRITE_CONCURRENCY,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Maximum concurrent item ledger update/delete calls (at least 1)
    pub fn with_ledger_concurrency(mut self, concurrency: usize) -> Self {
        self.ledger_concurrency = concurrency.max(1);
        self
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// A submit for `job_id` is currently running
    pub fn is_in_flight(&self, job_id: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(job_id)
    }

    /// Run the completion pipeline for `form`
    ///
    /// Only a missing job id, a validation failure, or a submit already
    /// running for the same job return `Err`, and all three happen before
    /// any backend call. Everything else, including a fatal credential
    /// failure, is reported in the returned [`SaveReport`].
    pub async fn submit(&self, form: &CompletionForm) -> Result<SaveReport, SubmitError> {
        let job_id = form.job_id.trim().to_string();
        if job_id.is_empty() {
            self.reject(&job_id, "missing job id");
            return Err(SubmitError::MissingJobId);
        }

        let _guard = self.acquire(&job_id)?;

        let mut session = SaveSession::new(job_id.clone());
        let report = SaveReport::new(session.session_id, job_id.clone());

        tracing::info!(
            session_id = %session.session_id,
            job_id = %job_id,
            status = ?form.status,
            onsite_status = ?form.onsite_status,
            "Completion save started"
        );
        self.event_bus.emit_lossy(FieldOpsEvent::SaveStarted {
            session_id: session.session_id,
            job_id: job_id.clone(),
            timestamp: Utc::now(),
        });

        self.transition(&mut session, SaveState::Validating);
        if let Err(e) = form_validator::validate(form) {
            tracing::info!(
                session_id = %session.session_id,
                job_id = %job_id,
                errors = e.errors.len(),
                "Completion save rejected by validation"
            );
            self.transition(&mut session, SaveState::InvalidStop);
            self.transition(&mut session, SaveState::Idle);
            self.reject(&job_id, &e.to_string());
            return Err(SubmitError::Validation(e));
        }

        let mut stripped = form.clone();
        stripped.job_id = job_id;
        let cleared = resolver::strip_orphans(&mut stripped);
        if !cleared.is_empty() {
            tracing::debug!(job_id = %stripped.job_id, cleared = ?cleared, "Cleared orphaned selections");
        }

        let mut run = SaveRun {
            session,
            report,
            form: stripped,
            credential: None,
            job_record: None,
            media_urls: BTreeMap::new(),
        };
        self.finish_step(&mut run, SaveStep::Validate, StepStatus::Completed);

        let mut halted = false;
        for step in &SaveStep::ALL[1..] {
            let step = *step;
            let lookup = match step {
                SaveStep::Application if !halted => self.link_application(&mut run).await,
                _ => None,
            };
            let status = if let Some(status) = lookup {
                status
            } else if halted || !self.applies(step, &run) {
                StepStatus::Skipped
            } else {
                self.transition(&mut run.session, SaveState::Running(step));
                self.run_step(step, &mut run).await
            };
            self.finish_step(&mut run, step, status);
            if status == StepStatus::Failed {
                halted = true;
            }
        }

        Ok(self.complete(run))
    }

    fn applies(&self, step: SaveStep, run: &SaveRun) -> bool {
        match step {
            SaveStep::Validate | SaveStep::JobRecord => true,
            SaveStep::Credentials | SaveStep::Media | SaveStep::Ledger => run.form.is_completing(),
            SaveStep::Application => run.application_id().is_some(),
        }
    }

    async fn run_step(&self, step: SaveStep, run: &mut SaveRun) -> StepStatus {
        match step {
            SaveStep::Validate => StepStatus::Completed,
            SaveStep::Credentials => self.step_credentials(run).await,
            SaveStep::Media => self.step_media(run).await,
            SaveStep::JobRecord => self.step_job_record(run).await,
            SaveStep::Application => self.step_application(run).await,
            SaveStep::Ledger => self.step_ledger(run).await,
        }
    }

    fn acquire(&self, job_id: &str) -> Result<InFlightGuard, SubmitError> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !in_flight.insert(job_id.to_string()) {
            drop(in_flight);
            tracing::warn!(job_id = %job_id, "Save already in progress, rejecting duplicate submit");
            self.reject(job_id, "already in flight");
            return Err(SubmitError::AlreadyInFlight(job_id.to_string()));
        }
        Ok(InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
            job_id: job_id.to_string(),
        })
    }

    fn reject(&self, job_id: &str, reason: &str) {
        self.event_bus.emit_lossy(FieldOpsEvent::SaveRejected {
            job_id: job_id.to_string(),
            reason: reason.to_string(),
            timestamp: Utc::now(),
        });
    }

    fn transition(&self, session: &mut SaveSession, new_state: SaveState) {
        let transition = session.transition_to(new_state);
        self.event_bus.emit_lossy(FieldOpsEvent::SaveStateChanged {
            session_id: transition.session_id,
            old_state: transition.old_state,
            new_state: transition.new_state,
            timestamp: transition.transitioned_at,
        });
    }

    fn finish_step(&self, run: &mut SaveRun, step: SaveStep, status: StepStatus) {
        run.session.progress.finish(step);
        run.report.record_step(step, status);
        let percentage = run.session.progress.percentage();
        run.report.percentage = percentage;

        tracing::debug!(
            session_id = %run.session.session_id,
            job_id = %run.job_id(),
            step = %step,
            status = ?status,
            percentage,
            "Save step finished"
        );

        self.event_bus.emit_lossy(FieldOpsEvent::SaveStepFinished {
            session_id: run.session.session_id,
            job_id: run.job_id().to_string(),
            step,
            status,
            timestamp: Utc::now(),
        });
        self.event_bus.emit_lossy(FieldOpsEvent::SaveProgress {
            session_id: run.session.session_id,
            job_id: run.job_id().to_string(),
            step,
            percentage,
            timestamp: Utc::now(),
        });
    }

    fn complete(&self, mut run: SaveRun) -> SaveReport {
        self.transition(&mut run.session, SaveState::Reporting);
        run.report.duration_ms = run.session.elapsed_ms();

        let successes = run.report.count(Severity::Success);
        let warnings = run.report.count(Severity::Warning);
        let errors = run.report.count(Severity::Error);

        tracing::info!(
            session_id = %run.session.session_id,
            job_id = %run.job_id(),
            successes,
            warnings,
            errors,
            duration_ms = run.report.duration_ms,
            "Completion save finished"
        );

        self.event_bus.emit_lossy(FieldOpsEvent::SaveCompleted {
            session_id: run.session.session_id,
            job_id: run.job_id().to_string(),
            successes,
            warnings,
            errors,
            duration_ms: run.report.duration_ms,
            timestamp: Utc::now(),
        });

        self.transition(&mut run.session, SaveState::Idle);
        run.report
    }
}

/// Upload folder for a job's media: `Last_First_Middle_<jobid>`
///
/// Runs of characters other than letters and digits (any script) collapse
/// to one `_`; leading and trailing separators are dropped.
pub fn folder_name(form: &CompletionForm) -> String {
    let raw = [
        form.last_name.as_str(),
        form.first_name.as_str(),
        form.middle_name.as_str(),
        form.job_id.as_str(),
    ]
    .join("_");

    let mut name = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_alphanumeric() {
            name.push(c);
        } else if !name.is_empty() && !name.ends_with('_') {
            name.push('_');
        }
    }
    while name.ends_with('_') {
        name.pop();
    }
    name
}
