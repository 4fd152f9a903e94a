//! In-memory back office
//!
//! Records every call in order and lets a test inject failures per
//! endpoint. Credentials issued by the fake are persisted on the job, as
//! the real issuer does.

use async_trait::async_trait;
use fieldops_install::backend::{BackendError, JobOrderBackend};
use fieldops_install::models::{
    ApplicationUpdate, CapturedImage, CredentialRequest, IssuedCredential, JobRecord, JobUpdate,
    LedgerItemPatch, MediaKind, NewLedgerItem, PersistedLedgerItem,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetJob(String),
    IssueCredentials(String),
    UploadMedia {
        job_id: String,
        folder: String,
        kinds: Vec<MediaKind>,
    },
    UpdateJob(String),
    UpdateApplication(String),
    ListLedger(String),
    CreateLedger(Vec<NewLedgerItem>),
    UpdateLedger(i64, u32),
    DeleteLedger(i64),
}

impl Call {
    pub fn is_write(&self) -> bool {
        !matches!(self, Call::GetJob(_) | Call::ListLedger(_))
    }
}

/// Endpoints a test wants to fail
#[derive(Debug, Clone, Default)]
pub struct Failures {
    pub get_job: bool,
    pub issue_credentials: bool,
    pub upload_media: bool,
    /// Kinds silently missing from a successful upload response
    pub upload_drops: HashSet<MediaKind>,
    pub update_job: bool,
    pub update_application: bool,
    pub list_ledger: bool,
    pub create_ledger: bool,
    pub update_rows: HashSet<i64>,
    pub delete_rows: HashSet<i64>,
}

#[derive(Default)]
struct State {
    jobs: HashMap<String, JobRecord>,
    ledger: Vec<PersistedLedgerItem>,
    next_row_id: i64,
    calls: Vec<Call>,
    job_updates: Vec<serde_json::Value>,
    application_updates: Vec<ApplicationUpdate>,
    failures: Failures,
    get_job_delay: Option<Duration>,
}

#[derive(Default)]
pub struct MockBackend {
    state: Mutex<State>,
}

fn fail(what: &str) -> BackendError {
    BackendError::Api(500, format!("{} unavailable", what))
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_job(self, job: JobRecord) -> Self {
        self.state.lock().unwrap().jobs.insert(job.id.clone(), job);
        self
    }

    pub fn with_ledger(self, rows: Vec<PersistedLedgerItem>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_row_id = rows.iter().map(|r| r.id).max().unwrap_or(0);
            state.ledger = rows;
        }
        self
    }

    pub fn with_failures(self, failures: Failures) -> Self {
        self.state.lock().unwrap().failures = failures;
        self
    }

    /// Slow down `get_job`, keeping a submit in flight
    pub fn with_get_job_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().get_job_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| matches(c)).count()
    }

    /// Job update bodies as sent, serialized to JSON
    pub fn job_updates(&self) -> Vec<serde_json::Value> {
        self.state.lock().unwrap().job_updates.clone()
    }

    pub fn application_updates(&self) -> Vec<ApplicationUpdate> {
        self.state.lock().unwrap().application_updates.clone()
    }

    pub fn job(&self, job_id: &str) -> Option<JobRecord> {
        self.state.lock().unwrap().jobs.get(job_id).cloned()
    }

    /// Persisted ledger rows, ordered by row id
    pub fn ledger(&self) -> Vec<PersistedLedgerItem> {
        let mut rows = self.state.lock().unwrap().ledger.clone();
        rows.sort_by_key(|r| r.id);
        rows
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl JobOrderBackend for MockBackend {
    async fn get_job(&self, job_id: &str) -> Result<JobRecord, BackendError> {
        self.record(Call::GetJob(job_id.to_string()));
        let delay = self.state.lock().unwrap().get_job_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock().unwrap();
        if state.failures.get_job {
            return Err(fail("job lookup"));
        }
        state
            .jobs
            .get(job_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("job {}", job_id)))
    }

    async fn issue_credentials(
        &self,
        job_id: &str,
        request: &CredentialRequest,
    ) -> Result<IssuedCredential, BackendError> {
        self.record(Call::IssueCredentials(job_id.to_string()));
        let mut state = self.state.lock().unwrap();
        if state.failures.issue_credentials {
            return Err(fail("credential issuer"));
        }

        let job = state
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| BackendError::NotFound(format!("job {}", job_id)))?;
        if let Some(existing) = job.credential() {
            return Ok(IssuedCredential {
                username: existing.username,
                password: existing.password,
                credentials_exist: true,
            });
        }

        let username = format!(
            "{}{}",
            request.first_name.to_lowercase(),
            job_id.to_lowercase().replace('-', "")
        );
        let password = format!("pw-{}", job_id);
        job.username = Some(username.clone());
        job.password = Some(password.clone());
        Ok(IssuedCredential {
            username,
            password,
            credentials_exist: false,
        })
    }

    async fn upload_media(
        &self,
        job_id: &str,
        folder_name: &str,
        uploads: &[(MediaKind, &CapturedImage)],
    ) -> Result<BTreeMap<MediaKind, String>, BackendError> {
        self.record(Call::UploadMedia {
            job_id: job_id.to_string(),
            folder: folder_name.to_string(),
            kinds: uploads.iter().map(|(kind, _)| *kind).collect(),
        });
        let state = self.state.lock().unwrap();
        if state.failures.upload_media {
            return Err(fail("media storage"));
        }

        Ok(uploads
            .iter()
            .filter(|(kind, _)| !state.failures.upload_drops.contains(kind))
            .map(|(kind, image)| {
                (
                    *kind,
                    format!("https://cdn.example/{}/{}", folder_name, image.file_name),
                )
            })
            .collect())
    }

    async fn update_job(&self, job_id: &str, update: &JobUpdate) -> Result<(), BackendError> {
        self.record(Call::UpdateJob(job_id.to_string()));
        let mut state = self.state.lock().unwrap();
        if state.failures.update_job {
            return Err(fail("job store"));
        }

        let body = serde_json::to_value(update).map_err(|e| BackendError::Parse(e.to_string()))?;
        state.job_updates.push(body);
        if let Some(job) = state.jobs.get_mut(job_id) {
            if update.username.is_some() {
                job.username = update.username.clone();
                job.password = update.password.clone();
            }
        }
        Ok(())
    }

    async fn update_application(
        &self,
        application_id: &str,
        update: &ApplicationUpdate,
    ) -> Result<(), BackendError> {
        self.record(Call::UpdateApplication(application_id.to_string()));
        let mut state = self.state.lock().unwrap();
        if state.failures.update_application {
            return Err(fail("application store"));
        }
        state.application_updates.push(update.clone());
        Ok(())
    }

    async fn list_ledger_items(
        &self,
        job_id: &str,
    ) -> Result<Vec<PersistedLedgerItem>, BackendError> {
        self.record(Call::ListLedger(job_id.to_string()));
        let state = self.state.lock().unwrap();
        if state.failures.list_ledger {
            return Err(BackendError::Network("connection reset".into()));
        }
        Ok(state
            .ledger
            .iter()
            .filter(|row| row.job_id == job_id)
            .cloned()
            .collect())
    }

    async fn create_ledger_items(&self, items: &[NewLedgerItem]) -> Result<(), BackendError> {
        self.record(Call::CreateLedger(items.to_vec()));
        let mut state = self.state.lock().unwrap();
        if state.failures.create_ledger {
            return Err(fail("item ledger"));
        }
        for item in items {
            state.next_row_id += 1;
            let id = state.next_row_id;
            state.ledger.push(PersistedLedgerItem {
                id,
                job_id: item.job_id.clone(),
                item_name: item.item_name.clone(),
                quantity: item.quantity,
            });
        }
        Ok(())
    }

    async fn update_ledger_item(
        &self,
        row_id: i64,
        patch: &LedgerItemPatch,
    ) -> Result<(), BackendError> {
        self.record(Call::UpdateLedger(row_id, patch.quantity));
        let mut state = self.state.lock().unwrap();
        if state.failures.update_rows.contains(&row_id) {
            return Err(fail("item ledger"));
        }
        match state.ledger.iter_mut().find(|row| row.id == row_id) {
            Some(row) => {
                row.quantity = patch.quantity;
                Ok(())
            }
            None => Err(BackendError::NotFound(format!("row {}", row_id))),
        }
    }

    async fn delete_ledger_item(&self, row_id: i64) -> Result<(), BackendError> {
        self.record(Call::DeleteLedger(row_id));
        let mut state = self.state.lock().unwrap();
        if state.failures.delete_rows.contains(&row_id) {
            return Err(fail("item ledger"));
        }
        let before = state.ledger.len();
        state.ledger.retain(|row| row.id != row_id);
        if state.ledger.len() == before {
            return Err(BackendError::NotFound(format!("row {}", row_id)));
        }
        Ok(())
    }
}
