// Application state container
//
// Single writer for the applications list, the session change log, the
// selection and the current error message. Every mutation goes through one of
// the methods below; API failures become a displayable message instead of
// propagating.

use crate::change_log::record_change;
use crate::db::{ApiError, ApplicationsApi};
use crate::form::EditForm;
use crate::types::{
    Application, ApplicationPatch, ApplicationStatus, ApplicationUpdate, ChangeLogEntry,
    NewLogEntry,
};
use crate::validation::ValidationResult;
use chrono::Utc;

/// Result of committing an edit form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent
    Invalid(ValidationResult),
    /// Patch applied. `entry` is `None` when nothing actually changed.
    Saved {
        application: Application,
        entry: Option<ChangeLogEntry>,
    },
    /// The API rejected the patch; the message is also in `AppState::error`
    Failed(ApiError),
}

pub struct AppState<A: ApplicationsApi> {
    api: A,
    applications: Vec<Application>,
    change_log: Vec<ChangeLogEntry>,
    is_loading: bool,
    error: Option<String>,
    selected_id: Option<String>,
    log_seq: u64,
}

impl<A: ApplicationsApi> AppState<A> {
    pub fn new(api: A) -> Self {
        AppState {
            api,
            applications: Vec::new(),
            change_log: Vec::new(),
            is_loading: false,
            error: None,
            selected_id: None,
            log_seq: 0,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    // ========================================================================
    // READ ACCESS
    // ========================================================================

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    /// Session log, newest first
    pub fn change_log(&self) -> &[ChangeLogEntry] {
        &self.change_log
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn selected_application(&self) -> Option<&Application> {
        let id = self.selected_id.as_deref()?;
        self.find(id)
    }

    pub fn find(&self, id: &str) -> Option<&Application> {
        self.applications.iter().find(|app| app.id == id)
    }

    pub fn total_count(&self) -> usize {
        self.applications.len()
    }

    pub fn new_count(&self) -> usize {
        self.applications
            .iter()
            .filter(|app| app.status == ApplicationStatus::New)
            .count()
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Reload the list. On failure the previous list is kept and the error stored.
    pub fn load_applications(&mut self) {
        self.is_loading = true;
        self.error = None;

        match self.api.fetch_applications() {
            Ok(applications) => {
                tracing::info!(count = applications.len(), "applications loaded");
                self.applications = applications;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load applications");
                self.error = Some(err.to_string());
            }
        }

        self.is_loading = false;
    }

    /// Apply a patch through the API. Returns the stored record on success.
    pub fn patch_application(&mut self, id: &str, patch: &ApplicationPatch) -> Option<Application> {
        self.apply_patch(id, patch).ok()
    }

    fn apply_patch(&mut self, id: &str, patch: &ApplicationPatch) -> Result<Application, ApiError> {
        self.is_loading = true;
        self.error = None;

        let result = self.api.update_application(id, patch);
        match &result {
            Ok(updated) => {
                if let Some(slot) = self.applications.iter_mut().find(|app| app.id == id) {
                    *slot = updated.clone();
                }
                tracing::info!(id, "application updated");
            }
            Err(err) => {
                tracing::warn!(id, error = %err, "failed to update application");
                self.error = Some(err.to_string());
            }
        }

        self.is_loading = false;
        result
    }

    /// Record as last seen locally, or as the API holds it before any patch
    fn baseline(&mut self, id: &str) -> Result<Application, ApiError> {
        if let Some(found) = self.find(id) {
            return Ok(found.clone());
        }

        let fetched = self.api.fetch_applications().and_then(|apps| {
            apps.into_iter()
                .find(|app| app.id == id)
                .ok_or_else(|| ApiError::NotFound(id.to_string()))
        });
        if let Err(err) = &fetched {
            tracing::warn!(id, error = %err, "no baseline for update");
            self.error = Some(err.to_string());
        }
        fetched
    }

    /// Stamp and prepend a log entry
    pub fn add_log_entry(&mut self, entry: NewLogEntry) -> &ChangeLogEntry {
        self.log_seq += 1;
        let timestamp = Utc::now();
        let logged = ChangeLogEntry {
            id: format!("log-{}-{}", timestamp.timestamp_millis(), self.log_seq),
            timestamp,
            client_id: entry.client_id,
            client_name: entry.client_name,
            description: entry.description,
        };
        tracing::info!(id = %logged.id, client = %logged.client_id, "change recorded");

        self.change_log.insert(0, logged);
        &self.change_log[0]
    }

    pub fn select_application(&mut self, id: Option<&str>) {
        self.selected_id = id.map(str::to_string);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    // ========================================================================
    // EDIT WORKFLOW
    // ========================================================================

    /// Validate and commit an edit form
    ///
    /// The log entry is written only after the API accepted the patch, so a
    /// failed save leaves no audit record.
    pub fn submit_edit(&mut self, form: &mut EditForm) -> SubmitOutcome {
        form.touched = true;

        let validation = form.validation();
        let update = match form.update() {
            Some(update) if validation.is_valid => update,
            _ => return SubmitOutcome::Invalid(validation),
        };

        self.commit_update(&form.original.id, update)
    }

    /// Commit an already-validated update against the stored record
    ///
    /// The diff runs against the last fetched copy, which is what the operator
    /// saw. A record missing from the list is read from the API before patching.
    pub fn commit_update(&mut self, id: &str, update: ApplicationUpdate) -> SubmitOutcome {
        let before = match self.baseline(id) {
            Ok(before) => before,
            Err(err) => return SubmitOutcome::Failed(err),
        };

        let application = match self.apply_patch(id, &update.into()) {
            Ok(application) => application,
            Err(err) => return SubmitOutcome::Failed(err),
        };

        let entry = record_change(&before, update.new_limit, update.new_status)
            .map(|entry| self.add_log_entry(entry).clone());

        SubmitOutcome::Saved { application, entry }
    }
}
