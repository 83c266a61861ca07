//! The registration form controller and the desk that owns every store.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use regdesk_core::{Candidate, CandidatePatch, Config, FormSnapshot};
use regdesk_storage::{BlobStore, KeyValueStore};

use crate::ServiceError;
use crate::candidate_repository::CandidateRepository;
use crate::counters::CountersService;
use crate::draft::{DraftAutosave, DraftStore};
use crate::edit_session::EditSessionManager;
use crate::photo::{PhotoAttachment, PhotoService};

/// Every service of one data directory, shared by all open forms and views.
pub struct RegistrationDesk {
    candidates: CandidateRepository,
    sessions: EditSessionManager,
    drafts: DraftStore,
    counters: CountersService,
    photos: PhotoService,
    edit_ttl: chrono::Duration,
    draft_debounce: Duration,
}

impl RegistrationDesk {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, blobs: Arc<dyn BlobStore>, config: &Config) -> Self {
        Self {
            candidates: CandidateRepository::load(kv.clone()),
            sessions: EditSessionManager::new(kv.clone()),
            drafts: DraftStore::new(kv.clone()),
            counters: CountersService::load(kv),
            photos: PhotoService::new(blobs),
            edit_ttl: config.edit_ttl,
            draft_debounce: config.draft_debounce,
        }
    }

    pub fn candidates(&self) -> &CandidateRepository {
        &self.candidates
    }

    pub fn sessions(&self) -> &EditSessionManager {
        &self.sessions
    }

    pub fn drafts(&self) -> &DraftStore {
        &self.drafts
    }

    pub fn counters(&self) -> &CountersService {
        &self.counters
    }

    pub fn photos(&self) -> &PhotoService {
        &self.photos
    }

    /// Deletes a candidate together with its edit token and stored photo.
    ///
    /// Returns `true` if the candidate existed.
    pub async fn remove_candidate(&self, id: &str) -> Result<bool, ServiceError> {
        let removed = self.candidates.remove(id)?;
        self.sessions.revoke(id)?;
        let photo_removed = self.photos.delete(id).await?;
        tracing::info!(id, removed, photo_removed, "Candidate removal processed");
        Ok(removed)
    }

    /// Candidate list with stored photos merged in.
    pub async fn candidates_with_photos(&self) -> Result<Vec<Candidate>, ServiceError> {
        self.photos.attach_photos(self.candidates.list()).await
    }
}

/// What happened to the attached photo on submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoPersist {
    NotAttached,
    Saved,
    /// Both attempts failed; the candidate still carries the inline copy.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub candidate: Candidate,
    /// `false` when an existing candidate was updated
    pub created: bool,
    pub photo: PhotoPersist,
}

impl SubmitOutcome {
    #[must_use]
    pub fn photo_saved(&self) -> bool {
        self.photo != PhotoPersist::Failed
    }
}

/// One open registration form.
///
/// Opening counts a visit and restores the draft, then any active edit
/// session on top of it. Every change feeds the draft autosave task.
pub struct RegistrationFlow {
    desk: Arc<RegistrationDesk>,
    form: FormSnapshot,
    photo: PhotoAttachment,
    editing: bool,
    autosave: Option<DraftAutosave>,
}

impl RegistrationFlow {
    /// Opens the form. Must be called inside a tokio runtime.
    pub async fn open(desk: Arc<RegistrationDesk>) -> Result<Self, ServiceError> {
        desk.counters.increment_visits()?;

        let mut flow = Self {
            form: FormSnapshot::default(),
            photo: PhotoAttachment::new(),
            editing: false,
            autosave: None,
            desk,
        };

        if let Some(draft) = flow.desk.drafts.load() {
            tracing::debug!(updated_at = %draft.updated_at, "Draft restored");
            flow.form = draft.form;
            if !flow.form.image_data_url.is_empty() {
                flow.photo.set(flow.form.image_data_url.clone());
            }
        }

        if let Some(candidate) = flow.desk.sessions.resolve_active_session(&flow.desk.candidates)? {
            flow.load_candidate(&candidate).await;
        }

        flow.autosave =
            Some(DraftAutosave::spawn(flow.desk.drafts.clone(), flow.desk.draft_debounce));
        Ok(flow)
    }

    /// Replaces the form with `candidate` and restores its photo, from the
    /// inline copy or else the photo store.
    async fn load_candidate(&mut self, candidate: &Candidate) {
        self.form = FormSnapshot::from_candidate(candidate);
        self.photo.clear();
        self.editing = true;

        if let Some(inline) = candidate.image_data_url.as_deref().filter(|s| !s.is_empty()) {
            self.photo.set(inline);
            return;
        }
        match self.desk.photos.get(&candidate.id).await {
            Ok(Some(stored)) => {
                self.photo.set(stored.clone());
                self.form.image_data_url = stored;
            },
            Ok(None) => {},
            Err(e) => tracing::warn!(id = %candidate.id, error = %e, "Failed to restore photo"),
        }
    }

    pub fn form(&self) -> &FormSnapshot {
        &self.form
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn photo(&self) -> Option<String> {
        self.photo.current()
    }

    pub fn selected_file_name(&self) -> Option<String> {
        self.photo.selected_file_name()
    }

    /// Sets one form field by its camelCase name.
    pub fn set_field(&mut self, field: &str, value: impl Into<String>) -> Result<(), ServiceError> {
        self.form.set_field(field, value)?;
        self.on_change();
        Ok(())
    }

    /// Loads photo files; the one read last becomes the form's photo.
    pub async fn select_photos(&mut self, paths: Vec<PathBuf>) -> usize {
        let loaded = self.photo.select_files(paths).await;
        if let Some(current) = self.photo.current() {
            self.form.image_data_url = current;
            self.on_change();
        }
        loaded
    }

    /// Hands the current form to the autosave task.
    pub fn on_change(&self) {
        if let Some(autosave) = &self.autosave {
            autosave.notify(self.form.clone());
        }
    }

    /// Validates and stores the form.
    ///
    /// New registrations get an edit token and bump the registration
    /// counter. On success the draft is cleared, autosave stops and the
    /// flow holds the stored candidate in edit mode.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, ServiceError> {
        let input = self.form.validate().map_err(ServiceError::Validation)?;
        let desk = Arc::clone(&self.desk);

        let (candidate, created) = match self.form.editing_id() {
            Some(id) => {
                let updated = desk
                    .candidates
                    .update(id, CandidatePatch::from(input))?
                    .ok_or_else(|| ServiceError::NotFound { entity: "candidate", id: id.to_owned() })?;
                (updated, false)
            },
            None => {
                let created = desk.candidates.create(input)?;
                desk.sessions.issue_token(&created.id, desk.edit_ttl)?;
                let total = desk.counters.increment_registrations()?;
                tracing::info!(id = %created.id, registrations = total, "Candidate registered");
                (created, true)
            },
        };

        let photo = match self.photo.current() {
            Some(data_uri) => persist_photo(&desk.photos, &candidate.id, &data_uri).await,
            None => PhotoPersist::NotAttached,
        };

        if let Some(autosave) = self.autosave.take() {
            autosave.shutdown().await;
        }
        desk.drafts.clear()?;

        self.form = FormSnapshot::from_candidate(&candidate);
        self.editing = true;
        Ok(SubmitOutcome { candidate, created, photo })
    }

    /// Resets the form and photo, drops every edit token and the draft.
    ///
    /// Restarts autosave if a submit stopped it, so it must be called
    /// inside a tokio runtime.
    pub fn start_new_registration(&mut self) -> Result<(), ServiceError> {
        self.form = FormSnapshot::default();
        self.photo.clear();
        self.editing = false;

        let cleared = self.desk.sessions.clear_all_sessions()?;
        self.desk.drafts.clear()?;
        tracing::debug!(tokens = cleared, "Started new registration");

        match &self.autosave {
            Some(autosave) => autosave.notify(self.form.clone()),
            None => {
                self.autosave = Some(DraftAutosave::spawn(
                    self.desk.drafts.clone(),
                    self.desk.draft_debounce,
                ));
            },
        }
        Ok(())
    }

    /// Stops autosave; a change still inside the debounce window is lost.
    pub async fn close(mut self) {
        if let Some(autosave) = self.autosave.take() {
            autosave.shutdown().await;
        }
    }
}

async fn persist_photo(photos: &PhotoService, id: &str, data_uri: &str) -> PhotoPersist {
    for attempt in 1..=2 {
        match photos.save(id, data_uri).await {
            Ok(()) => return PhotoPersist::Saved,
            Err(e) => tracing::warn!(id, attempt, error = %e, "Failed to store photo"),
        }
    }
    PhotoPersist::Failed
}
