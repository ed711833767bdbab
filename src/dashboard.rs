//! Dashboard controller — wires user actions to the cache and the overlay.
//!
//! Owns only derived/display state (search text and sort field live in the
//! cache key, view mode, the active notification, field errors from the
//! last save attempt). The rendered list is a pure derivation recomputed on
//! demand: overlay drafts first, then the cache's accumulated records.

use uuid::Uuid;

use crate::cache::{FetchPhase, PageCache, QueryKey};
use crate::error::{SaveError, TransportError};
use crate::models::{ImageUpload, Patient, PatientDraft, PatientForm, SortField};
use crate::overlay::DraftOverlay;
use crate::transport::PatientTransport;
use crate::validation::{validate_form, ValidationErrors};

/// Pure presentation toggle; no data effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// The single dashboard notification. A new one replaces the current one;
/// dismissal is manual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// One row of the rendered list.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEntry<'a> {
    Draft(&'a PatientDraft),
    Persisted(&'a Patient),
}

/// Controller for the patient dashboard.
pub struct Dashboard<T: PatientTransport> {
    transport: T,
    cache: PageCache,
    overlay: DraftOverlay,
    view_mode: ViewMode,
    notification: Option<Notification>,
    field_errors: Option<ValidationErrors>,
}

impl<T: PatientTransport> Dashboard<T> {
    pub fn new(transport: T, page_size: u32) -> Self {
        Self {
            transport,
            cache: PageCache::new(QueryKey::default(), page_size),
            overlay: DraftOverlay::new(),
            view_mode: ViewMode::default(),
            notification: None,
            field_errors: None,
        }
    }

    // ── Query state ──────────────────────────────────────

    pub fn search(&self) -> &str {
        &self.cache.key().search
    }

    pub fn sort_by(&self) -> SortField {
        self.cache.key().sort_by
    }

    /// Re-keys the cache and restarts pagination. Called per keystroke;
    /// no client-side debounce (known performance gap, left as observed).
    pub fn set_search(&mut self, text: &str) {
        let sort_by = self.sort_by();
        self.cache.set_key(QueryKey::new(text, sort_by));
    }

    pub fn set_sort(&mut self, sort_by: SortField) {
        let search = self.search().to_string();
        self.cache.set_key(QueryKey { search, sort_by });
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    // ── List fetching ────────────────────────────────────

    /// Drive one page fetch, if one is due. No-op while a fetch is in
    /// flight or when the last page has been received — safe to call from
    /// scroll-near-bottom handlers as often as they fire.
    pub async fn fetch_next_page(&mut self) {
        let Some(request) = self.cache.next_request() else {
            return;
        };
        match self.transport.list(&request.params).await {
            Ok(page) => {
                self.cache.apply_page(request.token, page);
            }
            Err(e) => {
                if self.cache.apply_error(request.token) {
                    self.notify(NotificationKind::Error, format!("Failed to load patients: {e}"));
                }
            }
        }
    }

    pub fn has_more(&self) -> bool {
        self.cache.has_more()
    }

    /// Initial load of the current key in progress, nothing to show yet.
    pub fn is_loading(&self) -> bool {
        self.cache.phase() == FetchPhase::Loading
    }

    pub fn is_fetching_more(&self) -> bool {
        self.cache.phase() == FetchPhase::LoadingMore
    }

    /// Settled with nothing to render (no drafts, no records).
    pub fn is_empty(&self) -> bool {
        self.cache.phase() == FetchPhase::Ready
            && self.overlay.is_empty()
            && self.cache.records().is_empty()
    }

    /// Drafts in insertion order, then the server-backed sequence.
    pub fn visible_patients(&self) -> Vec<ListEntry<'_>> {
        self.overlay
            .iter()
            .map(ListEntry::Draft)
            .chain(self.cache.records().iter().map(ListEntry::Persisted))
            .collect()
    }

    // ── Mutations ────────────────────────────────────────

    /// "Add" action: a blank draft appears ahead of the list, in edit mode.
    pub fn add_patient(&mut self) -> Uuid {
        self.overlay.add_draft()
    }

    /// User typed into a draft card. Clears save errors from the previous
    /// attempt; re-validation happens only on the next save.
    pub fn update_draft(&mut self, draft_id: Uuid, form: PatientForm) -> bool {
        self.field_errors = None;
        self.overlay.update_form(draft_id, form)
    }

    /// Validate and persist a draft. On success the draft leaves the
    /// overlay and the cache restarts, so the persisted record surfaces
    /// through the next page fetch. On failure the draft stays editable.
    pub async fn commit_draft(
        &mut self,
        draft_id: Uuid,
        image: Option<ImageUpload>,
    ) -> Result<(), SaveError> {
        let Some(draft) = self.overlay.get(draft_id).cloned() else {
            return Ok(());
        };
        if let Err(errors) = validate_form(&draft.form, image.as_ref()) {
            self.field_errors = Some(errors.clone());
            return Err(SaveError::Validation(errors));
        }
        self.field_errors = None;

        match self.transport.create(&draft.form, image.as_ref()).await {
            Ok(patient) => {
                self.overlay.remove(draft_id);
                self.cache.invalidate();
                self.notify(
                    NotificationKind::Success,
                    format!("Patient {} created", patient.full_name()),
                );
                Ok(())
            }
            Err(e) => {
                self.notify(NotificationKind::Error, format!("Failed to create patient: {e}"));
                Err(e.into())
            }
        }
    }

    /// Validate and save an edit to a persisted record. A new image is
    /// optional when the record already carries a document path.
    pub async fn save_patient(
        &mut self,
        id: u64,
        form: PatientForm,
        image: Option<ImageUpload>,
    ) -> Result<(), SaveError> {
        if let Err(errors) = validate_form(&form, image.as_ref()) {
            self.field_errors = Some(errors.clone());
            return Err(SaveError::Validation(errors));
        }
        self.field_errors = None;

        match self.transport.update(id, &form, image.as_ref()).await {
            Ok(patient) => {
                self.cache.invalidate();
                self.notify(
                    NotificationKind::Success,
                    format!("Patient {} updated", patient.full_name()),
                );
                Ok(())
            }
            Err(e) => {
                self.notify(NotificationKind::Error, format!("Failed to update patient: {e}"));
                Err(e.into())
            }
        }
    }

    /// "Cancel" on a draft card: the draft disappears, nothing is sent.
    pub fn discard_draft(&mut self, draft_id: Uuid) {
        self.field_errors = None;
        self.overlay.remove(draft_id);
    }

    pub async fn delete_patient(&mut self, id: u64) -> Result<(), TransportError> {
        match self.transport.delete(id).await {
            Ok(()) => {
                self.cache.invalidate();
                self.notify(NotificationKind::Success, "Patient deleted".to_string());
                Ok(())
            }
            Err(e) => {
                self.notify(NotificationKind::Error, format!("Failed to delete patient: {e}"));
                Err(e)
            }
        }
    }

    // ── Notifications & errors ───────────────────────────

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    /// Field errors from the most recent failed save attempt.
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        self.field_errors.as_ref()
    }

    fn notify(&mut self, kind: NotificationKind, message: String) {
        tracing::debug!(%message, "Dashboard notification");
        self.notification = Some(Notification { kind, message });
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
