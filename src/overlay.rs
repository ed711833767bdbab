//! Local overlay of draft patients.
//!
//! Drafts exist only in client memory and render ahead of the server-backed
//! page sequence. A draft leaves the overlay exactly once: when its create
//! call succeeds (the persisted record then surfaces through the next list
//! refresh) or when the user discards it.

use uuid::Uuid;

use crate::models::{PatientDraft, PatientForm};

/// Ordered store of drafts, newest first.
#[derive(Debug, Default)]
pub struct DraftOverlay {
    drafts: Vec<PatientDraft>,
}

impl DraftOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a blank draft; returns its id.
    pub fn add_draft(&mut self) -> Uuid {
        let draft = PatientDraft::blank();
        let id = draft.draft_id;
        self.drafts.insert(0, draft);
        id
    }

    pub fn get(&self, draft_id: Uuid) -> Option<&PatientDraft> {
        self.drafts.iter().find(|d| d.draft_id == draft_id)
    }

    /// Replace a draft's form content (user typing into the card).
    /// Returns false for an unknown id.
    pub fn update_form(&mut self, draft_id: Uuid, form: PatientForm) -> bool {
        match self.drafts.iter_mut().find(|d| d.draft_id == draft_id) {
            Some(draft) => {
                draft.form = form;
                true
            }
            None => false,
        }
    }

    /// Remove a draft unconditionally. Returns the removed entry so the
    /// caller can tell a real removal from a repeat call.
    pub fn remove(&mut self, draft_id: Uuid) -> Option<PatientDraft> {
        let index = self.drafts.iter().position(|d| d.draft_id == draft_id)?;
        Some(self.drafts.remove(index))
    }

    /// Drafts in render order (most recently added first).
    pub fn iter(&self) -> impl Iterator<Item = &PatientDraft> {
        self.drafts.iter()
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}
