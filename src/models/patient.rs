use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted patient record. `id` is always server-assigned; records that
/// have not been persisted yet live as [`PatientDraft`], never as a
/// `Patient` with a sentinel id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub country_iso: String,
    /// Server-relative storage path of the identity-document image.
    #[serde(default)]
    pub document_image_path: String,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The editable field set — create/update payload and draft content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub country_iso: String,
    /// Empty for new drafts; carries the existing path when editing a
    /// persisted record without replacing its image.
    #[serde(default)]
    pub document_image_path: String,
}

impl From<&Patient> for PatientForm {
    fn from(patient: &Patient) -> Self {
        Self {
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            email: patient.email.clone(),
            phone_number: patient.phone_number.clone(),
            country_iso: patient.country_iso.clone(),
            document_image_path: patient.document_image_path.clone(),
        }
    }
}

/// A client-only draft record, not yet persisted.
///
/// Drafts carry their own `Uuid` identity instead of a numeric sentinel id,
/// so nothing downstream ever has to infer draft-ness from id magnitude.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientDraft {
    pub draft_id: Uuid,
    pub form: PatientForm,
}

impl PatientDraft {
    /// A blank draft with all fields empty.
    pub fn blank() -> Self {
        Self {
            draft_id: Uuid::new_v4(),
            form: PatientForm::default(),
        }
    }
}

/// An identity-document image selected on the client, pending upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Build an upload from raw bytes, guessing the MIME type from the
    /// file name.
    pub fn from_bytes(file_name: &str, bytes: Vec<u8>) -> Self {
        let content_type = mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .to_string();
        Self {
            file_name: file_name.to_string(),
            content_type,
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}
