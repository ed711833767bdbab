//! Patient REST client — typed CRUD against the `patients` resource.
//!
//! Request payloads and query params go out snake_cased through the codec;
//! response bodies come back through the codec before typed decoding.
//! Failures surface unmodified as [`TransportError`] — no retries here.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use serde_json::Value;

use crate::codec;
use crate::config::ApiConfig;
use crate::error::TransportError;
use crate::models::{ImageUpload, ListParams, Page, Patient, PatientForm};

/// Multipart part name for the identity-document image. Deliberately not a
/// payload key: the server treats the file and the `document_image_path`
/// field as different things.
pub const IMAGE_FIELD: &str = "document_image";

/// The seam between the controller and HTTP.
#[allow(async_fn_in_trait)]
pub trait PatientTransport {
    async fn list(&self, params: &ListParams) -> Result<Page<Patient>, TransportError>;
    async fn get(&self, id: u64) -> Result<Patient, TransportError>;
    async fn create(
        &self,
        form: &PatientForm,
        image: Option<&ImageUpload>,
    ) -> Result<Patient, TransportError>;
    async fn update(
        &self,
        id: u64,
        form: &PatientForm,
        image: Option<&ImageUpload>,
    ) -> Result<Patient, TransportError>;
    async fn delete(&self, id: u64) -> Result<(), TransportError>;
}

/// reqwest-backed client for the patient API.
pub struct HttpPatientClient {
    base_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpPatientClient {
    /// Create a client for the configured API with a per-request timeout.
    pub fn new(config: &ApiConfig, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: config.patients_url(),
            client,
            timeout_secs,
        }
    }

    /// Client with a 30-second timeout.
    pub fn with_defaults(config: &ApiConfig) -> Self {
        Self::new(config, 30)
    }

    fn patient_url(&self, id: u64) -> String {
        format!("{}/{}", self.base_url, id)
    }

    fn map_send_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_connect() {
            TransportError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            TransportError::Timeout(self.timeout_secs)
        } else {
            TransportError::Client(e.to_string())
        }
    }

    async fn decode_patient(response: reqwest::Response) -> Result<Patient, TransportError> {
        let value: Value = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        serde_json::from_value(codec::to_client_keys(value))
            .map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn fail_on_status(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Http { status: status.as_u16(), body })
    }

    fn multipart_form(
        form: &PatientForm,
        image: Option<&ImageUpload>,
    ) -> Result<reqwest::multipart::Form, TransportError> {
        let mut multipart = reqwest::multipart::Form::new();
        for (key, value) in server_fields(form) {
            multipart = multipart.text(key, value);
        }
        if let Some(image) = image {
            let part = reqwest::multipart::Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)
                .map_err(|e| TransportError::Client(e.to_string()))?;
            multipart = multipart.part(IMAGE_FIELD, part);
        }
        Ok(multipart)
    }
}

/// Snake-cased text fields for a multipart payload, empty values omitted.
fn server_fields(form: &PatientForm) -> Vec<(String, String)> {
    let value = codec::to_server_keys(
        serde_json::to_value(form).expect("PatientForm always serializes"),
    );
    let Value::Object(map) = value else {
        return Vec::new();
    };
    map.into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some((key, s)),
            Value::Null => None,
            other => Some((key, other.to_string())),
        })
        .collect()
}

impl PatientTransport for HttpPatientClient {
    async fn list(&self, params: &ListParams) -> Result<Page<Patient>, TransportError> {
        tracing::debug!(page = params.page, search = ?params.search, "Listing patients");
        let response = self
            .client
            .get(&self.base_url)
            .query(&params.to_query())
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::fail_on_status(response).await?;

        let value: Value = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        serde_json::from_value(codec::to_client_keys(value))
            .map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn get(&self, id: u64) -> Result<Patient, TransportError> {
        let response = self
            .client
            .get(self.patient_url(id))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound(id));
        }
        let response = Self::fail_on_status(response).await?;
        Self::decode_patient(response).await
    }

    async fn create(
        &self,
        form: &PatientForm,
        image: Option<&ImageUpload>,
    ) -> Result<Patient, TransportError> {
        tracing::info!(first_name = %form.first_name, last_name = %form.last_name, "Creating patient");
        let multipart = Self::multipart_form(form, image)?;
        let response = self
            .client
            .post(&self.base_url)
            .multipart(multipart)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::fail_on_status(response).await?;
        Self::decode_patient(response).await
    }

    async fn update(
        &self,
        id: u64,
        form: &PatientForm,
        image: Option<&ImageUpload>,
    ) -> Result<Patient, TransportError> {
        tracing::info!(id, "Updating patient");
        let multipart = Self::multipart_form(form, image)?;
        let response = self
            .client
            .put(self.patient_url(id))
            .multipart(multipart)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::fail_on_status(response).await?;
        Self::decode_patient(response).await
    }

    async fn delete(&self, id: u64) -> Result<(), TransportError> {
        tracing::info!(id, "Deleting patient");
        let response = self
            .client
            .delete(self.patient_url(id))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Self::fail_on_status(response).await?;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Mock transport for tests
// ═══════════════════════════════════════════════════════════

/// In-memory transport — queues list pages, records every call.
pub struct MockTransport {
    pages: Mutex<VecDeque<Page<Patient>>>,
    patients: Mutex<HashMap<u64, Patient>>,
    list_calls: Mutex<Vec<ListParams>>,
    create_calls: Mutex<Vec<PatientForm>>,
    update_calls: Mutex<Vec<(u64, PatientForm)>>,
    delete_calls: Mutex<Vec<u64>>,
    fail_lists: AtomicBool,
    fail_mutations: AtomicBool,
    next_id: AtomicU64,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(VecDeque::new()),
            patients: Mutex::new(HashMap::new()),
            list_calls: Mutex::new(Vec::new()),
            create_calls: Mutex::new(Vec::new()),
            update_calls: Mutex::new(Vec::new()),
            delete_calls: Mutex::new(Vec::new()),
            fail_lists: AtomicBool::new(false),
            fail_mutations: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
        }
    }

    /// Queue pages returned by successive `list` calls, in order.
    pub fn with_pages(self, pages: Vec<Page<Patient>>) -> Self {
        *self.pages.lock().unwrap() = pages.into();
        self
    }

    /// Seed a patient for `get`.
    pub fn with_patient(self, patient: Patient) -> Self {
        self.patients.lock().unwrap().insert(patient.id, patient);
        self
    }

    /// Every subsequent `list` fails with a 500.
    pub fn failing_lists(self) -> Self {
        self.fail_lists.store(true, Ordering::SeqCst);
        self
    }

    /// Every subsequent create/update/delete fails with a 500.
    pub fn failing_mutations(self) -> Self {
        self.fail_mutations.store(true, Ordering::SeqCst);
        self
    }

    pub fn list_calls(&self) -> Vec<ListParams> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn create_calls(&self) -> Vec<PatientForm> {
        self.create_calls.lock().unwrap().clone()
    }

    pub fn update_calls(&self) -> Vec<(u64, PatientForm)> {
        self.update_calls.lock().unwrap().clone()
    }

    pub fn delete_calls(&self) -> Vec<u64> {
        self.delete_calls.lock().unwrap().clone()
    }

    fn server_error() -> TransportError {
        TransportError::Http { status: 500, body: "mock failure".into() }
    }

    fn persist(&self, id: u64, form: &PatientForm, image: Option<&ImageUpload>) -> Patient {
        let document_image_path = match image {
            Some(image) => format!("documents/{}", image.file_name),
            None => form.document_image_path.clone(),
        };
        let patient = Patient {
            id,
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            email: form.email.clone(),
            phone_number: form.phone_number.clone(),
            country_iso: form.country_iso.clone(),
            document_image_path,
        };
        self.patients.lock().unwrap().insert(id, patient.clone());
        patient
    }
}

impl PatientTransport for MockTransport {
    async fn list(&self, params: &ListParams) -> Result<Page<Patient>, TransportError> {
        self.list_calls.lock().unwrap().push(params.clone());
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        let page = self.pages.lock().unwrap().pop_front().unwrap_or(Page {
            data: Vec::new(),
            meta: crate::models::PageMeta {
                current_page: params.page,
                last_page: params.page,
                per_page: params.page_size,
                total: 0,
            },
            links: None,
        });
        Ok(page)
    }

    async fn get(&self, id: u64) -> Result<Patient, TransportError> {
        self.patients
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(TransportError::NotFound(id))
    }

    async fn create(
        &self,
        form: &PatientForm,
        image: Option<&ImageUpload>,
    ) -> Result<Patient, TransportError> {
        self.create_calls.lock().unwrap().push(form.clone());
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(self.persist(id, form, image))
    }

    async fn update(
        &self,
        id: u64,
        form: &PatientForm,
        image: Option<&ImageUpload>,
    ) -> Result<Patient, TransportError> {
        self.update_calls.lock().unwrap().push((id, form.clone()));
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        Ok(self.persist(id, form, image))
    }

    async fn delete(&self, id: u64) -> Result<(), TransportError> {
        self.delete_calls.lock().unwrap().push(id);
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        self.patients.lock().unwrap().remove(&id);
        Ok(())
    }
}
