//! API endpoint and storage configuration.

/// Application-level constants
pub const APP_NAME: &str = "Caredesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of patients requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "caredesk=info"
}

/// Where the patient API and its file storage live.
///
/// `api_url` is the REST base (the `patients` resource hangs off it);
/// `storage_url` is the host serving uploaded document images under a
/// fixed `storage/` prefix.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    api_url: String,
    storage_url: String,
}

impl ApiConfig {
    /// Create a config from explicit URLs. Trailing slashes are trimmed so
    /// path joins stay predictable.
    pub fn new(api_url: &str, storage_url: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            storage_url: storage_url.trim_end_matches('/').to_string(),
        }
    }

    /// Read `API_URL` / `STORAGE_URL` from the environment, falling back to
    /// a local development server.
    pub fn from_env() -> Self {
        let api_url =
            std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:8000/api".to_string());
        let storage_url =
            std::env::var("STORAGE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
        Self::new(&api_url, &storage_url)
    }

    /// Base URL of the `patients` REST resource.
    pub fn patients_url(&self) -> String {
        format!("{}/patients", self.api_url)
    }

    /// Resolve a server-relative document path (e.g. `documents/uuid.jpg`)
    /// to a viewable URL.
    ///
    /// An empty path yields an empty string; the caller substitutes a
    /// placeholder image.
    pub fn document_url(&self, path: &str) -> String {
        if path.is_empty() {
            return String::new();
        }
        format!("{}/storage/{}", self.storage_url, path.trim_start_matches('/'))
    }
}
