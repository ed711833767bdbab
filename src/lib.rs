//! Caredesk — client-side data pipeline for a patient-management dashboard.
//!
//! The rendering layer (whatever draws the cards) consumes derived state from
//! [`dashboard::Dashboard`]; everything underneath is plain data plumbing:
//! a typed REST client, a per-query pagination cache, and a local overlay of
//! not-yet-persisted drafts.

pub mod cache; // Paginated query cache (single-flight, last-key-wins)
pub mod codec; // camelCase ⇄ snake_case key translation at the wire boundary
pub mod config;
pub mod countries;
pub mod dashboard; // Controller wiring user actions to cache + overlay
pub mod error;
pub mod models;
pub mod overlay; // Client-only draft records, rendered ahead of server pages
pub mod transport; // Patient REST client (reqwest, multipart uploads)
pub mod validation;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries embedding the pipeline.
///
/// Honors `RUST_LOG`; falls back to the crate default filter. Safe to call
/// more than once (later calls are no-ops).
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}
