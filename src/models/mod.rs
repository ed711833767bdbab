//! Data model: patient records, drafts, pages, and list-query parameters.
//!
//! Everything here serializes in the client shape (camelCase keys); the
//! codec translates to/from the server's snake_case at the wire boundary.

mod filters;
mod page;
mod patient;

pub use filters::*;
pub use page::*;
pub use patient::*;
