//! Route handlers for the form server
//!
//! Handlers are organized by concern:
//! - [`form`]: the report form and its submission
//! - [`system`]: health and OpenAPI

mod form;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use form::*;
pub use system::*;

/// Multipart field carrying the uploaded file
pub const ATTACHMENT_FIELD: &str = "attachment";
