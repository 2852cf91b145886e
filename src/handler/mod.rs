//! Request handler module
//!
//! Routing plus the endpoint handlers: contact form submission, admin
//! listing and the static site.

pub mod admin;
pub mod form;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
