//! HTTP protocol helpers
//!
//! Response builders, MIME lookup and cache validation, independent of the
//! contact form logic.

pub mod cache;
pub mod mime;
pub mod response;

pub use response::{
    apply_cors, build_304_response, build_404_response, build_405_response, build_413_response,
    build_options_response, error_response, internal_error, json_response, strip_body,
};
