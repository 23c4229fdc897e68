//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from specific business logic.

pub mod response;

// Re-export commonly used types
pub use response::{
    build_404_response, build_405_response, build_error_response, build_options_response,
    build_response, CONTENT_TYPE_HTML, CONTENT_TYPE_JSON, CONTENT_TYPE_TEXT,
};
