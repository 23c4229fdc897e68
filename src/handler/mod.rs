//! Request handler module
//!
//! Responsible for request routing dispatch and the three endpoints: landing page,
//! script listing and script content.

pub mod content;
pub mod error;
pub mod listing;
pub mod router;
pub mod static_page;

// Re-export main entry point
pub use router::handle_request;
