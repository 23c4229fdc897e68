//! Routing module
//!
//! Path-based dispatch to the landing page, the listing endpoint and the content endpoint.

mod matcher;

pub use matcher::{match_endpoint, Endpoint};
