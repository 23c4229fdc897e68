//! Handler result types
//!
//! Every endpoint handler returns `Result<Payload, HandlerError>`; the router turns
//! either side into a wire response.

use hyper::body::Bytes;
use hyper::StatusCode;
use std::fmt;

/// Successful handler output
#[derive(Debug, Clone)]
pub struct Payload {
    pub content_type: &'static str,
    pub body: Bytes,
}

impl Payload {
    pub fn new(content_type: &'static str, body: impl Into<Bytes>) -> Self {
        Self {
            content_type,
            body: body.into(),
        }
    }
}

/// Failure raised while handling one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Landing page or script file is missing
    NotFound(String),
    /// Requested filename failed the safety checks
    InvalidInput(String),
    /// Read, decode or enumeration failure
    Io(String),
    /// Anything else surfacing from request processing, e.g. a handler panic
    Internal(String),
}

pub type HandlerResult = Result<Payload, HandlerError>;

impl HandlerError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(m) | Self::InvalidInput(m) | Self::Io(m) | Self::Internal(m) => m,
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.status().as_u16())
    }
}

impl std::error::Error for HandlerError {}
