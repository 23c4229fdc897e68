//! HTTP response building module
//!
//! Provides builders for the responses the server sends, decoupled from handler logic.
//! Every builder sets an explicit `Content-Length` equal to the full body length, also for
//! `HEAD` where the body itself is dropped.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

pub const CONTENT_TYPE_HTML: &str = "text/html";
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Build a response with body, content type and optional permissive CORS header
pub fn build_response(
    status: StatusCode,
    content_type: &str,
    data: Bytes,
    cors: bool,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length);

    if cors {
        builder = builder.header("Access-Control-Allow-Origin", "*");
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(status.as_str(), &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build an error response: `<code> <reason>: <message>` as plain text
pub fn build_error_response(
    status: StatusCode,
    message: &str,
    cors: bool,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let reason = status.canonical_reason().unwrap_or("Error");
    let text = format!("{} {reason}: {message}", status.as_u16());
    build_response(status, CONTENT_TYPE_TEXT, Bytes::from(text), cors, is_head)
}

/// Build 404 Not Found response
pub fn build_404_response(is_head: bool) -> Response<Full<Bytes>> {
    build_error_response(StatusCode::NOT_FOUND, "File not found", false, is_head)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    let body = "405 Method Not Allowed";
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", CONTENT_TYPE_TEXT)
        .header("Content-Length", body.len())
        .header("Allow", ALLOWED_METHODS)
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from(body)))
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", ALLOWED_METHODS)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
        .header("Access-Control-Allow-Headers", "Content-Type")
        .header("Access-Control-Max-Age", "86400")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
