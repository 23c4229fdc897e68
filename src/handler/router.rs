//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation, route
//! matching, dispatching, and turning handler results into responses.

use crate::config::AppState;
use crate::handler::error::{HandlerError, HandlerResult};
use crate::handler::{content, listing, static_page};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::{match_endpoint, Endpoint};
use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    // Routing sees the full request target; a query string is part of what gets matched
    let path = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path(), |pq| pq.as_str())
        .to_string();
    let version = req.version();

    let is_api = match_endpoint(&path).is_some_and(|e| e.is_api());
    let is_head = method == Method::HEAD;
    let response = run_isolated(
        route(method.clone(), path.clone(), state),
        &path,
        is_api,
        is_head,
    )
    .await;

    let mut entry = AccessLogEntry::new(peer_addr.to_string(), method.to_string(), path);
    entry.http_version = logger::version_label(version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    logger::log_access(&entry);

    Ok(response)
}

/// Run a routing future on its own task so that a panic becomes a 500 for this request
/// only
pub async fn run_isolated<F>(
    fut: F,
    path: &str,
    is_api: bool,
    is_head: bool,
) -> Response<Full<Bytes>>
where
    F: Future<Output = Response<Full<Bytes>>> + Send + 'static,
{
    match tokio::spawn(fut).await {
        Ok(response) => response,
        Err(join_err) => {
            let message = match join_err.try_into_panic() {
                Ok(panic) => panic
                    .downcast_ref::<&str>()
                    .map(ToString::to_string)
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "handler panicked".to_string()),
                Err(join_err) => join_err.to_string(),
            };
            let err = HandlerError::Internal(format!("Internal server error: {message}"));
            into_response(Err(err), path, is_api, is_head)
        }
    }
}

/// Dispatch one request to its endpoint handler
pub async fn route(method: Method, path: String, state: Arc<AppState>) -> Response<Full<Bytes>> {
    let is_head = method == Method::HEAD;

    if let Some(resp) = check_http_method(&method, &path) {
        return resp;
    }

    let Some(endpoint) = match_endpoint(&path) else {
        logger::log_request_error(&path, "File not found");
        return http::build_404_response(is_head);
    };

    let result = match endpoint {
        Endpoint::Index => static_page::serve_index(&state).await,
        Endpoint::FileList => listing::serve_file_list(&state).await,
        Endpoint::FileContent(raw_name) => content::serve_script(&state, raw_name).await,
    };

    into_response(result, &path, endpoint.is_api(), is_head)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, path: &str) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            Some(http::build_405_response())
        }
    }
}

/// Turn a handler result into the wire response, logging failures
fn into_response(
    result: HandlerResult,
    path: &str,
    cors: bool,
    is_head: bool,
) -> Response<Full<Bytes>> {
    match result {
        Ok(payload) => {
            http::build_response(StatusCode::OK, payload.content_type, payload.body, cors, is_head)
        }
        Err(err) => {
            logger::log_request_error(path, err.message());
            http::build_error_response(err.status(), err.message(), cors, is_head)
        }
    }
}
