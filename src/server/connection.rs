// Connection handling module
// Serves one accepted TCP connection on its own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::error::Elapsed;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Handle a single connection in a spawned task.
///
/// This function:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Configures HTTP/1.1 keep-alive and the header read timeout
/// 3. Serves the connection with the request handler
/// 4. Bounds the whole connection with the configured timeout
///
/// Connections share nothing but the read-only `AppState`.
pub fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let timeout_duration = state.config.connection_timeout();

        let mut builder = http1::Builder::new();
        builder
            .keep_alive(state.config.performance.keep_alive)
            .timer(TokioTimer::new())
            .header_read_timeout(Duration::from_secs(state.config.performance.read_timeout));

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&state), peer_addr)),
        );

        let outcome = tokio::time::timeout(timeout_duration, conn).await;
        if let Some(message) = describe_close(&outcome) {
            logger::log_connection_error(&format!("{peer_addr}: {message}"));
        }
    });
}

/// What is worth logging about how a connection ended
///
/// Timeouts are the normal end of an idle keep-alive connection and stay silent.
fn describe_close(outcome: &Result<Result<(), hyper::Error>, Elapsed>) -> Option<String> {
    match outcome {
        Ok(Ok(())) | Err(_) => None,
        Ok(Err(err)) if err.is_timeout() || err.is_incomplete_message() => None,
        Ok(Err(err)) => Some(err.to_string()),
    }
}
