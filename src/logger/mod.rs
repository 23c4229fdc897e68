//! Logger module
//!
//! Provides logging utilities for the script server:
//! - Server lifecycle logging (startup banner, shutdown)
//! - Access logging, one timestamped line per handled request
//! - Error and warning logging
//!
//! Everything goes to stdout so that request lines and the errors they caused stay
//! interleaved in one stream.

mod format;

pub use format::{version_label, AccessLogEntry};

use std::net::SocketAddr;
use std::path::Path;

fn write_info(message: &str) {
    println!("{message}");
}

fn timestamp() -> String {
    chrono::Local::now().format("%d/%b/%Y %H:%M:%S").to_string()
}

pub fn log_server_start(addr: &SocketAddr, root_dir: &Path, extension: &str, script_count: usize) {
    write_info("======================================");
    write_info("Script Reader Server");
    write_info(&format!("Serving files from: {}", root_dir.display()));
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Server running at: http://localhost:{}", addr.port()));
    write_info(&format!("Found {extension} files: {script_count}"));
    write_info("Press Ctrl+C to stop the server");
    write_info("======================================\n");
}

pub fn log_invalid_port(raw: &str, default_port: u16) {
    write_info(&format!(
        "[WARN] Invalid port number '{raw}'. Using default port {default_port}."
    ));
}

pub fn log_shutdown() {
    write_info(&format!("\n[{}] Server stopped by user", timestamp()));
}

pub fn log_signal(name: &str) {
    write_info(&format!("\n[SIGNAL] {name} received, shutting down..."));
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    write_info(&format!("[{}] [ERROR] Failed to serve connection: {err}", timestamp()));
}

pub fn log_error(message: &str) {
    write_info(&format!("[{}] [ERROR] {message}", timestamp()));
}

/// Error raised while handling a specific request path
pub fn log_request_error(path: &str, message: &str) {
    log_error(&format!("Error handling request {path}: {message}"));
}

pub fn log_warning(message: &str) {
    write_info(&format!("[{}] [WARN] {message}", timestamp()));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry) {
    write_info(&entry.format());
}

pub fn log_file_list_served(count: usize) {
    write_info(&format!("[{}] Served file list: {count} files found", timestamp()));
}

pub fn log_file_served(name: &str, characters: usize) {
    write_info(&format!(
        "[{}] Served file: {name} ({characters} characters)",
        timestamp()
    ));
}
