//! Landing page handler

use crate::config::AppState;
use crate::handler::error::{HandlerError, HandlerResult, Payload};
use crate::http::CONTENT_TYPE_HTML;
use std::io::ErrorKind;
use tokio::fs;

/// Read the landing page from the working directory on every request
pub async fn serve_index(state: &AppState) -> HandlerResult {
    let name = state.index_file();
    let path = state.root_dir().join(name);

    match fs::read_to_string(&path).await {
        Ok(content) => Ok(Payload::new(CONTENT_TYPE_HTML, content)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(HandlerError::NotFound(format!("File {name} not found")))
        }
        Err(e) => Err(HandlerError::Io(format!("Error reading file: {e}"))),
    }
}
