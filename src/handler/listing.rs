//! Script listing handler
//!
//! Scans the working directory on every call; nothing is cached between requests.

use crate::config::AppState;
use crate::handler::error::{HandlerError, HandlerResult, Payload};
use crate::http::CONTENT_TYPE_JSON;
use crate::logger;
use std::path::Path;
use tokio::fs;

/// Names of regular files directly in `dir` ending with `extension`, sorted ascending
///
/// Symlinks are followed, so a link to a regular file is listed. Entries that cannot be
/// stat'ed are skipped.
pub async fn list_scripts(dir: &Path, extension: &str) -> Result<Vec<String>, HandlerError> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| HandlerError::Io(format!("Error getting file list: {e}")))?;

    let mut names = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => return Err(HandlerError::Io(format!("Error getting file list: {e}"))),
        };

        let Ok(name) = entry.file_name().into_string() else {
            logger::log_warning(&format!(
                "Skipping non UTF-8 file name: {}",
                entry.path().display()
            ));
            continue;
        };
        if !name.ends_with(extension) {
            continue;
        }

        let is_file = fs::metadata(entry.path())
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if is_file {
            names.push(name);
        }
    }

    names.sort_unstable();
    Ok(names)
}

/// `GET /api/files`
pub async fn serve_file_list(state: &AppState) -> HandlerResult {
    let names = list_scripts(state.root_dir(), state.script_extension()).await?;
    let json = serde_json::to_string(&names)
        .map_err(|e| HandlerError::Internal(format!("Error getting file list: {e}")))?;

    logger::log_file_list_served(names.len());
    Ok(Payload::new(CONTENT_TYPE_JSON, json))
}
