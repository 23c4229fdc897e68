//! Script content handler
//!
//! The requested name comes straight from the URL, so it goes through three gates before
//! any bytes are read:
//! 1. percent-decoding to UTF-8,
//! 2. a character denylist (extension, separators, `..`, NUL),
//! 3. canonicalization with a containment check against the working directory.

use crate::config::AppState;
use crate::handler::error::{HandlerError, HandlerResult, Payload};
use crate::http::CONTENT_TYPE_TEXT;
use crate::logger;
use percent_encoding::percent_decode_str;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

const INVALID_FILENAME: &str = "Invalid filename";

fn invalid_filename() -> HandlerError {
    HandlerError::InvalidInput(INVALID_FILENAME.to_string())
}

/// Percent-decode the URL tail. `+` is kept as is.
pub fn decode_filename(raw: &str) -> Result<String, HandlerError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .map_err(|_| invalid_filename())
}

/// Reject names that could leave the working directory or are not scripts
///
/// Runs on the decoded name, so `%2F` and `%5C` are caught as separators.
pub fn validate_filename(name: &str, extension: &str) -> Result<(), HandlerError> {
    let safe = name.ends_with(extension)
        && !name.contains(['/', '\\', '\0'])
        && !name.contains("..");

    if safe {
        Ok(())
    } else {
        Err(invalid_filename())
    }
}

/// Locate `name` inside `root` and return its canonical path
pub async fn resolve_script(root: &Path, name: &str) -> Result<PathBuf, HandlerError> {
    let not_found = || HandlerError::NotFound(format!("File {name} not found"));
    let path = root.join(name);

    // Regular-file test; a stat failure counts as absent
    let is_file = fs::metadata(&path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(not_found());
    }

    let canonical_root = fs::canonicalize(root)
        .await
        .map_err(|e| HandlerError::Io(format!("Error resolving working directory: {e}")))?;
    let canonical = fs::canonicalize(&path).await.map_err(|_| not_found())?;

    if !canonical.starts_with(&canonical_root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {name} -> {}",
            canonical.display()
        ));
        return Err(invalid_filename());
    }

    Ok(canonical)
}

/// `GET /api/file/<name>`
pub async fn serve_script(state: &AppState, raw_name: &str) -> HandlerResult {
    let name = decode_filename(raw_name)?;
    validate_filename(&name, state.script_extension())?;

    let path = resolve_script(state.root_dir(), &name).await?;
    let content = match fs::read_to_string(&path).await {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(HandlerError::NotFound(format!("File {name} not found")));
        }
        Err(e) => return Err(HandlerError::Io(format!("Error reading file: {e}"))),
    };

    logger::log_file_served(&name, content.chars().count());
    Ok(Payload::new(CONTENT_TYPE_TEXT, content))
}
