use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::response::ApiError;

pub struct StaticFile {
    pub content_type: Option<String>,
    pub contents: Vec<u8>,
}

/// Map a request path to a file inside the document root.
///
/// `/` (and the empty path) means `/index.html`. Returns None for paths
/// trying to get out of the root.
pub fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let request_path = match request_path {
        "" | "/" => "/index.html",
        p => p,
    };
    let mut res = root.to_path_buf();
    for segment in request_path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.contains('\\') => return None,
            s => res.push(s),
        }
    }
    Some(res)
}

pub async fn read(root: &Path, request_path: &str) -> Result<StaticFile, ApiError> {
    let path = resolve(root, request_path).ok_or(ApiError::StaticFileNotFound)?;
    debug!(request_path, path = %path.display(), "sending static file");
    let contents = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => ApiError::StaticFileNotFound,
        _ => ApiError::StaticFileRead(e),
    })?;
    Ok(StaticFile {
        content_type: content_type(&path),
        contents,
    })
}

fn content_type(path: &Path) -> Option<String> {
    let mime = mime_guess::from_path(path).first()?;
    // Text files are served as UTF-8
    if mime.type_() == mime_guess::mime::TEXT {
        Some(format!("{mime};charset=UTF-8"))
    } else {
        Some(mime.to_string())
    }
}
