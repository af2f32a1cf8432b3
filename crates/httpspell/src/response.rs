use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use httpspell_core::{BatchError, LoadError, WordResult};

#[derive(Serialize, Debug)]
pub struct ResultPayload {
    pub result: Vec<WordResult>,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct Cause {
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct ErrorBody {
    pub status: u16,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<Cause>,
}

#[derive(Serialize, Debug)]
struct ErrorPayload {
    error: ErrorBody,
}

/// Everything that can go wrong while answering a request
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("DICTIONARY LOAD ERROR: {0}")]
    DictionaryLoad(#[from] LoadError),

    #[error("BATCH TIMEOUT: {0}")]
    Batch(#[from] BatchError),

    #[error("FILE NOT FOUND")]
    StaticFileNotFound,

    #[error("FILE READ ERROR: {0}")]
    StaticFileRead(#[source] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::DictionaryLoad(_) => StatusCode::BAD_REQUEST,
            ApiError::Batch(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::StaticFileNotFound => StatusCode::NOT_FOUND,
            ApiError::StaticFileRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        let status = self.status().as_u16();
        match self {
            ApiError::DictionaryLoad(e) => ErrorBody {
                status,
                message: "DICTIONARY LOAD ERROR",
                cause: Some(Cause {
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                    path: e.path().map(|p| p.display().to_string()),
                }),
            },
            ApiError::Batch(e) => ErrorBody {
                status,
                message: "BATCH TIMEOUT",
                cause: Some(Cause {
                    kind: "Timeout".to_string(),
                    message: e.to_string(),
                    path: None,
                }),
            },
            ApiError::StaticFileNotFound => ErrorBody {
                status,
                message: "FILE NOT FOUND",
                cause: None,
            },
            ApiError::StaticFileRead(e) => ErrorBody {
                status,
                message: "FILE READ ERROR",
                cause: Some(Cause {
                    kind: format!("{:?}", e.kind()),
                    message: e.to_string(),
                    path: None,
                }),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = ErrorPayload { error: self.body() };
        (self.status(), json_headers(), Json(payload)).into_response()
    }
}

impl IntoResponse for ResultPayload {
    fn into_response(self) -> Response {
        (StatusCode::OK, json_headers(), Json(self)).into_response()
    }
}

fn json_headers() -> [(header::HeaderName, &'static str); 1] {
    [(header::CONTENT_TYPE, "application/json;charset=UTF-8")]
}
