use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use serde::Deserialize;
use tracing::debug;

/// The `lang` and `text` of a check or suggest request, taken from the
/// query string or from the body
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct SpellParams {
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl SpellParams {
    /// Parse the query string of the request URI. A query that cannot be
    /// parsed (bad encoding, repeated key) counts as empty.
    pub fn from_query(query: Option<&str>) -> Self {
        let Some(query) = query else {
            return Self::default();
        };
        serde_urlencoded::from_str::<SpellParams>(query).unwrap_or_else(|e| {
            debug!(query, error = %e, "ignoring malformed query string");
            Self::default()
        })
    }

    /// Parse the body according to its content type. Anything that cannot be
    /// parsed counts as an empty body.
    pub fn from_body(headers: &HeaderMap, body: &[u8]) -> Self {
        if body.is_empty() {
            return Self::default();
        }
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        // Ignore parameters like '; charset=UTF-8'
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        let parsed = match mime.as_str() {
            "application/x-www-form-urlencoded" => {
                serde_urlencoded::from_bytes::<SpellParams>(body).map_err(|e| e.to_string())
            }
            "application/json" => {
                serde_json::from_slice::<SpellParams>(body).map_err(|e| e.to_string())
            }
            _ => return Self::default(),
        };
        parsed.unwrap_or_else(|e| {
            debug!(content_type, error = %e, "ignoring malformed request body");
            Self::default()
        })
    }

    /// Values from `self` win, missing or empty ones are taken from `fallback`
    pub fn or(self, fallback: SpellParams) -> Self {
        Self {
            lang: non_empty(self.lang).or_else(|| non_empty(fallback.lang)),
            text: non_empty(self.text).or_else(|| non_empty(fallback.text)),
        }
    }

    pub fn lang_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.lang.as_deref().unwrap_or(default)
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
