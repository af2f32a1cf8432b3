use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{debug, info};

use httpspell_core::{
    run_batch, tokenize, DictionaryBuilder, DictionaryCache, HunspellBuilder, Mode, WordResult,
};

use crate::request::SpellParams;
use crate::response::{ApiError, ResultPayload};
use crate::static_files;
use crate::Config;

pub struct AppState<B: DictionaryBuilder> {
    pub cache: DictionaryCache<B>,
    pub config: Arc<Config>,
}

impl<B: DictionaryBuilder> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<B: DictionaryBuilder> AppState<B> {
    pub fn new(builder: B, config: Config) -> Self {
        let cache = DictionaryCache::new(builder, config.cache_options());
        Self {
            cache,
            config: Arc::new(config),
        }
    }

    /// Load the dictionary for `lang` (or the default one), then check
    /// every word of `text`
    pub async fn spell(
        &self,
        lang: Option<&str>,
        text: &str,
        mode: Mode,
    ) -> Result<Vec<WordResult>, ApiError> {
        let lang = lang.unwrap_or(self.config.dict.lang.as_str());
        let dict = self.cache.load(lang).await?;
        let words = tokenize(text);
        let results = run_batch(dict, words, mode, self.config.batch_options()).await?;
        Ok(results)
    }
}

pub fn router<B: DictionaryBuilder>(state: AppState<B>) -> Router {
    Router::new()
        .route("/check", get(check::<B>).post(check::<B>))
        .route("/suggest", get(suggest::<B>).post(suggest::<B>))
        .fallback(static_file::<B>)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn check<B: DictionaryBuilder>(
    State(state): State<AppState<B>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ResultPayload, ApiError> {
    let query = SpellParams::from_query(uri.query());
    handle(state, query, &headers, &body, Mode::Check).await
}

async fn suggest<B: DictionaryBuilder>(
    State(state): State<AppState<B>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ResultPayload, ApiError> {
    let query = SpellParams::from_query(uri.query());
    handle(state, query, &headers, &body, Mode::Suggest).await
}

async fn handle<B: DictionaryBuilder>(
    state: AppState<B>,
    query: SpellParams,
    headers: &HeaderMap,
    body: &[u8],
    mode: Mode,
) -> Result<ResultPayload, ApiError> {
    let params = query.or(SpellParams::from_body(headers, body));
    let lang = params.lang_or(&state.config.dict.lang);
    let result = state.spell(Some(lang), params.text(), mode).await?;
    debug!(lang, ?mode, words = result.len(), "sending result");
    Ok(ResultPayload { result })
}

async fn static_file<B: DictionaryBuilder>(
    State(state): State<AppState<B>>,
    uri: Uri,
) -> Response {
    match static_files::read(&state.config.http.root, uri.path()).await {
        Ok(file) => {
            let mut response = Response::new(Body::from(file.contents));
            let content_type = file
                .content_type
                .and_then(|c| header::HeaderValue::from_str(&c).ok());
            if let Some(content_type) = content_type {
                response.headers_mut().insert(header::CONTENT_TYPE, content_type);
            }
            response
        }
        Err(e) => e.into_response(),
    }
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    debug!(%method, %uri, ">>>");
    let response = next.run(request).await;
    let status: StatusCode = response.status();
    info!(%method, path = uri.path(), status = status.as_u16(), "request handled");
    response
}

pub async fn serve(config: Config) -> Result<()> {
    let address = config.bind_address();
    let state = AppState::new(HunspellBuilder, config);
    let app = router(state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Could not listen on {address}"))?;
    let local_address = listener
        .local_addr()
        .context("Could not get listening address")?;
    info!(address = %local_address, "httpspell listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    // If the handler cannot be installed, run until killed
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
