use seed::{prelude::*, *};
use shared::{AutocompleteResponse, RecommendParams, RecommendResponse, SuggestionItem};
use thiserror::Error;

const DEFAULT_API_ROOT: &str = "http://127.0.0.1:5000";

pub fn api_root() -> String {
    normalize_root(option_env!("FRONTEND_API_ROOT").unwrap_or(DEFAULT_API_ROOT))
}

fn normalize_root(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request url: {0}")]
    Request(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<fetch::FetchError> for ApiError {
    fn from(err: fetch::FetchError) -> Self {
        match err {
            fetch::FetchError::StatusError(status) => ApiError::Status(status.code),
            fetch::FetchError::SerdeError(err) => ApiError::Decode(err.to_string()),
            other => ApiError::Transport(format!("{other:?}")),
        }
    }
}

pub async fn autocomplete(query: String) -> Result<Vec<SuggestionItem>, ApiError> {
    let url = shared::autocomplete_url(&api_root(), &query)?;
    let body: AutocompleteResponse = get_json(url.as_str()).await?;
    Ok(body.results)
}

/// An `error` field in the body is not a failure: the lists still default to empty.
pub async fn recommend(params: RecommendParams) -> Result<RecommendResponse, ApiError> {
    let url = params.url(&api_root())?;
    web_sys::console::debug_1(&format!("[frontend] GET {url}").into());
    let body: RecommendResponse = get_json(url.as_str()).await?;
    if let Some(note) = backend_note(&body) {
        web_sys::console::error_1(&format!("[frontend] recommend backend error: {note}").into());
    }
    Ok(body)
}

/// The backend's `error` message, when it sent a non-blank one.
pub fn backend_note(body: &RecommendResponse) -> Option<&str> {
    body.error
        .as_deref()
        .map(str::trim)
        .filter(|note| !note.is_empty())
}

async fn get_json<T: serde::de::DeserializeOwned + 'static>(url: &str) -> Result<T, ApiError> {
    let response = Request::new(url)
        .method(Method::Get)
        .fetch()
        .await?
        .check_status()?;
    Ok(response.json::<T>().await?)
}
