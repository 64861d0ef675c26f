mod http;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::request::{CheckLanguageRequest, TranslateBody};

pub use http::HttpFluentCClient;

pub const CHECK_LANGUAGE_PATH: &str = "checklanguage";
pub const LANGUAGES_PATH: &str = "languages";
pub const TRANSLATE_PATH: &str = "translate";
pub const RESULTS_PATH: &str = "results";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Language {
    pub code: String,
    pub name: String,
}

/// Body of `GET /languages`.
///
/// Entries are kept as the server sent them; [`LanguagesResponse::supported`]
/// gives the typed view the language pickers need.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct LanguagesResponse {
    pub supported_languages: Vec<Value>,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub source_languages: Value,
}

impl LanguagesResponse {
    /// A body without a `supported_languages` array is invalid.
    pub fn from_value(mut body: Value) -> Result<Self, ApiError> {
        let supported_languages = match body.get_mut("supported_languages").map(Value::take) {
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(ApiError::InvalidResponse(
                    "supported_languages is not an array".into(),
                ))
            }
            None => {
                return Err(ApiError::InvalidResponse(
                    "missing supported_languages".into(),
                ))
            }
        };
        let source_languages = body
            .get_mut("source_languages")
            .map(Value::take)
            .unwrap_or(Value::Null);

        Ok(Self {
            supported_languages,
            source_languages,
        })
    }

    pub fn supported(&self) -> Result<Vec<Language>, ApiError> {
        self.supported_languages
            .iter()
            .map(|entry| {
                Language::deserialize(entry)
                    .map_err(|e| ApiError::InvalidResponse(format!("bad language entry: {e}")))
            })
            .collect()
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct JobResultsRequest {
    pub job_id: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("http error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Calls against the FluentC AI agent endpoints.
///
/// Every method is a single request; nothing is retried here.
pub trait FluentCApi: Send + Sync {
    fn check_language(
        &self,
        request: CheckLanguageRequest,
    ) -> BoxFuture<'_, Result<Value, ApiError>>;

    fn languages(&self) -> BoxFuture<'_, Result<LanguagesResponse, ApiError>>;

    fn translate(&self, body: TranslateBody) -> BoxFuture<'_, Result<Value, ApiError>>;

    fn job_results(&self, job_id: String) -> BoxFuture<'_, Result<Value, ApiError>>;
}
