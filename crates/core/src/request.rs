//! Translation and language-check request shapes.
//!
//! Validation happens here so that an oversized or malformed input is
//! rejected before any call reaches the network.

use crate::config::LanguageCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};

/// Largest serialized input, in UTF-8 bytes, the service accepts.
pub const MAX_INPUT_BYTES: usize = 100_000;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    #[default]
    Text,
    Html,
    Json,
}

impl InputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Text => "text",
            InputFormat::Html => "html",
            InputFormat::Json => "json",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputFormat {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(InputFormat::Text),
            "html" => Ok(InputFormat::Html),
            "json" => Ok(InputFormat::Json),
            other => Err(RequestError::UnknownInputFormat(other.to_owned())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum TranslationMode {
    #[default]
    #[serde(rename = "real-time")]
    RealTime,
    #[serde(rename = "batch")]
    Batch,
}

impl TranslationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationMode::RealTime => "real-time",
            TranslationMode::Batch => "batch",
        }
    }
}

impl fmt::Display for TranslationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranslationMode {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "real-time" => Ok(TranslationMode::RealTime),
            "batch" => Ok(TranslationMode::Batch),
            other => Err(RequestError::UnknownMode(other.to_owned())),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Input content exceeds {limit} bytes limit ({size} bytes)")]
    InputTooLarge { size: usize, limit: usize },
    #[error("Invalid JSON input: {0}")]
    InvalidJson(String),
    #[error("unknown input format: {0}")]
    UnknownInputFormat(String),
    #[error("input format {0} is not supported for language detection")]
    UnsupportedDetectFormat(InputFormat),
    #[error("unknown translation mode: {0}")]
    UnknownMode(String),
}

/// Validated input for one translation.
#[derive(Clone, Debug, PartialEq)]
pub struct TranslationRequest {
    pub input: Value,
    pub input_format: InputFormat,
    pub target_language: LanguageCode,
    pub source_language: Option<LanguageCode>,
    pub mode: TranslationMode,
}

impl TranslationRequest {
    /// Validates `raw` against the size limit and shapes it for `input_format`.
    pub fn new(
        raw: &Value,
        input_format: InputFormat,
        target_language: LanguageCode,
        source_language: Option<LanguageCode>,
        mode: TranslationMode,
    ) -> Result<Self, RequestError> {
        Ok(Self {
            input: prepare_input(raw, input_format)?,
            input_format,
            target_language,
            source_language,
            mode,
        })
    }

    pub fn into_body(self) -> TranslateBody {
        TranslateBody {
            input: self.input,
            input_format: self.input_format,
            target_language: self.target_language.0,
            source_language: self.source_language.map(|c| c.0),
            mode: self.mode,
        }
    }
}

/// Wire body of `POST /translate`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TranslateBody {
    pub input: Value,
    pub input_format: InputFormat,
    pub target_language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
    pub mode: TranslationMode,
}

/// Wire body of `POST /checklanguage`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CheckLanguageRequest {
    pub input: String,
    pub input_format: InputFormat,
}

impl CheckLanguageRequest {
    pub fn new(input: String, input_format: InputFormat) -> Result<Self, RequestError> {
        if input_format == InputFormat::Json {
            return Err(RequestError::UnsupportedDetectFormat(input_format));
        }
        Ok(Self {
            input,
            input_format,
        })
    }
}

/// Checks the byte limit on the serialized form of `raw` and converts it to
/// what the service expects for `format`.
///
/// JSON mode parses string input and passes structured input through; the
/// other modes send non-string input as its JSON text.
pub fn prepare_input(raw: &Value, format: InputFormat) -> Result<Value, RequestError> {
    let serialized = match raw {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };

    let size = serialized.len();
    if size > MAX_INPUT_BYTES {
        return Err(RequestError::InputTooLarge {
            size,
            limit: MAX_INPUT_BYTES,
        });
    }

    match (format, raw) {
        (InputFormat::Json, Value::String(s)) => {
            serde_json::from_str(s).map_err(|e| RequestError::InvalidJson(e.to_string()))
        }
        (InputFormat::Json, other) => Ok(other.clone()),
        (_, Value::String(_)) => Ok(raw.clone()),
        (_, _) => Ok(Value::String(serialized)),
    }
}
