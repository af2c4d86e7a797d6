//! Response envelope decoding
//!
//! Each protocol generation wraps its payload differently. [`Envelope`] names
//! the three shapes and [`Envelope::decode`] turns a raw response into either
//! the unwrapped payload or a typed error.

use serde_json::Value;
use tracing::warn;

use crate::core::endpoint::{Generation, OperationDescriptor};
use crate::core::errors::{Result, TransfluentError};
use crate::core::transport::RawResponse;

/// Response shape of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// `{status: "OK"|"ERROR", response: ..., error: {type, message}}` (legacy and v2)
    Status,
    /// Body is the payload on 200, `{type, message}` otherwise (v3)
    HttpStatus,
    /// Body is the file content, no JSON involved
    RawFile,
}

/// Decoded result of an operation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Json(Value),
    File(Vec<u8>),
}

impl Outcome {
    /// JSON payload; a raw file is an unexpected response here
    pub fn into_json(self) -> Result<Value> {
        match self {
            Outcome::Json(value) => Ok(value),
            Outcome::File(bytes) => Err(TransfluentError::unexpected(
                String::from_utf8_lossy(&bytes).into_owned(),
            )),
        }
    }

    /// Raw bytes; JSON payloads are serialized back to text
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Outcome::File(bytes) => bytes,
            Outcome::Json(value) => value.to_string().into_bytes(),
        }
    }
}

impl Envelope {
    /// Envelope used by a protocol generation
    pub fn for_generation(generation: Generation) -> Self {
        match generation {
            Generation::Legacy | Generation::V2 => Envelope::Status,
            Generation::V3 => Envelope::HttpStatus,
        }
    }

    /// Envelope for a descriptor, raw for the file download
    pub fn for_operation(descriptor: &OperationDescriptor) -> Self {
        if descriptor.is_file_download() {
            Envelope::RawFile
        } else {
            Self::for_generation(descriptor.generation)
        }
    }

    /// Interpret a raw response under this envelope
    pub fn decode(self, response: RawResponse) -> Result<Outcome> {
        match self {
            Envelope::RawFile => decode_file(response).map(Outcome::File),
            Envelope::HttpStatus => decode_http_status(response).map(Outcome::Json),
            Envelope::Status => decode_status(response).map(Outcome::Json),
        }
    }
}

fn decode_file(response: RawResponse) -> Result<Vec<u8>> {
    if response.status != 200 {
        return Err(TransfluentError::FileRetrieval {
            body: response.body_text(),
        });
    }
    Ok(response.body)
}

fn parse_json(response: &RawResponse) -> Result<Value> {
    serde_json::from_slice(&response.body).map_err(|_| TransfluentError::Parse {
        body: response.body_text(),
    })
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn decode_http_status(response: RawResponse) -> Result<Value> {
    let value = parse_json(&response)?;
    if response.status == 200 {
        return Ok(value);
    }

    let Some(kind) = text_field(&value, "type") else {
        return Err(TransfluentError::unexpected(response.body_text()));
    };
    let message = text_field(&value, "message").unwrap_or_default();

    warn!(status = response.status, kind = %kind, "API returned an error");
    Err(TransfluentError::Api {
        kind,
        message,
        description: None,
    })
}

fn decode_status(response: RawResponse) -> Result<Value> {
    let mut value = parse_json(&response)?;

    match value.get("status").and_then(Value::as_str) {
        Some("OK") => Ok(value
            .get_mut("response")
            .map(Value::take)
            .unwrap_or(Value::Null)),
        Some("ERROR") => {
            let Some(error) = find_error(&value) else {
                return Err(TransfluentError::unexpected(response.body_text()));
            };
            let kind = text_field(error, "type").unwrap_or_default();
            let message = text_field(error, "message").unwrap_or_default();
            let description = match value.get("response") {
                None | Some(Value::Null) | Some(Value::Object(_)) => None,
                Some(Value::String(s)) if s.is_empty() => None,
                Some(Value::String(s)) => Some(s.clone()),
                Some(other) => Some(other.to_string()),
            };

            warn!(status = response.status, kind = %kind, "API returned an error envelope");
            Err(TransfluentError::Api {
                kind,
                message,
                description,
            })
        }
        _ => Err(TransfluentError::unexpected(response.body_text())),
    }
}

/// Error details live under `error` or, in some responses, `response.error`
fn find_error(value: &Value) -> Option<&Value> {
    value
        .get("error")
        .filter(|e| e.is_object())
        .or_else(|| {
            value
                .get("response")
                .and_then(|r| r.get("error"))
                .filter(|e| e.is_object())
        })
}
