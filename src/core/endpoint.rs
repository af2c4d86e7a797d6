//! Operation catalogue and URL resolution

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::core::config::Endpoints;

/// A capitalized word: one uppercase letter followed by lowercase letters or digits
static WORD_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][a-z0-9]+").expect("static regex"));

/// API protocol generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Generation {
    /// Unversioned protocol: form-encoded POST bodies, status envelope
    Legacy,
    /// `/v2/` protocol: JSON bodies, status envelope
    V2,
    /// Current protocol: JSON bodies, HTTP status is authoritative
    V3,
}

impl Generation {
    /// Legacy and v2 paths end with a separator
    pub fn has_trailing_separator(self) -> bool {
        !matches!(self, Generation::V3)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Generation::Legacy => write!(f, "legacy"),
            Generation::V2 => write!(f, "v2"),
            Generation::V3 => write!(f, "v3"),
        }
    }
}

/// HTTP verb requested for an operation
///
/// Only GET and POST are supported by the transport; the others exist so that
/// descriptors can name them and be rejected explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
}

impl HttpMethod {
    /// Upper-case verb as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote operations known to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Authenticate,
    Languages,
    CreateAccount,
    FileStatus,
    FileRead,
    FileSave,
    FileTranslate,
    Texts,
    TextsTranslate,
    Text,
    TextStatus,
}

impl Operation {
    /// Logical name in capitalized-word form
    pub fn name(self) -> &'static str {
        match self {
            Operation::Authenticate => "Authenticate",
            Operation::Languages => "Languages",
            Operation::CreateAccount => "CreateAccount",
            Operation::FileStatus => "FileStatus",
            Operation::FileRead => "FileRead",
            Operation::FileSave => "FileSave",
            Operation::FileTranslate => "FileTranslate",
            Operation::Texts => "Texts",
            Operation::TextsTranslate => "TextsTranslate",
            Operation::Text => "Text",
            Operation::TextStatus => "TextStatus",
        }
    }

    /// Protocol generation the operation is served under
    pub fn generation(self) -> Generation {
        match self {
            Operation::Authenticate | Operation::Languages => Generation::V3,
            _ => Generation::V2,
        }
    }

    /// HTTP verb used for the operation
    pub fn method(self) -> HttpMethod {
        match self {
            Operation::Authenticate
            | Operation::CreateAccount
            | Operation::FileSave
            | Operation::FileTranslate
            | Operation::Texts
            | Operation::TextsTranslate => HttpMethod::POST,
            Operation::Languages
            | Operation::FileStatus
            | Operation::FileRead
            | Operation::Text
            | Operation::TextStatus => HttpMethod::GET,
        }
    }

    /// Whether a token is merged into the payload
    pub fn requires_token(self) -> bool {
        !matches!(
            self,
            Operation::Authenticate | Operation::Languages | Operation::CreateAccount
        )
    }

    /// Descriptor the client resolves and dispatches
    pub fn descriptor(self) -> OperationDescriptor {
        OperationDescriptor {
            name: self.name().to_string(),
            method: self.method(),
            generation: self.generation(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One logical remote call: name, verb and protocol generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    pub name: String,
    pub method: HttpMethod,
    pub generation: Generation,
}

impl OperationDescriptor {
    /// Descriptor for an endpoint outside the catalogue
    pub fn new(name: impl Into<String>, method: HttpMethod, generation: Generation) -> Self {
        Self {
            name: name.into(),
            method,
            generation,
        }
    }

    /// The file download answers with raw bytes instead of an envelope
    pub fn is_file_download(&self) -> bool {
        self.name == Operation::FileRead.name()
    }

    /// Relative path derived from the name
    pub fn path(&self) -> String {
        uri_from_operation(&self.name, self.generation)
    }

    /// Absolute URL for this operation against the given base URLs
    pub fn url(&self, endpoints: &Endpoints) -> String {
        format!("{}{}", endpoints.base_for(self.generation), self.path())
    }
}

/// Derive the URI path of an operation, e.g. `FileTranslate` -> `file/translate/`
pub fn uri_from_operation(name: &str, generation: Generation) -> String {
    let path = WORD_BOUNDARY
        .replace_all(name, |caps: &Captures| {
            let word = &caps[0];
            match caps.get(0) {
                Some(m) if m.start() > 0 => format!("/{word}"),
                _ => word.to_string(),
            }
        })
        .to_lowercase();

    if generation.has_trailing_separator() {
        format!("{path}/")
    } else {
        path
    }
}
