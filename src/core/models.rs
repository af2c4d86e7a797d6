//! Request and response records for Transfluent operations

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Translation level accepted by translate operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranslationLevel {
    #[default]
    #[serde(rename = "translation")]
    Translation,
    #[serde(rename = "translation+proof-reading")]
    TranslationAndProofReading,
    #[serde(rename = "expert")]
    Expert,
    #[serde(rename = "expert+review")]
    ExpertAndReview,
    #[serde(rename = "machine")]
    Machine,
    /// Prior-generation level
    #[serde(rename = "economy")]
    Economy,
    /// Prior-generation level
    #[serde(rename = "business")]
    Business,
}

impl TranslationLevel {
    pub const ALL: [TranslationLevel; 7] = [
        TranslationLevel::Translation,
        TranslationLevel::TranslationAndProofReading,
        TranslationLevel::Expert,
        TranslationLevel::ExpertAndReview,
        TranslationLevel::Machine,
        TranslationLevel::Economy,
        TranslationLevel::Business,
    ];

    /// Wire value of the level
    pub fn as_str(self) -> &'static str {
        match self {
            TranslationLevel::Translation => "translation",
            TranslationLevel::TranslationAndProofReading => "translation+proof-reading",
            TranslationLevel::Expert => "expert",
            TranslationLevel::ExpertAndReview => "expert+review",
            TranslationLevel::Machine => "machine",
            TranslationLevel::Economy => "economy",
            TranslationLevel::Business => "business",
        }
    }
}

impl fmt::Display for TranslationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranslationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| format!("unknown translation level: {s}"))
    }
}

/// Uploadable file format: server-side type tag plus declared encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    MooToolsLocale,
    IosStrings,
    AndroidStrings,
    AndroidArrays,
    Json,
    Yaml,
}

impl FileFormat {
    pub const ALL: [FileFormat; 6] = [
        FileFormat::MooToolsLocale,
        FileFormat::IosStrings,
        FileFormat::AndroidStrings,
        FileFormat::AndroidArrays,
        FileFormat::Json,
        FileFormat::Yaml,
    ];

    /// Type tag sent as `type`
    pub fn type_tag(self) -> &'static str {
        match self {
            FileFormat::MooToolsLocale => "MooTools-locale",
            FileFormat::IosStrings => "iOS-strings",
            FileFormat::AndroidStrings => "Android-strings",
            FileFormat::AndroidArrays => "Android-arrays",
            FileFormat::Json => "json-file",
            FileFormat::Yaml => "YAML-file",
        }
    }

    /// Encoding sent as `format`
    pub fn encoding(self) -> &'static str {
        match self {
            FileFormat::IosStrings => "UTF-16",
            _ => "UTF-8",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_tag())
    }
}

impl FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.type_tag().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown file format: {s}"))
    }
}

/// Translation status of a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStatus {
    /// Completion percentage, e.g. `"42%"`
    pub progress: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of a completion check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileCompletion {
    Complete,
    /// Not complete; carries the raw percentage string
    InProgress(String),
}

impl FileCompletion {
    /// Classify a progress string; only `100%` counts as complete
    pub fn from_progress(progress: &str) -> Self {
        if progress == "100%" {
            FileCompletion::Complete
        } else {
            FileCompletion::InProgress(progress.to_string())
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, FileCompletion::Complete)
    }
}

/// Response to a file save or translation order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordCountResponse {
    pub word_count: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of a file translation order
#[derive(Debug, Clone, PartialEq)]
pub enum FileTranslateOutcome {
    Ordered(WordCountResponse),
    /// Text acknowledgment returned when a `processing` event callback was requested
    ProcessingAcknowledged(String),
}

/// Reference to a previously saved text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRef {
    pub id: String,
}

impl TextRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Arguments of a file translation order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileTranslateRequest {
    pub identifier: String,
    pub language: String,
    pub target_languages: Vec<String>,
    pub comment: String,
    pub callback_url: String,
    pub level: TranslationLevel,
    /// Event name to callback URL, e.g. `processing`
    pub callbacks: Option<BTreeMap<String, String>>,
    /// Local file to refresh the master content from before translating
    pub file_to_upload: Option<PathBuf>,
}

impl FileTranslateRequest {
    pub fn new(
        identifier: impl Into<String>,
        language: impl Into<String>,
        target_languages: Vec<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            language: language.into(),
            target_languages,
            ..Default::default()
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = url.into();
        self
    }

    pub fn with_level(mut self, level: TranslationLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_event_callback(mut self, event: impl Into<String>, url: impl Into<String>) -> Self {
        self.callbacks
            .get_or_insert_with(BTreeMap::new)
            .insert(event.into(), url.into());
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_to_upload = Some(path.into());
        self
    }

    /// True when a `processing` event callback is registered
    pub fn requests_processing_callback(&self) -> bool {
        self.callbacks
            .as_ref()
            .is_some_and(|c| c.contains_key("processing"))
    }
}

/// Arguments of a text translation order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextsTranslateRequest {
    pub group_id: Option<String>,
    pub language: String,
    pub texts: Vec<TextRef>,
    pub target_languages: Vec<String>,
    pub level: TranslationLevel,
    pub comment: String,
    pub callback_url: Option<String>,
}

impl TextsTranslateRequest {
    pub fn new(language: impl Into<String>, texts: Vec<TextRef>, target_languages: Vec<String>) -> Self {
        Self {
            language: language.into(),
            texts,
            target_languages,
            ..Default::default()
        }
    }

    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn with_level(mut self, level: TranslationLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }
}
