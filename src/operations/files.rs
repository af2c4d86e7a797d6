//! File operations: status, download, upload and translation orders

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

use crate::core::client::TransfluentClient;
use crate::core::endpoint::Operation;
use crate::core::errors::{Result, TransfluentError};
use crate::core::models::{
    FileCompletion, FileFormat, FileStatus, FileTranslateOutcome, FileTranslateRequest,
    WordCountResponse,
};
use crate::core::transport::Payload;
use crate::operations::is_falsy;

const PROCESSING_ACK: &str = "processing callback will be sent to";

fn file_payload(identifier: &str, language: &str) -> Payload {
    Payload::new()
        .with("identifier", identifier)
        .with("language", language)
}

async fn read_base64(path: &Path) -> Result<String> {
    if !tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file()) {
        return Err(TransfluentError::FileAccess {
            path: path.display().to_string(),
        });
    }
    let content = tokio::fs::read(path).await?;
    debug!(path = %path.display(), bytes = content.len(), "read file for upload");
    Ok(BASE64.encode(content))
}

fn word_count_response(response: Value) -> Result<WordCountResponse> {
    if is_falsy(response.get("word_count")) {
        return Err(TransfluentError::unexpected(response.to_string()));
    }
    serde_json::from_value(response.clone())
        .map_err(|_| TransfluentError::unexpected(response.to_string()))
}

impl TransfluentClient {
    /// Translation status of a file
    pub async fn file_status(&self, identifier: &str, language: &str) -> Result<FileStatus> {
        let response = self
            .call(Operation::FileStatus, file_payload(identifier, language))
            .await?;
        serde_json::from_value(response.clone())
            .map_err(|_| TransfluentError::unexpected(response.to_string()))
    }

    /// Download a translated file; the body is returned unmodified
    pub async fn file_read(&self, identifier: &str, language: &str) -> Result<Vec<u8>> {
        self.download(file_payload(identifier, language)).await
    }

    /// `Complete` when progress is exactly `100%`, otherwise the raw percentage
    pub async fn is_file_complete(&self, identifier: &str, language: &str) -> Result<FileCompletion> {
        let status = self.file_status(identifier, language).await?;
        Ok(FileCompletion::from_progress(&status.progress))
    }

    /// Upload a local file as the content of `identifier` in `language`
    ///
    /// With `translations_only` the upload only carries translations and does
    /// not replace the master file.
    pub async fn save_file(
        &self,
        identifier: &str,
        language: &str,
        format: FileFormat,
        path: impl AsRef<Path>,
        translations_only: bool,
    ) -> Result<WordCountResponse> {
        let content = read_base64(path.as_ref()).await?;

        let mut payload = file_payload(identifier, language)
            .with("format", format.encoding())
            .with("content", content)
            .with("type", format.type_tag());
        if translations_only {
            payload.insert("master", "no");
        }

        let response = self.call(Operation::FileSave, payload).await?;
        let saved = word_count_response(response)?;
        info!(identifier, language, format = %format, "File saved");
        Ok(saved)
    }

    /// Upload a MooTools locale file
    pub async fn save_mootools_locale_file(
        &self,
        identifier: &str,
        language: &str,
        path: impl AsRef<Path>,
        translations_only: bool,
    ) -> Result<WordCountResponse> {
        self.save_file(identifier, language, FileFormat::MooToolsLocale, path, translations_only)
            .await
    }

    /// Upload an iOS `.strings` file, declared as UTF-16
    pub async fn save_ios_strings_file(
        &self,
        identifier: &str,
        language: &str,
        path: impl AsRef<Path>,
        translations_only: bool,
    ) -> Result<WordCountResponse> {
        self.save_file(identifier, language, FileFormat::IosStrings, path, translations_only)
            .await
    }

    /// Upload an Android `strings.xml` resource
    pub async fn save_android_strings_file(
        &self,
        identifier: &str,
        language: &str,
        path: impl AsRef<Path>,
        translations_only: bool,
    ) -> Result<WordCountResponse> {
        self.save_file(identifier, language, FileFormat::AndroidStrings, path, translations_only)
            .await
    }

    /// Upload an Android string-array resource
    pub async fn save_android_arrays_file(
        &self,
        identifier: &str,
        language: &str,
        path: impl AsRef<Path>,
        translations_only: bool,
    ) -> Result<WordCountResponse> {
        self.save_file(identifier, language, FileFormat::AndroidArrays, path, translations_only)
            .await
    }

    /// Upload a JSON file
    pub async fn save_json_file(
        &self,
        identifier: &str,
        language: &str,
        path: impl AsRef<Path>,
        translations_only: bool,
    ) -> Result<WordCountResponse> {
        self.save_file(identifier, language, FileFormat::Json, path, translations_only)
            .await
    }

    /// Upload a YAML file
    pub async fn save_yaml_file(
        &self,
        identifier: &str,
        language: &str,
        path: impl AsRef<Path>,
        translations_only: bool,
    ) -> Result<WordCountResponse> {
        self.save_file(identifier, language, FileFormat::Yaml, path, translations_only)
            .await
    }

    /// Order translation of a saved file into the target languages
    pub async fn file_translate(&self, request: &FileTranslateRequest) -> Result<FileTranslateOutcome> {
        if request.target_languages.is_empty() {
            return Err(TransfluentError::validation(
                "Target languages MUST be provided as a non-empty list",
            ));
        }
        if request.language.trim().is_empty() {
            return Err(TransfluentError::validation("Language id MUST be provided"));
        }

        let target_languages = serde_json::to_string(&request.target_languages)
            .map_err(|e| TransfluentError::validation(e.to_string()))?;

        let mut payload = file_payload(&request.identifier, &request.language)
            .with("target_languages", target_languages)
            .with("comment", request.comment.as_str())
            .with("callback_url", request.callback_url.as_str())
            .with("level", request.level.as_str());

        if let Some(callbacks) = &request.callbacks {
            let callbacks = serde_json::to_value(callbacks)
                .map_err(|e| TransfluentError::validation(e.to_string()))?;
            payload.insert("_callbacks", callbacks);
        }

        // The upload is optional: a path that does not exist is ignored
        if let Some(path) = &request.file_to_upload {
            if tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file()) {
                payload.insert("content", read_base64(path).await?);
            }
        }

        let response = self.call(Operation::FileTranslate, payload).await?;

        if request.requests_processing_callback() {
            return match response {
                Value::String(ack) if ack.contains(PROCESSING_ACK) => {
                    Ok(FileTranslateOutcome::ProcessingAcknowledged(ack))
                }
                other => Err(TransfluentError::unexpected(other.to_string())),
            };
        }

        let ordered = word_count_response(response)?;
        info!(
            identifier = %request.identifier,
            targets = request.target_languages.len(),
            level = %request.level,
            "File translation ordered"
        );
        Ok(FileTranslateOutcome::Ordered(ordered))
    }
}
