//! Text operations: save, order translation, read back and status

use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::info;

use crate::core::client::TransfluentClient;
use crate::core::endpoint::Operation;
use crate::core::errors::{Result, TransfluentError};
use crate::core::models::TextsTranslateRequest;
use crate::core::transport::Payload;

fn text_payload(text_id: &str, language: &str, group_id: Option<&str>) -> Payload {
    Payload::new()
        .with("text_id", text_id)
        .with("language", language)
        .with_opt("group_id", group_id)
}

impl TransfluentClient {
    /// Save one or more texts, keyed by text id
    pub async fn texts(
        &self,
        group_id: Option<&str>,
        language: &str,
        texts: &BTreeMap<String, String>,
    ) -> Result<Value> {
        if texts.is_empty() {
            return Err(TransfluentError::validation(
                "Texts MUST be provided as a non-empty key-value map",
            ));
        }
        if texts.keys().any(|k| k.is_empty()) {
            return Err(TransfluentError::validation("Text ids MUST NOT be empty"));
        }

        let payload = Payload::new()
            .with("group_id", group_id.unwrap_or_default())
            .with("language", language)
            .with("texts", json!(texts));

        let response = self.call(Operation::Texts, payload).await?;
        info!(language, count = texts.len(), "Texts saved");
        Ok(response)
    }

    /// Order translation of previously saved texts
    pub async fn texts_translate(&self, request: &TextsTranslateRequest) -> Result<Value> {
        if request.texts.is_empty() || request.texts.iter().any(|t| t.id.is_empty()) {
            return Err(TransfluentError::validation(
                "Text ids to translate MUST be provided",
            ));
        }
        if request.target_languages.is_empty() {
            return Err(TransfluentError::validation(
                "Target languages MUST be provided as a non-empty list",
            ));
        }

        let payload = Payload::new()
            .with("group_id", request.group_id.as_deref().unwrap_or_default())
            .with("source_language", request.language.as_str())
            .with("texts", json!(request.texts))
            .with("level", request.level.as_str())
            .with("target_languages", json!(request.target_languages))
            .with("comment", request.comment.as_str())
            .with("callback_url", json!(request.callback_url));

        let response = self.call(Operation::TextsTranslate, payload).await?;
        info!(
            count = request.texts.len(),
            targets = request.target_languages.len(),
            level = %request.level,
            "Text translation ordered"
        );
        Ok(response)
    }

    /// Retrieve a (translated) text
    pub async fn text(&self, text_id: &str, language: &str, group_id: Option<&str>) -> Result<Value> {
        self.call(Operation::Text, text_payload(text_id, language, group_id))
            .await
    }

    /// Translation status of a text
    pub async fn text_status(
        &self,
        text_id: &str,
        language: &str,
        group_id: Option<&str>,
    ) -> Result<Value> {
        self.call(Operation::TextStatus, text_payload(text_id, language, group_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::tests::RecordingTransport;
    use crate::core::config::ClientConfig;
    use crate::core::endpoint::HttpMethod;
    use crate::core::models::{TextRef, TranslationLevel};
    use assert_json_diff::assert_json_eq;

    fn client(transport: &std::sync::Arc<RecordingTransport>) -> TransfluentClient {
        TransfluentClient::with_transport(ClientConfig::with_token("tok", true), transport.clone())
            .unwrap()
    }

    #[tokio::test]
    async fn test_texts_payload() {
        let transport =
            RecordingTransport::with_responses(vec![(200, r#"{"status":"OK","response":{"saved":2}}"#)]);
        let texts = BTreeMap::from([
            ("greeting".to_string(), "Hello".to_string()),
            ("farewell".to_string(), "Bye".to_string()),
        ]);

        let response = client(&transport)
            .texts(Some("app"), "en-gb", &texts)
            .await
            .unwrap();
        assert_eq!(response, json!({"saved": 2}));

        let request = &transport.recorded()[0];
        assert_eq!(request.method, HttpMethod::POST);
        assert_eq!(request.url, "https://demo.transfluent.com/v2/texts/");
        assert_json_eq!(
            request.payload.to_json(),
            json!({
                "group_id": "app",
                "language": "en-gb",
                "texts": {"greeting": "Hello", "farewell": "Bye"},
                "token": "tok"
            })
        );
    }

    #[tokio::test]
    async fn test_texts_rejects_empty_map() {
        let transport = RecordingTransport::with_responses(vec![]);
        let err = client(&transport)
            .texts(None, "en-gb", &BTreeMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TransfluentError::Validation { .. }));
        assert!(transport.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_texts_translate_payload() {
        let transport =
            RecordingTransport::with_responses(vec![(200, r#"{"status":"OK","response":{"word_count":3}}"#)]);
        let request = TextsTranslateRequest::new(
            "en-gb",
            vec![TextRef::new("greeting")],
            vec!["fi-fi".to_string()],
        )
        .with_level(TranslationLevel::Machine);

        client(&transport).texts_translate(&request).await.unwrap();

        let recorded = &transport.recorded()[0];
        assert_eq!(recorded.url, "https://demo.transfluent.com/v2/texts/translate/");
        assert_json_eq!(
            recorded.payload.to_json(),
            json!({
                "group_id": "",
                "source_language": "en-gb",
                "texts": [{"id": "greeting"}],
                "level": "machine",
                "target_languages": ["fi-fi"],
                "comment": "",
                "callback_url": null,
                "token": "tok"
            })
        );
    }

    #[tokio::test]
    async fn test_texts_translate_validation() {
        let transport = RecordingTransport::with_responses(vec![]);
        let client = client(&transport);

        let no_texts = TextsTranslateRequest::new("en", vec![], vec!["fi-fi".to_string()]);
        assert!(matches!(
            client.texts_translate(&no_texts).await,
            Err(TransfluentError::Validation { .. })
        ));

        let blank_id = TextsTranslateRequest::new("en", vec![TextRef::new("")], vec!["fi-fi".to_string()]);
        assert!(matches!(
            client.texts_translate(&blank_id).await,
            Err(TransfluentError::Validation { .. })
        ));

        let no_targets = TextsTranslateRequest::new("en", vec![TextRef::new("a")], vec![]);
        assert!(matches!(
            client.texts_translate(&no_targets).await,
            Err(TransfluentError::Validation { .. })
        ));

        assert!(transport.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_text_and_status_queries() {
        let transport = RecordingTransport::with_responses(vec![
            (200, r#"{"status":"OK","response":{"text":"Hei"}}"#),
            (200, r#"{"status":"OK","response":{"is_translated":false}}"#),
        ]);
        let client = client(&transport);

        assert_eq!(
            client.text("greeting", "fi-fi", None).await.unwrap(),
            json!({"text": "Hei"})
        );
        assert_eq!(
            client.text_status("greeting", "fi-fi", Some("app")).await.unwrap(),
            json!({"is_translated": false})
        );

        let requests = transport.recorded();
        assert_eq!(requests[0].url, "https://demo.transfluent.com/v2/text/");
        assert!(requests[0].payload.get("group_id").is_none());
        assert_eq!(requests[1].url, "https://demo.transfluent.com/v2/text/status/");
        assert_eq!(requests[1].payload.get("group_id"), Some(&json!("app")));
    }
}
