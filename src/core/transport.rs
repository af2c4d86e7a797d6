//! HTTP exchange for resolved operations

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::endpoint::{Generation, HttpMethod};
use crate::core::errors::{Result, TransfluentError};

/// Ordered key/value payload sent with an operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    entries: Vec<(String, Value)>,
}

impl Payload {
    /// Empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, replacing any earlier entry with the same key in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`Payload::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert only when the value is present
    pub fn with_opt(mut self, key: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        if let Some(value) = value {
            self.insert(key, value);
        }
        self
    }

    /// Value stored under `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// True when no entry has been added
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// JSON object body
    pub fn to_json(&self) -> Value {
        Value::Object(self.entries.iter().cloned().collect())
    }

    /// Flat string pairs for query strings and form bodies; nulls are skipped
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| {
                let text = match v {
                    Value::Null => return None,
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Some((k.clone(), text))
            })
            .collect()
    }
}

/// One fully resolved HTTP exchange
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub generation: Generation,
    pub payload: Payload,
}

/// Raw response bytes plus HTTP status
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Body decoded as UTF-8, lossily
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs a single HTTP exchange
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<RawResponse>;

    /// Whether certificate and host verification are disabled
    fn relaxed_tls(&self) -> bool {
        false
    }
}

/// `reqwest` backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    relaxed_tls: bool,
}

impl HttpTransport {
    /// Build the HTTP client; sandbox mode disables certificate and host verification
    pub fn new(sandbox: bool, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .pool_max_idle_per_host(10);

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        if sandbox {
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        let client = builder.build().map_err(|e| {
            TransfluentError::configuration(format!("Failed to create HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            relaxed_tls: sandbox,
        })
    }

    fn build(&self, request: &HttpRequest) -> Result<reqwest::RequestBuilder> {
        let builder = match request.method {
            HttpMethod::GET => self
                .client
                .get(&request.url)
                .query(&request.payload.to_pairs()),
            HttpMethod::POST => {
                let builder = self.client.post(&request.url);
                match (request.generation, request.payload.is_empty()) {
                    (_, true) => builder,
                    (Generation::Legacy, false) => builder.form(&request.payload.to_pairs()),
                    (_, false) => builder.json(&request.payload.to_json()),
                }
            }
            other => {
                return Err(TransfluentError::UnsupportedMethod {
                    method: other.to_string(),
                })
            }
        };
        Ok(builder)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn relaxed_tls(&self) -> bool {
        self.relaxed_tls
    }

    async fn execute(&self, request: HttpRequest) -> Result<RawResponse> {
        let builder = self.build(&request)?;

        debug!(
            method = %request.method,
            url = %request.url,
            generation = %request.generation,
            "sending HTTP request"
        );

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        debug!(url = %request.url, status, bytes = body.len(), "received HTTP response");

        Ok(RawResponse { status, body })
    }
}

/// Run an exchange, aborting when the caller cancels
pub(crate) async fn execute_cancellable(
    transport: &dyn Transport,
    request: HttpRequest,
    cancel: Option<&CancellationToken>,
) -> Result<RawResponse> {
    match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(TransfluentError::Cancelled),
                result = transport.execute(request) => result,
            }
        }
        None => transport.execute(request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(method: HttpMethod, url: String, generation: Generation, payload: Payload) -> HttpRequest {
        HttpRequest {
            method,
            url,
            generation,
            payload,
        }
    }

    #[test]
    fn test_payload_pairs() {
        let payload = Payload::new()
            .with("identifier", "/foo/bar.xml")
            .with("count", 3)
            .with("targets", json!(["fi-fi", "de-de"]))
            .with("group_id", Value::Null);

        assert_eq!(
            payload.to_pairs(),
            vec![
                ("identifier".to_string(), "/foo/bar.xml".to_string()),
                ("count".to_string(), "3".to_string()),
                ("targets".to_string(), r#"["fi-fi","de-de"]"#.to_string()),
            ]
        );
    }

    #[test]
    fn test_payload_insert_replaces_in_place() {
        let mut payload = Payload::new().with("a", "1").with("b", "2");
        payload.insert("a", "3");
        assert_eq!(payload.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(payload.get("a"), Some(&json!("3")));
    }

    #[test]
    fn test_tls_mode_follows_sandbox_flag() {
        let sandbox = HttpTransport::new(true, None).unwrap();
        assert!(sandbox.relaxed_tls());

        let production = HttpTransport::new(false, Some(Duration::from_secs(5))).unwrap();
        assert!(!production.relaxed_tls());
    }

    #[tokio::test]
    async fn test_get_sends_query_string() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/file/status/"))
            .and(query_param("identifier", "a b&c"))
            .and(query_param("language", "en-gb"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(false, None).unwrap();
        let response = transport
            .execute(request(
                HttpMethod::GET,
                format!("{}/v2/file/status/", server.uri()),
                Generation::V2,
                Payload::new().with("identifier", "a b&c").with("language", "en-gb"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"ok");
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"email": "a@b.c", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t"})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(false, None).unwrap();
        let response = transport
            .execute(request(
                HttpMethod::POST,
                format!("{}/authenticate", server.uri()),
                Generation::V3,
                Payload::new().with("email", "a@b.c").with("password", "pw"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_legacy_post_sends_form_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/file/save/"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("identifier=x&language=en"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(false, None).unwrap();
        transport
            .execute(request(
                HttpMethod::POST,
                format!("{}/file/save/", server.uri()),
                Generation::Legacy,
                Payload::new().with("identifier", "x").with("language", "en"),
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unsupported_method_is_rejected() {
        let transport = HttpTransport::new(false, None).unwrap();
        let err = transport
            .execute(request(
                HttpMethod::DELETE,
                "http://127.0.0.1:9/".to_string(),
                Generation::V2,
                Payload::new(),
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, TransfluentError::UnsupportedMethod { method } if method == "DELETE"));
    }

    #[tokio::test]
    async fn test_connection_failure_is_connectivity_error() {
        let transport = HttpTransport::new(false, None).unwrap();
        let err = transport
            .execute(request(
                HttpMethod::GET,
                "http://127.0.0.1:9/languages".to_string(),
                Generation::V3,
                Payload::new(),
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, TransfluentError::Connectivity { .. }));
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(false, Some(Duration::from_millis(50))).unwrap();
        let err = transport
            .execute(request(
                HttpMethod::GET,
                format!("{}/languages", server.uri()),
                Generation::V3,
                Payload::new(),
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, TransfluentError::Timeout));
    }

    #[tokio::test]
    async fn test_cancelled_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(false, None).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let err = execute_cancellable(
            &transport,
            request(
                HttpMethod::GET,
                format!("{}/languages", server.uri()),
                Generation::V3,
                Payload::new(),
            ),
            Some(&token),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, TransfluentError::Cancelled));
    }
}
