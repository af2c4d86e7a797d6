//! Transfluent API client: token handling and operation dispatch

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::config::{ClientConfig, Endpoints, Environment};
use crate::core::endpoint::{Operation, OperationDescriptor};
use crate::core::errors::{Result, TransfluentError};
use crate::core::interpreter::{Envelope, Outcome};
use crate::core::token::TokenManager;
use crate::core::transport::{execute_cancellable, HttpRequest, HttpTransport, Payload, Transport};

/// Client for the Transfluent translation-management API
///
/// Clones share the token cache and HTTP connection pool.
#[derive(Clone)]
pub struct TransfluentClient {
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
    endpoints: Arc<Endpoints>,
    tokens: TokenManager,
    cancel: Option<CancellationToken>,
}

impl fmt::Debug for TransfluentClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransfluentClient")
            .field("environment", &self.config.environment())
            .field("endpoints", &self.endpoints)
            .field("email", &self.config.email)
            .finish_non_exhaustive()
    }
}

impl TransfluentClient {
    /// Create a client backed by a `reqwest` transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(
            config.sandbox,
            config.timeout_ms.map(Duration::from_millis),
        )?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client over a caller-supplied transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let endpoints = config.resolved_endpoints();
        let tokens = TokenManager::new(config.token.clone());

        debug!(environment = ?config.environment(), v2 = %endpoints.v2_base, v3 = %endpoints.v3_base, "client configured");

        Ok(Self {
            transport,
            config: Arc::new(config),
            endpoints: Arc::new(endpoints),
            tokens,
            cancel: None,
        })
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Handle whose calls abort as soon as `token` is cancelled
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            cancel: Some(token),
            ..self.clone()
        }
    }

    /// Deployment selected by the sandbox flag
    pub fn environment(&self) -> Environment {
        self.config.environment()
    }

    /// True in sandbox mode, where certificate and host checks are off
    pub fn relaxed_tls(&self) -> bool {
        self.transport.relaxed_tls()
    }

    /// Base URLs this client resolves against
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// URL an operation resolves to for this client
    pub fn url_for(&self, descriptor: &OperationDescriptor) -> String {
        descriptor.url(&self.endpoints)
    }

    /// Reuse a token obtained out-of-band
    pub async fn set_token(&self, token: impl Into<String>) {
        self.tokens.set(token.into()).await;
    }

    /// Cached token, authenticating with the configured credentials if needed
    pub async fn get_token(&self) -> Result<String> {
        self.tokens.get_or_authenticate(|| self.authenticate()).await
    }

    /// Cached token without any network exchange
    pub async fn cached_token(&self) -> Option<String> {
        self.tokens.cached().await
    }

    async fn authenticate(&self) -> Result<String> {
        let (Some(email), Some(password)) = (&self.config.email, &self.config.password) else {
            return Err(TransfluentError::Authentication {
                message: "no credentials configured".to_string(),
            });
        };

        let payload = Payload::new()
            .with("email", email.as_str())
            .with("password", password.as_str());
        let response = self
            .dispatch(&Operation::Authenticate.descriptor(), payload)
            .await?
            .into_json()?;

        info!(email = %email, "Authenticated with API");
        token_from_response(response)
    }

    /// Run an operation that needs a token
    ///
    /// File downloads return raw bytes and go through [`download`](Self::download).
    pub async fn call(&self, operation: Operation, payload: Payload) -> Result<Value> {
        let descriptor = json_descriptor(operation)?;
        self.call_descriptor(&descriptor, payload, true)
            .await?
            .into_json()
    }

    /// Run an operation without resolving a token
    pub async fn call_unauthenticated(&self, operation: Operation, payload: Payload) -> Result<Value> {
        let descriptor = json_descriptor(operation)?;
        self.call_descriptor(&descriptor, payload, false)
            .await?
            .into_json()
    }

    /// Run the file download operation and return its raw body
    pub async fn download(&self, payload: Payload) -> Result<Vec<u8>> {
        Ok(self
            .call_descriptor(&Operation::FileRead.descriptor(), payload, true)
            .await?
            .into_bytes())
    }

    /// Run an arbitrary operation descriptor
    pub async fn call_descriptor(
        &self,
        descriptor: &OperationDescriptor,
        mut payload: Payload,
        authenticated: bool,
    ) -> Result<Outcome> {
        if authenticated {
            let token = self.get_token().await?;
            payload.insert("token", token);
        }

        self.dispatch(descriptor, payload).await
    }

    /// Resolve, execute and decode without touching the token cache
    async fn dispatch(&self, descriptor: &OperationDescriptor, payload: Payload) -> Result<Outcome> {
        let request = HttpRequest {
            method: descriptor.method,
            url: self.url_for(descriptor),
            generation: descriptor.generation,
            payload,
        };

        debug!(operation = %descriptor.name, url = %request.url, "dispatching operation");
        let response =
            execute_cancellable(self.transport.as_ref(), request, self.cancel.as_ref()).await?;

        Envelope::for_operation(descriptor).decode(response)
    }
}

fn json_descriptor(operation: Operation) -> Result<OperationDescriptor> {
    let descriptor = operation.descriptor();
    if descriptor.is_file_download() {
        return Err(TransfluentError::validation(format!(
            "{} returns a raw file, use download() instead",
            descriptor.name
        )));
    }
    Ok(descriptor)
}

/// Authentication answers with the token itself or an object carrying it
fn token_from_response(response: Value) -> Result<String> {
    let token = match response {
        Value::String(token) => token,
        Value::Object(mut map) => match map.remove("token") {
            Some(Value::String(token)) => token,
            _ => String::new(),
        },
        _ => String::new(),
    };

    if token.is_empty() {
        return Err(TransfluentError::Authentication {
            message: "API response did not contain a token".to_string(),
        });
    }
    Ok(token)
}
