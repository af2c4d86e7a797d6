//! HTTP endpoint receiving "translation completed" callbacks

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{StatusCode, Uri},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Receives the `message` of each accepted callback
pub trait CallbackHandler: Send + Sync + 'static {
    fn handle(&self, message: Value);
}

impl<F> CallbackHandler for F
where
    F: Fn(Value) + Send + Sync + 'static,
{
    fn handle(&self, message: Value) {
        self(message)
    }
}

/// Handler that only logs incoming messages
pub fn logging_handler() -> Arc<dyn CallbackHandler> {
    Arc::new(|message: Value| info!(%message, "Translation callback received"))
}

/// Webhook configuration
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Route the callback is served on
    pub path: String,
    /// Shared secret expected in the `_secret` query parameter
    pub secret: Option<String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            path: "/callback".to_string(),
            secret: None,
        }
    }
}

/// Application state
#[derive(Clone)]
struct AppState {
    secret: Option<String>,
    handler: Arc<dyn CallbackHandler>,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

#[derive(Serialize)]
struct CallbackResponse {
    status: String,
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Last `_secret` value in the query string, if any
fn query_secret(uri: &Uri) -> Option<String> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri).ok()?;
    pairs
        .into_iter()
        .rev()
        .find(|(key, _)| key == "_secret")
        .map(|(_, value)| value)
}

async fn receive_callback(
    State(state): State<AppState>,
    uri: Uri,
    body: Bytes,
) -> Result<Json<CallbackResponse>, (StatusCode, Json<ErrorResponse>)> {
    if let Some(secret) = &state.secret {
        if query_secret(&uri).as_deref() != Some(secret.as_str()) {
            warn!("Rejected callback with missing or wrong secret");
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Not Found".to_string(),
                }),
            ));
        }
    }

    let message = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|mut data| data.get_mut("message").map(Value::take));

    let Some(message) = message else {
        warn!(bytes = body.len(), "Callback body does not comply expected form");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Response does not comply expected form!".to_string(),
            }),
        ));
    };

    debug!("Dispatching callback message");
    state.handler.handle(message);

    Ok(Json(CallbackResponse {
        status: "OK".to_string(),
    }))
}

/// Build the webhook router
pub fn router(config: WebhookConfig, handler: Arc<dyn CallbackHandler>) -> Router {
    let state = AppState {
        secret: config.secret,
        handler,
    };

    Router::new()
        .route("/", get(health_check))
        .route(&config.path, post(receive_callback))
        .with_state(state)
}

/// Run the webhook server
pub async fn run_server(
    host: String,
    port: u16,
    config: WebhookConfig,
    handler: Arc<dyn CallbackHandler>,
) -> anyhow::Result<()> {
    if config.secret.is_none() {
        warn!("No webhook secret configured, any caller can post callbacks");
    }

    let path = config.path.clone();
    let app = router(config, handler);

    // Bind address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Listening for callbacks on {}{}", addr, path);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use std::sync::Mutex;
    use tower::ServiceExt;

    fn recording_router(secret: Option<&str>) -> (Router, Arc<Mutex<Vec<Value>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let handler = move |message: Value| sink.lock().unwrap().push(message);

        let config = WebhookConfig {
            secret: secret.map(str::to_string),
            ..Default::default()
        };
        (router(config, Arc::new(handler)), received)
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_callback_dispatches_message() {
        let (app, received) = recording_router(None);

        let response = app
            .oneshot(post("/callback", r#"{"message":{"text_id":"greeting","language":"fi-fi"}}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            *received.lock().unwrap(),
            vec![json!({"text_id": "greeting", "language": "fi-fi"})]
        );
    }

    #[tokio::test]
    async fn test_callback_secret_required() {
        let (app, received) = recording_router(Some("s3cret"));

        let missing = app
            .clone()
            .oneshot(post("/callback", r#"{"message":"done"}"#))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let wrong = app
            .clone()
            .oneshot(post("/callback?_secret=nope", r#"{"message":"done"}"#))
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::NOT_FOUND);

        let right = app
            .clone()
            .oneshot(post("/callback?_secret=s3cret", r#"{"message":"done"}"#))
            .await
            .unwrap();
        assert_eq!(right.status(), StatusCode::OK);

        let repeated = app
            .clone()
            .oneshot(post("/callback?_secret=x&_secret=y", r#"{"message":1}"#))
            .await
            .unwrap();
        assert_eq!(repeated.status(), StatusCode::NOT_FOUND);

        let last_wins = app
            .oneshot(post("/callback?_secret=x&_secret=s3cret", r#"{"message":2}"#))
            .await
            .unwrap();
        assert_eq!(last_wins.status(), StatusCode::OK);

        assert_eq!(*received.lock().unwrap(), vec![json!("done"), json!(2)]);
    }

    #[tokio::test]
    async fn test_callback_without_secret_ignores_query() {
        let (app, received) = recording_router(None);

        for uri in [
            "/callback?_secret=x&_secret=y",
            "/callback?_secret",
            "/callback?other&_secret=",
        ] {
            let response = app
                .clone()
                .oneshot(post(uri, r#"{"message":1}"#))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
        assert_eq!(received.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_callback_without_message() {
        let (app, received) = recording_router(None);

        for body in [r#"{"other":1}"#, "not json"] {
            let response = app.clone().oneshot(post("/callback", body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
        assert!(received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_health_check() {
        let (app, _) = recording_router(None);
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let health: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(health["status"], json!("ok"));
    }
}
