//! Transfluent client - Rust library for the Transfluent translation-management API
//!
//! This library turns typed method calls into versioned REST requests, manages the
//! API token transparently and decodes the three response envelope generations
//! (legacy, v2, v3) into a single success/error outcome. It also ships the
//! callback receiver for asynchronous "translation completed" notifications.
//!
//! ```no_run
//! use transfluent_client::{ClientConfig, TransfluentClient};
//!
//! # async fn run() -> transfluent_client::Result<()> {
//! let client = TransfluentClient::new(ClientConfig::new("me@example.com", "secret", true))?;
//! let status = client.file_status("/app/strings.xml", "en-gb").await?;
//! println!("{}", status.progress);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod operations;
pub mod server;

// Re-export key types for convenience
pub use core::{
    client::TransfluentClient,
    config::{ClientConfig, Endpoints, Environment},
    endpoint::{Generation, HttpMethod, Operation, OperationDescriptor},
    errors::{Result, TransfluentError},
    interpreter::{Envelope, Outcome},
    models::{
        FileCompletion, FileFormat, FileStatus, FileTranslateOutcome, FileTranslateRequest,
        TextRef, TextsTranslateRequest, TranslationLevel, WordCountResponse,
    },
    transport::{HttpTransport, Payload, Transport},
};

pub use server::webhook::{CallbackHandler, WebhookConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
