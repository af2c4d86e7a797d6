//! Account and catalogue operations

use serde_json::Value;
use tracing::info;

use crate::core::client::TransfluentClient;
use crate::core::endpoint::Operation;
use crate::core::errors::{Result, TransfluentError};
use crate::core::transport::Payload;

impl TransfluentClient {
    /// List the languages supported by the service
    pub async fn languages(&self) -> Result<Value> {
        self.call_unauthenticated(Operation::Languages, Payload::new())
            .await
    }

    /// Create an account and return a token for it
    pub async fn create_account(&self, email: &str, accept_terms: bool) -> Result<String> {
        if !accept_terms {
            return Err(TransfluentError::validation(
                "You must accept terms of service to create an account",
            ));
        }
        if email.trim().is_empty() {
            return Err(TransfluentError::validation("email MUST be provided"));
        }

        let payload = Payload::new().with("email", email).with("terms", "ok");
        let response = self
            .call_unauthenticated(Operation::CreateAccount, payload)
            .await?;

        match response.get("token").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => {
                info!(email, "Account created");
                Ok(token.to_string())
            }
            _ => Err(TransfluentError::unexpected(response.to_string())),
        }
    }
}
