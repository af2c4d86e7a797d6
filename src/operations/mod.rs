//! Per-endpoint wrappers over [`TransfluentClient`](crate::core::client::TransfluentClient)
//!
//! Each wrapper validates its arguments locally, shapes the payload for one
//! remote operation and checks the response form before returning it.

pub mod account;
pub mod files;
pub mod texts;

use serde_json::Value;

/// Mirrors the server's notion of an absent value: missing, null, false, 0, "" or "0"
pub(crate) fn is_falsy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty() || s == "0",
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(_)) => false,
    }
}
