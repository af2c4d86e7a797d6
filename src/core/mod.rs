//! Core client engine: endpoint resolution, transport, token cache and envelope decoding

pub mod client;
pub mod config;
pub mod endpoint;
pub mod errors;
pub mod interpreter;
pub mod models;
pub mod token;
pub mod transport;
