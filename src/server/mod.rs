//! Callback receiver for asynchronous translation notifications

pub mod webhook;
