//! # Configuration
//!
//! Client-side configuration: where the API lives, where the session token
//! is persisted, and how chatty the logs are.

#[cfg(not(target_arch = "wasm32"))]
pub mod client;
