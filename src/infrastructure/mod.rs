//! Infrastructure layer module
//!
//! Cross-cutting plumbing used by the binary and the adapters:
//! - Configuration management
//! - Logging infrastructure
//! - The shared HTTP client

pub mod config;
pub mod http;
pub mod logging;
