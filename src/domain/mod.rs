//! Domain layer for tokn
//!
//! This module contains the credential model, the registry, and the port
//! traits that providers, location handlers, and registry backends implement.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{DomainError, DomainResult};
