//! tokn - credential tracking and rotation
//!
//! tokn keeps a registry of API credentials (which service issues them, where
//! their values are stored, when they expire) and rotates them: a provider
//! issues a new value, every tracked location is updated, and a failure part
//! way through restores the locations already written.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): credential and registry models, port traits
//! - **Service Layer** (`services`): rotation orchestration and registry bookkeeping
//! - **Adapters** (`adapters`): vendor providers, location handlers, registry backends
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging, HTTP client
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tokn::adapters::backends::LocalBackend;
//! use tokn::services::RotationOrchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let http = reqwest::Client::new();
//!     let doppler = Arc::new(tokn::adapters::doppler_cli::ProcessDopplerCli::new());
//!     let orchestrator = RotationOrchestrator::new(
//!         Arc::new(LocalBackend::new("~/.config/tokn")),
//!         tokn::adapters::providers::build_default_providers(http.clone()),
//!         tokn::adapters::locations::build_default_handlers(http, doppler),
//!     );
//!     let report = orchestrator.rotate_all(true).await?;
//!     println!("{} rotated", report.success.len());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    BatchRotationReport, Config, CredentialLocation, CredentialRecord, CredentialStatus,
    Registry, RotationOutcome, RotationParams, RotationReport, RotationType,
};
pub use domain::ports::{CredentialProvider, LocationHandler, RegistryBackend};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{CredentialService, RotationOrchestrator};
