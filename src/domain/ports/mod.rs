//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters must implement:
//! - CredentialProvider: issue new credential values for one service
//! - LocationHandler: read/write/backup a value at one location kind
//! - RegistryBackend: load and save the tracking registry
//!
//! These traits define the contracts that keep the rotation orchestrator
//! independent of specific vendors and storage formats.

pub mod errors;
pub mod location_handler;
pub mod provider;
pub mod registry_backend;

pub use errors::{BackendError, ProviderError};
pub use location_handler::LocationHandler;
pub use provider::CredentialProvider;
pub use registry_backend::RegistryBackend;
