pub mod credential_service;
pub mod rotation_orchestrator;
pub mod rotation_params;

pub use credential_service::{CredentialService, CredentialUpdate};
pub use rotation_orchestrator::{LocationHandlerRegistry, ProviderRegistry, RotationOrchestrator};
pub use rotation_params::derive_rotation_params;
