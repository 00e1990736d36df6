pub mod config;
pub mod credential;
pub mod registry;
pub mod rotation;
pub mod timestamps;

pub use config::{
    Config, DopplerBackendConfig, HttpConfig, LocalBackendConfig, LoggingConfig,
};
pub use credential::{
    CredentialLocation, CredentialRecord, CredentialStatus, LocationMetadata, RotationType,
    EXPIRING_SOON_DAYS,
};
pub use registry::Registry;
pub use rotation::{
    param_keys, BatchRotationReport, FailedEntry, ManualEntry, RotatedEntry, RotationOutcome, RotationParams,
    RotationReport, SecondaryValue, SkippedEntry, AUTO_ROTATION_UNSUPPORTED,
    AUTO_ROTATION_UNSUPPORTED_MARKER,
};
