//! Wiring shared by every command: configuration, HTTP client, Doppler runner,
//! registry backend, providers, and location handlers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Client;

use crate::adapters::backends::backend_from_config;
use crate::adapters::doppler_cli::{DopplerCli, ProcessDopplerCli};
use crate::adapters::locations::build_default_handlers;
use crate::adapters::providers::build_default_providers;
use crate::domain::models::Config;
use crate::domain::ports::RegistryBackend;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::http::build_http_client;
use crate::services::{CredentialService, RotationOrchestrator};

/// Everything a command needs, constructed once per invocation.
pub struct AppContext {
    pub config: Config,
    pub config_path: PathBuf,
    http: Client,
    doppler: Arc<dyn DopplerCli>,
}

impl AppContext {
    /// Load configuration from `config_path` (or the default location).
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = config_path.unwrap_or_else(ConfigLoader::default_path);
        let config = ConfigLoader::load_with_path(&config_path)
            .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;
        Self::new(config, config_path, Arc::new(ProcessDopplerCli::new()))
    }

    pub fn new(config: Config, config_path: PathBuf, doppler: Arc<dyn DopplerCli>) -> Result<Self> {
        let http = build_http_client(&config.http)?;
        Ok(Self {
            config,
            config_path,
            http,
            doppler,
        })
    }

    pub fn doppler(&self) -> Arc<dyn DopplerCli> {
        Arc::clone(&self.doppler)
    }

    pub fn backend(&self) -> Result<Arc<dyn RegistryBackend>> {
        backend_from_config(&self.config, self.doppler())
            .context("Failed to open the registry backend")
    }

    pub fn credential_service(&self) -> Result<CredentialService> {
        Ok(CredentialService::new(self.backend()?))
    }

    pub fn orchestrator(&self) -> Result<RotationOrchestrator> {
        Ok(RotationOrchestrator::new(
            self.backend()?,
            build_default_providers(self.http.clone()),
            build_default_handlers(self.http.clone(), self.doppler()),
        ))
    }

    /// Persist `self.config` to the file it was loaded from.
    pub fn save_config(&self) -> Result<()> {
        ConfigLoader::save(&self.config, &self.config_path)
    }
}
