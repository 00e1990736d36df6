//! Adapters for external systems: vendor APIs, local files, and the Doppler CLI.

pub mod backends;
pub mod doppler_cli;
pub mod locations;
pub mod providers;
pub mod secure_file;
