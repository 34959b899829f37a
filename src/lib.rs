//! Command-line front end for deploying Maven build outputs to Artifactory.
//!
//! The deployment engine lives in `artifactory-deployer`. This crate turns
//! flags, environment variables and an optional TOML file into validated
//! settings, sets up logging and reports failures.

pub mod cli;
pub mod config;
pub mod logging;

use artifactory_deployer::error::DeployError;
use config::ConfigError;
use thiserror::Error;

/// Errors that end a run of the deploy tool.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration was missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The deployment failed.
    #[error(transparent)]
    Deploy(Box<DeployError>),
}

impl From<DeployError> for AppError {
    fn from(err: DeployError) -> Self {
        Self::Deploy(Box::new(err))
    }
}
