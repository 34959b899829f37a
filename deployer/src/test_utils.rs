//! Shared test utilities for the deployer crate.

use crate::artifact::{ArtifactProperties, DeployableArtifact};
use crate::build_info::BuildRun;
use crate::error::{DeployError, Result};
use crate::repository::{Artifactory, TransportError};
use camino::Utf8Path;
use std::fs;
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A deploy call seen by [`RecordingArtifactory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedArtifact {
    /// Target repository.
    pub repository: String,
    /// Repository path of the artifact.
    pub path: String,
    /// Properties sent as matrix parameters.
    pub properties: ArtifactProperties,
    /// Content size in bytes.
    pub size: u64,
}

/// A build-run registration seen by [`RecordingArtifactory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredBuildRun {
    /// Artifactory project, if any.
    pub project: Option<String>,
    /// Build name.
    pub build_name: String,
    /// The registered run.
    pub build_run: BuildRun,
}

/// An in-memory [`Artifactory`] that records every call.
///
/// Deploys are recorded in the order they complete. With more than one
/// worker thread, order is only meaningful between categories.
#[derive(Debug, Default)]
pub struct RecordingArtifactory {
    deployed: Mutex<Vec<DeployedArtifact>>,
    build_runs: Mutex<Vec<RegisteredBuildRun>>,
    fail_on: Option<String>,
}

impl RecordingArtifactory {
    /// Creates a recorder that accepts every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder that rejects the deploy of `path` with an HTTP
    /// 500 response.
    pub fn failing_on(path: impl Into<String>) -> Self {
        Self {
            fail_on: Some(path.into()),
            ..Self::default()
        }
    }

    /// Every successful deploy so far.
    pub fn deployed(&self) -> Vec<DeployedArtifact> {
        lock(&self.deployed).clone()
    }

    /// Repository paths of every successful deploy so far.
    pub fn deployed_paths(&self) -> Vec<String> {
        lock(&self.deployed)
            .iter()
            .map(|deployed| deployed.path.clone())
            .collect()
    }

    /// Every build-run registration so far.
    pub fn build_runs(&self) -> Vec<RegisteredBuildRun> {
        lock(&self.build_runs).clone()
    }
}

impl Artifactory for RecordingArtifactory {
    fn deploy(&self, repository: &str, artifact: &DeployableArtifact) -> Result<()> {
        let checksums = artifact
            .checksums()
            .map_err(|source| DeployError::ArtifactRead {
                path: artifact.path().to_owned(),
                source,
            })?;
        if self.fail_on.as_deref() == Some(artifact.path()) {
            return Err(DeployError::ArtifactDeploy {
                path: artifact.path().to_owned(),
                checksums: checksums.clone(),
                source: TransportError::Status {
                    url: format!("https://repo.example.com/{repository}{}", artifact.path()),
                    status: 500,
                },
            });
        }
        lock(&self.deployed).push(DeployedArtifact {
            repository: repository.to_owned(),
            path: artifact.path().to_owned(),
            properties: artifact.properties().clone(),
            size: artifact.size(),
        });
        Ok(())
    }

    fn add_build_run(
        &self,
        project: Option<&str>,
        build_name: &str,
        build_run: &BuildRun,
    ) -> Result<()> {
        lock(&self.build_runs).push(RegisteredBuildRun {
            project: project.map(str::to_owned),
            build_name: build_name.to_owned(),
            build_run: build_run.clone(),
        });
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Creates each of `files` beneath `root`, along with any missing parent
/// directories. Each file's content is its relative path.
///
/// # Errors
///
/// Returns an error if a directory or file cannot be written.
pub fn write_tree(root: &Utf8Path, files: &[&str]) -> io::Result<()> {
    for file in files {
        let path = root.join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, file)?;
    }
    Ok(())
}
