//! Artifactory client.
//!
//! # Sub-modules
//!
//! - [`outcome`] - Classify transport results into retry and fallback decisions.
//! - [`transport`] - The raw request seam and its `ureq` implementation.
//! - [`uploader`] - The upload protocol built on a transport.
//! - [`url`] - Request URL construction.

pub mod outcome;
pub mod transport;
pub mod uploader;
pub mod url;

pub use outcome::{ChecksumOutcome, UploadOutcome};
pub use transport::{Credentials, DeployTarget, HttpTransport, Transport, TransportError};
pub use uploader::{ArtifactUploader, CHECKSUM_THRESHOLD, DEFAULT_RETRY_DELAY};

use crate::artifact::DeployableArtifact;
use crate::build_info::BuildRun;
use crate::error::Result;

/// Operations the deployer needs from an artifact repository.
pub trait Artifactory: Send + Sync {
    /// Deploy `artifact` to `repository`.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact cannot be read or the upload fails
    /// after any fallback and retries.
    fn deploy(&self, repository: &str, artifact: &DeployableArtifact) -> Result<()>;

    /// Register a build run, optionally within a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the registration request fails.
    fn add_build_run(
        &self,
        project: Option<&str>,
        build_name: &str,
        build_run: &BuildRun,
    ) -> Result<()>;
}
