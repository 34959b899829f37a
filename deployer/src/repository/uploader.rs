//! Artifact upload protocol: checksum deploy, content fallback and retry.

use super::outcome::{ChecksumOutcome, UploadOutcome};
use super::transport::{DeployTarget, Transport, TransportError};
use super::url::{artifact_url, base_uri, build_url};
use super::Artifactory;
use crate::artifact::{Checksums, DeployableArtifact};
use crate::build_info::{BuildInfo, BuildRun};
use crate::error::{DeployError, Result};
use log::{debug, warn};
use std::thread;
use std::time::Duration;

/// Artifacts at or below this size are uploaded directly, skipping the
/// checksum deploy round trip.
pub const CHECKSUM_THRESHOLD: u64 = 10 * 1024;

/// Maximum content upload attempts per artifact.
pub const MAX_CONTENT_ATTEMPTS: u32 = 3;

/// Default pause between content upload attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// [`Artifactory`] client that uploads through a [`Transport`].
///
/// # Examples
///
/// ```no_run
/// use artifactory_deployer::repository::{ArtifactUploader, Credentials, HttpTransport};
///
/// let credentials = Credentials::new("alice", "secret");
/// let uploader = ArtifactUploader::new(
///     Box::new(HttpTransport::new(Some(&credentials))),
///     "https://repo.example.com",
/// );
/// ```
pub struct ArtifactUploader {
    transport: Box<dyn Transport>,
    base_uri: String,
    retry_delay: Duration,
}

impl ArtifactUploader {
    /// Create an uploader for the server at `uri`.
    #[must_use]
    pub fn new(transport: Box<dyn Transport>, uri: &str) -> Self {
        Self {
            transport,
            base_uri: base_uri(uri),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Override the pause between content upload attempts.
    #[must_use]
    pub const fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    fn upload(
        &self,
        repository: &str,
        artifact: &DeployableArtifact,
        checksums: &Checksums,
    ) -> std::result::Result<(), TransportError> {
        let target = DeployTarget {
            url: artifact_url(
                &self.base_uri,
                repository,
                artifact.path(),
                artifact.properties(),
            ),
            sha1: checksums.sha1().to_owned(),
            md5: checksums.md5().to_owned(),
        };

        if artifact.size() <= CHECKSUM_THRESHOLD {
            return self.deploy_using_content(&target, artifact);
        }

        match ChecksumOutcome::classify(self.transport.deploy_by_checksum(&target)) {
            ChecksumOutcome::Accepted => {
                debug!("Deployed {} by checksum", artifact.path());
                Ok(())
            }
            ChecksumOutcome::Rejected(err) => {
                debug!(
                    "Checksum deploy of {} rejected ({err}), uploading content",
                    artifact.path()
                );
                self.deploy_using_content(&target, artifact)
            }
            ChecksumOutcome::Failed(err) => Err(err),
        }
    }

    fn deploy_using_content(
        &self,
        target: &DeployTarget,
        artifact: &DeployableArtifact,
    ) -> std::result::Result<(), TransportError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match UploadOutcome::classify(self.transport.deploy_content(target, artifact)) {
                UploadOutcome::Success => return Ok(()),
                UploadOutcome::Retriable(err) if attempt < MAX_CONTENT_ATTEMPTS => {
                    let response = err
                        .status()
                        .map_or_else(|| "no".to_owned(), |status| status.to_string());
                    warn!(
                        "Deploy failed with {response} response. Retrying in {}ms.",
                        self.retry_delay.as_millis()
                    );
                    thread::sleep(self.retry_delay);
                }
                UploadOutcome::Retriable(err) | UploadOutcome::Fatal(err) => return Err(err),
            }
        }
    }
}

impl Artifactory for ArtifactUploader {
    fn deploy(&self, repository: &str, artifact: &DeployableArtifact) -> Result<()> {
        let checksums = artifact
            .checksums()
            .map_err(|source| DeployError::ArtifactRead {
                path: artifact.path().to_owned(),
                source,
            })?;
        self.upload(repository, artifact, checksums)
            .map_err(|source| DeployError::ArtifactDeploy {
                path: artifact.path().to_owned(),
                checksums: checksums.clone(),
                source,
            })
    }

    fn add_build_run(
        &self,
        project: Option<&str>,
        build_name: &str,
        build_run: &BuildRun,
    ) -> Result<()> {
        debug!("Adding {build_name} build {}", build_run.number());
        if let Some(project) = project {
            debug!("Publishing to project {project}");
        }
        let url = build_url(&self.base_uri, project);
        debug!("Publishing build info to {url}");
        self.transport
            .register_build_run(&url, &BuildInfo::new(build_name, build_run))
            .map_err(|source| DeployError::BuildRun {
                name: build_name.to_owned(),
                number: build_run.number(),
                source,
            })
    }
}

#[cfg(test)]
#[path = "uploader_tests.rs"]
mod tests;
