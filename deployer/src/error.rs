//! Error types for the deployment engine.
//!
//! This module defines the fatal conditions that terminate a deployment.
//! Recoverable conditions (flaky uploads, checksum deploy rejections) are
//! absorbed inside [`crate::repository`] and never surface here.

use crate::artifact::Checksums;
use crate::repository::TransportError;
use crate::rules::PropertyRuleError;
use crate::signing::SigningError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that abort a deployment.
#[derive(Debug, Error)]
pub enum DeployError {
    /// The deploy folder exists but contains no entries at all.
    #[error("No artifacts found in empty directory '{path}'")]
    EmptyDirectory {
        /// Absolute path of the empty directory.
        path: Utf8PathBuf,
    },

    /// Scanning and filtering left nothing to upload.
    #[error("No artifacts found to deploy")]
    NothingToDeploy,

    /// The deploy folder could not be read.
    #[error("failed to scan directory '{path}'")]
    ScanFailed {
        /// The directory being scanned.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A file found by the scanner does not live under the deploy root.
    #[error("file '{file}' is not inside '{root}'")]
    OutsideRoot {
        /// The deploy root.
        root: Utf8PathBuf,
        /// The offending file.
        file: Utf8PathBuf,
    },

    /// Reading an artifact's content (for checksums or upload) failed.
    #[error("failed to read artifact {path}")]
    ArtifactRead {
        /// Repository path of the artifact.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Uploading an artifact failed with a non-recoverable error or after
    /// exhausting the retry budget.
    #[error("Error deploying artifact {path} with checksums {checksums}")]
    ArtifactDeploy {
        /// Repository path of the artifact.
        path: String,
        /// Checksums declared for the artifact.
        checksums: Checksums,
        /// The transport failure that ended the upload.
        #[source]
        source: TransportError,
    },

    /// Registering the build run failed.
    #[error("failed to add build run {number} of '{name}'")]
    BuildRun {
        /// Build name.
        name: String,
        /// Build number.
        number: u64,
        /// The transport failure.
        #[source]
        source: TransportError,
    },

    /// Deployed artifacts could not be read back to describe the build.
    #[error("failed to read deployed artifacts for build info")]
    BuildModules(#[source] std::io::Error),

    /// Signing the artifacts failed.
    #[error("Unable to sign artifacts")]
    Signing(#[from] SigningError),

    /// An artifact property rule was invalid.
    #[error(transparent)]
    PropertyRule(#[from] PropertyRuleError),

    /// The upload worker pool could not be created.
    #[error("failed to start {threads} deploy worker thread(s)")]
    WorkerPool {
        /// Requested pool size.
        threads: usize,
        /// The pool construction error.
        #[source]
        source: rayon::ThreadPoolBuildError,
    },
}

/// Result type alias using [`DeployError`].
pub type Result<T> = std::result::Result<T, DeployError>;
