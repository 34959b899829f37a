//! Detached signatures for deployed artifacts.
//!
//! [`ArtifactSigner`] derives one `.asc` artifact per batched artifact and
//! adds them as the [`Category::Signature`] batch, so signatures are always
//! deployed after the files they sign. The signing primitive itself sits
//! behind the [`Signer`] trait; [`GpgSigner`] implements it by running
//! `gpg` against a private keyring.

use crate::artifact::{ArtifactProperties, DeployableArtifact};
use crate::batch::{Batches, Category, SIGNATURE_SUFFIX};
use crate::command::{CommandExecutor, failure_summary};
use camino::Utf8PathBuf;
use log::debug;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::TempDir;
use thiserror::Error;

/// Name of the GnuPG executable.
pub const GPG: &str = "gpg";

/// Errors raised while signing artifacts.
#[derive(Debug, Error)]
pub enum SigningError {
    /// The batches already contain signature files.
    #[error("Files must not already be signed")]
    AlreadySigned,

    /// No signing key was supplied.
    #[error("signing key is empty")]
    EmptyKey,

    /// The content of an artifact could not be read for signing.
    #[error("failed to read {path} for signing")]
    Read {
        /// Repository path of the artifact.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The private keyring directory could not be prepared or used.
    #[error("failed to prepare signing workspace")]
    Workspace(#[source] io::Error),

    /// The temporary keyring directory is not valid UTF-8.
    #[error("signing workspace '{}' is not valid UTF-8", path.display())]
    NonUtf8Workspace {
        /// The offending directory.
        path: PathBuf,
    },

    /// `gpg` could not be started.
    #[error("failed to run gpg to {operation}")]
    Spawn {
        /// What gpg was asked to do.
        operation: &'static str,
        /// The spawn error.
        #[source]
        source: io::Error,
    },

    /// `gpg` exited unsuccessfully.
    #[error("gpg failed to {operation}: {message}")]
    Gpg {
        /// What gpg was asked to do.
        operation: &'static str,
        /// The last diagnostic gpg printed.
        message: String,
    },
}

/// Result type alias using [`SigningError`].
pub type Result<T> = std::result::Result<T, SigningError>;

/// Produces an ASCII-armoured detached signature over a byte stream.
pub trait Signer: Send + Sync {
    /// Sign everything readable from `content`.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be read or signing fails.
    fn sign(&self, content: &mut dyn Read) -> Result<Vec<u8>>;
}

/// Adds signature artifacts to a set of batches.
pub struct ArtifactSigner<'a> {
    signer: &'a dyn Signer,
    build_properties: &'a ArtifactProperties,
}

impl<'a> ArtifactSigner<'a> {
    /// Create a signer whose signature artifacts carry `build_properties`.
    #[must_use]
    pub const fn new(signer: &'a dyn Signer, build_properties: &'a ArtifactProperties) -> Self {
        Self {
            signer,
            build_properties,
        }
    }

    /// Sign every batched artifact, in category order, and store the
    /// signatures as the [`Category::Signature`] batch.
    ///
    /// Signature artifacts carry the build properties rather than the
    /// per-artifact properties of the file they sign.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::AlreadySigned`] if the signature batch is not
    /// empty, or the first error raised while signing.
    pub fn add_signatures(&self, batches: &mut Batches) -> Result<()> {
        if !batches.get(Category::Signature).is_empty() {
            return Err(SigningError::AlreadySigned);
        }
        let signatures = batches
            .artifacts()
            .map(|artifact| self.signature_of(artifact))
            .collect::<Result<Vec<_>>>()?;
        batches.replace(Category::Signature, signatures);
        Ok(())
    }

    fn signature_of(&self, artifact: &DeployableArtifact) -> Result<DeployableArtifact> {
        debug!("Signing {}", artifact.path());
        let mut content = artifact.open().map_err(|source| SigningError::Read {
            path: artifact.path().to_owned(),
            source,
        })?;
        let signature = self.signer.sign(&mut content)?;
        Ok(DeployableArtifact::from_bytes(
            format!("{}{SIGNATURE_SUFFIX}", artifact.path()),
            signature,
            self.build_properties.clone(),
        ))
    }
}

/// [`Signer`] backed by `gpg` and a throwaway keyring.
///
/// The secret key is imported into a private `GNUPGHOME` that is removed
/// when the signer is dropped. The passphrase is handed to gpg through a
/// file inside that directory.
pub struct GpgSigner {
    executor: Box<dyn CommandExecutor>,
    // Held so the keyring outlives the signer.
    _home: TempDir,
    home_path: Utf8PathBuf,
    passphrase_file: Utf8PathBuf,
    sequence: AtomicU64,
}

impl GpgSigner {
    /// Import the armoured secret `key` into a fresh keyring.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty, the keyring directory cannot
    /// be prepared, or gpg fails to import the key.
    pub fn new(executor: Box<dyn CommandExecutor>, key: &str, passphrase: &str) -> Result<Self> {
        if key.trim().is_empty() {
            return Err(SigningError::EmptyKey);
        }
        let home = tempfile::Builder::new()
            .prefix("artifactory-deploy-gnupg")
            .tempdir()
            .map_err(SigningError::Workspace)?;
        let home_path = Utf8PathBuf::from_path_buf(home.path().to_path_buf())
            .map_err(|path| SigningError::NonUtf8Workspace { path })?;

        let key_file = home_path.join("signing-key.asc");
        fs::write(&key_file, key).map_err(SigningError::Workspace)?;
        let passphrase_file = home_path.join("passphrase");
        fs::write(&passphrase_file, passphrase).map_err(SigningError::Workspace)?;

        let signer = Self {
            executor,
            _home: home,
            home_path,
            passphrase_file,
            sequence: AtomicU64::new(0),
        };
        signer.gpg("import the signing key", &["--import", key_file.as_str()])?;
        fs::remove_file(&key_file).map_err(SigningError::Workspace)?;
        debug!("Imported signing key into {}", signer.home_path);
        Ok(signer)
    }

    fn gpg(&self, operation: &'static str, args: &[&str]) -> Result<()> {
        let mut full_args = vec!["--homedir", self.home_path.as_str(), "--batch"];
        full_args.extend_from_slice(args);
        let output = self
            .executor
            .run(GPG, &full_args)
            .map_err(|source| SigningError::Spawn { operation, source })?;
        if output.status.success() {
            Ok(())
        } else {
            Err(SigningError::Gpg {
                operation,
                message: failure_summary(&output),
            })
        }
    }
}

impl Signer for GpgSigner {
    fn sign(&self, content: &mut dyn Read) -> Result<Vec<u8>> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        let input = self.home_path.join(format!("content-{id}"));
        let output = self.home_path.join(format!("content-{id}{SIGNATURE_SUFFIX}"));

        let mut file = File::create(&input).map_err(SigningError::Workspace)?;
        io::copy(content, &mut file).map_err(SigningError::Workspace)?;
        drop(file);

        self.gpg(
            "sign",
            &[
                "--yes",
                "--pinentry-mode",
                "loopback",
                "--passphrase-file",
                self.passphrase_file.as_str(),
                "--armor",
                "--detach-sign",
                "--output",
                output.as_str(),
                input.as_str(),
            ],
        )?;
        let signature = fs::read(&output).map_err(SigningError::Workspace)?;
        fs::remove_file(&input).map_err(SigningError::Workspace)?;
        fs::remove_file(&output).map_err(SigningError::Workspace)?;
        Ok(signature)
    }
}

#[cfg(test)]
#[path = "signing_tests.rs"]
mod tests;
