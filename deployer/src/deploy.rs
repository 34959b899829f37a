//! Deployment orchestration.
//!
//! A [`Deployer`] turns the deploy folder into one build run: it scans and
//! filters the folder, attaches build and rule properties, collapses
//! timestamped snapshots, batches by category, optionally signs, uploads
//! each batch through a bounded worker pool and finally registers the
//! build run.

use crate::artifact::{ArtifactProperties, DeployableArtifact};
use crate::batch::{Batches, Category, Normaliser};
use crate::build_info::BuildRun;
use crate::error::{DeployError, Result};
use crate::maven::BuildModulesGenerator;
use crate::repository::Artifactory;
use crate::rules::PropertyRule;
use crate::scanner::{DirectoryScanner, deploy_path, is_empty_dir};
use crate::signing::{ArtifactSigner, Signer};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::io::ErrorKind;
use std::sync::{Mutex, PoisonError};

/// Default number of upload worker threads.
pub const DEFAULT_THREADS: usize = 1;

/// Identity of the build run being published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    /// Build name.
    pub name: String,
    /// Build number.
    pub number: u64,
    /// Link back to the CI run, if known.
    pub uri: Option<String>,
}

/// Everything a deployment needs apart from its collaborators.
#[derive(Debug, Clone)]
pub struct DeploySettings {
    /// Artifactory server URI, used for progress reporting.
    pub server_uri: String,
    /// Artifactory project the build run belongs to.
    pub project: Option<String>,
    /// Folder holding the files to deploy, in Maven repository layout.
    pub folder: Utf8PathBuf,
    /// Target repository.
    pub repository: String,
    /// Number of upload worker threads.
    pub threads: usize,
    /// The build run.
    pub build: BuildSettings,
    /// Rules adding properties to matching artifacts.
    pub artifact_properties: Vec<PropertyRule>,
}

/// Runs a deployment against explicitly supplied collaborators.
pub struct Deployer<'a> {
    settings: &'a DeploySettings,
    artifactory: &'a dyn Artifactory,
    scanner: &'a dyn DirectoryScanner,
    signer: Option<&'a dyn Signer>,
}

impl<'a> Deployer<'a> {
    /// Create a deployer that does not sign.
    #[must_use]
    pub const fn new(
        settings: &'a DeploySettings,
        artifactory: &'a dyn Artifactory,
        scanner: &'a dyn DirectoryScanner,
    ) -> Self {
        Self {
            settings,
            artifactory,
            scanner,
            signer: None,
        }
    }

    /// Sign every artifact with `signer` before upload.
    #[must_use]
    pub const fn with_signer(mut self, signer: &'a dyn Signer) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Deploy the folder as a build run started now.
    ///
    /// # Errors
    ///
    /// See [`Deployer::deploy_started_at`].
    pub fn deploy(&self) -> Result<BuildRun> {
        self.deploy_started_at(Utc::now())
    }

    /// Deploy the folder as a build run started at `started`, returning the
    /// registered run.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder is empty or unreadable, nothing is
    /// left to deploy after filtering, signing fails, any upload fails, or
    /// the build run cannot be registered. Artifacts uploaded before a
    /// failure are left in place.
    pub fn deploy_started_at(&self, started: DateTime<Utc>) -> Result<BuildRun> {
        let build = &self.settings.build;
        let build_properties = build_properties(build, started);
        let mut batches = self.batched_artifacts(&build_properties)?;

        if let Some(signer) = self.signer {
            info!("Signing artifacts");
            ArtifactSigner::new(signer, &build_properties).add_signatures(&mut batches)?;
        }
        if batches.is_empty() {
            return Err(DeployError::NothingToDeploy);
        }

        info!(
            "Deploying {} artifacts to {} in {} as build {} of {} using {} thread(s)",
            batches.len(),
            self.settings.repository,
            self.settings.server_uri,
            build.number,
            build.name,
            self.settings.threads
        );
        deploy_batches(
            self.artifactory,
            &self.settings.repository,
            &batches,
            self.settings.threads,
        )?;

        debug!("Adding build run {}", build.number);
        let modules = BuildModulesGenerator
            .build_modules(&batches.into_artifacts())
            .map_err(DeployError::BuildModules)?;
        let build_run = BuildRun::new(build.number, started, build.uri.clone(), modules);
        self.artifactory.add_build_run(
            self.settings.project.as_deref(),
            &build.name,
            &build_run,
        )?;
        debug!("Done");
        Ok(build_run)
    }

    fn batched_artifacts(&self, build_properties: &ArtifactProperties) -> Result<Batches> {
        let root = self.settings.folder.as_path();
        let scan_failed = |source: std::io::Error| DeployError::ScanFailed {
            path: root.to_owned(),
            source,
        };
        let empty = match is_empty_dir(root) {
            Ok(found_empty) => found_empty,
            Err(err) if err.kind() == ErrorKind::NotFound => true,
            Err(err) => return Err(scan_failed(err)),
        };
        if empty {
            return Err(DeployError::EmptyDirectory {
                path: absolute(root),
            });
        }

        debug!("Getting deployable artifacts from {root}");
        let files = self.scanner.scan(root).map_err(scan_failed)?.deployable();
        let entries = files
            .iter()
            .map(|file| {
                deploy_path(root, file)
                    .map(|path| (Category::of(&path), path, file))
                    .ok_or_else(|| DeployError::OutsideRoot {
                        root: root.to_owned(),
                        file: file.to_owned(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut normaliser = Normaliser::new();
        let mut batches = Batches::new();
        for category in Category::ALL {
            for (_, path, file) in entries.iter().filter(|(of, ..)| *of == category) {
                debug!("Including file {file} with path {path}");
                let properties = self.properties_for(path, build_properties);
                let Some(canonical) = normaliser.admit(path) else {
                    continue;
                };
                let artifact = DeployableArtifact::from_file(canonical, file, properties)
                    .map_err(|source| DeployError::ArtifactRead {
                        path: path.clone(),
                        source,
                    })?;
                batches.push(category, artifact);
            }
        }
        Ok(batches)
    }

    /// Build properties overlaid with every matching rule, in rule order.
    /// Rules match against the path as found on disk.
    fn properties_for(&self, path: &str, build_properties: &ArtifactProperties) -> ArtifactProperties {
        let mut properties = build_properties.clone();
        for rule in &self.settings.artifact_properties {
            if rule.matches(path) {
                debug!(
                    "Artifact properties matched, adding properties {}",
                    rule.properties()
                );
                properties.extend_from(rule.properties());
            }
        }
        properties
    }
}

/// Properties attached to every artifact of the run.
fn build_properties(build: &BuildSettings, started: DateTime<Utc>) -> ArtifactProperties {
    [
        ("build.name", build.name.clone()),
        ("build.number", build.number.to_string()),
        ("build.timestamp", started.timestamp_millis().to_string()),
    ]
    .into_iter()
    .collect()
}

fn absolute(path: &Utf8Path) -> Utf8PathBuf {
    path.canonicalize_utf8()
        .ok()
        .or_else(|| {
            std::path::absolute(path)
                .ok()
                .and_then(|resolved| Utf8PathBuf::from_path_buf(resolved).ok())
        })
        .unwrap_or_else(|| path.to_owned())
}

/// Upload `batches` to `repository` one category at a time.
///
/// Each category is uploaded on a pool of `threads` workers and must
/// finish before the next starts. When uploads fail, the rest of the
/// category still runs and the first failure is returned once it has
/// drained. Later categories are not attempted.
///
/// # Errors
///
/// Returns an error if the worker pool cannot be built or any upload fails.
pub fn deploy_batches(
    artifactory: &dyn Artifactory,
    repository: &str,
    batches: &Batches,
    threads: usize,
) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|index| format!("deploy-{index}"))
        .build()
        .map_err(|source| DeployError::WorkerPool { threads, source })?;

    for (category, artifacts) in batches.iter() {
        if artifacts.is_empty() {
            continue;
        }
        debug!("Deploying {category} artifacts");
        let failure: Mutex<Option<DeployError>> = Mutex::new(None);
        pool.scope_fifo(|scope| {
            let first_failure = &failure;
            for artifact in artifacts {
                scope.spawn_fifo(move |_| {
                    if let Err(err) = deploy_artifact(artifactory, repository, artifact) {
                        let mut first = first_failure
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner);
                        if first.is_none() {
                            *first = Some(err);
                        }
                    }
                });
            }
        });
        if let Some(err) = failure.into_inner().unwrap_or_else(PoisonError::into_inner) {
            return Err(err);
        }
    }
    Ok(())
}

fn deploy_artifact(
    artifactory: &dyn Artifactory,
    repository: &str,
    artifact: &DeployableArtifact,
) -> Result<()> {
    let checksums = artifact
        .checksums()
        .map_err(|source| DeployError::ArtifactRead {
            path: artifact.path().to_owned(),
            source,
        })?;
    info!(
        "Deploying {} {} ({}/{})",
        artifact.path(),
        artifact.properties(),
        checksums.sha1(),
        checksums.md5()
    );
    artifactory.deploy(repository, artifact)
}

#[cfg(test)]
#[path = "deploy_tests.rs"]
mod tests;
