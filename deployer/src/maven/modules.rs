//! Build-info module synthesis from deployed artifacts.
//!
//! Every artifact whose path follows the Maven layout contributes a typed
//! [`BuildArtifact`] to the module named by its coordinates. Artifacts
//! outside the layout are still deployed but are left out of the manifest.

use super::Coordinates;
use crate::artifact::DeployableArtifact;
use crate::build_info::{BuildArtifact, BuildModule};
use log::debug;
use std::collections::HashMap;
use std::io;

/// Extensions of checksum sidecar files, which never become artifacts.
const CHECKSUM_EXTENSIONS: &[&str] = &["md5", "sha", "sha1", "sha256", "sha512"];

/// Groups deployed artifacts into build-info modules.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildModulesGenerator;

impl BuildModulesGenerator {
    /// Build the module list for `artifacts`.
    ///
    /// Modules appear in the order their first artifact was seen, and
    /// artifacts keep their input order within a module. An input with no
    /// Maven-layout paths yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if an artifact's checksums must be calculated and
    /// its content cannot be read.
    pub fn build_modules(&self, artifacts: &[DeployableArtifact]) -> io::Result<Vec<BuildModule>> {
        let mut order: Vec<(String, Vec<BuildArtifact>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for artifact in artifacts {
            let Some(coordinates) = Coordinates::from_path(artifact.path()) else {
                debug!("Skipping {} in build info: not a Maven layout path", artifact.path());
                continue;
            };
            if CHECKSUM_EXTENSIONS.contains(&coordinates.extension()) {
                continue;
            }

            let checksums = artifact.checksums()?;
            let entry = BuildArtifact::new(
                artifact_type(&coordinates),
                checksums.sha1(),
                checksums.md5(),
                artifact.file_name(),
            );

            let id = coordinates.module_id();
            let slot = *index.entry(id.clone()).or_insert_with(|| {
                order.push((id, Vec::new()));
                order.len() - 1
            });
            if let Some((_, module_artifacts)) = order.get_mut(slot) {
                module_artifacts.push(entry);
            }
        }

        Ok(order
            .into_iter()
            .map(|(id, artifacts)| BuildModule::new(id, artifacts))
            .collect())
    }
}

fn artifact_type(coordinates: &Coordinates) -> &str {
    match (coordinates.extension(), coordinates.classifier()) {
        ("pom", _) => "pom",
        ("jar", Some("sources")) => "java-source-jar",
        (extension, _) => extension,
    }
}
