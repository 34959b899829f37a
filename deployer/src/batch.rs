//! Deployment categories, snapshot normalisation and ordered batches.
//!
//! Artifacts are uploaded one category at a time in the order of
//! [`Category::ALL`]. Signatures always come last because they are derived
//! from the artifacts deployed before them.

use crate::artifact::DeployableArtifact;
use crate::maven::{Coordinates, VersionKind};
use log::debug;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

/// Suffix of detached ASCII-armoured signature files.
pub const SIGNATURE_SUFFIX: &str = ".asc";

/// Deployment category of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Main artifacts: Maven-layout files with no classifier.
    Primary,
    /// Project object model files.
    Pom,
    /// Classified artifacts and anything outside the Maven layout.
    Classified,
    /// Detached signatures.
    Signature,
}

impl Category {
    /// Every category, in deployment order.
    pub const ALL: [Self; 4] = [Self::Primary, Self::Pom, Self::Classified, Self::Signature];

    /// Categorise a repository path.
    ///
    /// # Examples
    ///
    /// ```
    /// use artifactory_deployer::batch::Category;
    ///
    /// assert_eq!(Category::of("/com/example/foo/1.0/foo-1.0.jar"), Category::Primary);
    /// assert_eq!(Category::of("/com/example/foo/1.0/foo-1.0.pom"), Category::Pom);
    /// assert_eq!(Category::of("/com/example/foo/1.0/foo-1.0-sources.jar"), Category::Classified);
    /// assert_eq!(Category::of("/com/example/foo/1.0/foo-1.0.jar.asc"), Category::Signature);
    /// assert_eq!(Category::of("/notes.txt"), Category::Classified);
    /// ```
    #[must_use]
    pub fn of(path: &str) -> Self {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        if file_name.to_ascii_lowercase().ends_with(SIGNATURE_SUFFIX) {
            return Self::Signature;
        }
        if file_name.rsplit_once('.').is_some_and(|(_, ext)| ext == "pom") {
            return Self::Pom;
        }
        match Coordinates::from_path(path) {
            Some(coordinates) if coordinates.classifier().is_none() => Self::Primary,
            _ => Self::Classified,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Primary => "primary",
            Self::Pom => "pom",
            Self::Classified => "classified",
            Self::Signature => "signature",
        };
        f.write_str(name)
    }
}

/// Artifacts grouped by category.
#[derive(Debug, Default)]
pub struct Batches {
    primary: Vec<DeployableArtifact>,
    pom: Vec<DeployableArtifact>,
    classified: Vec<DeployableArtifact>,
    signature: Vec<DeployableArtifact>,
}

impl Batches {
    /// Create an empty set of batches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, category: Category) -> &mut Vec<DeployableArtifact> {
        match category {
            Category::Primary => &mut self.primary,
            Category::Pom => &mut self.pom,
            Category::Classified => &mut self.classified,
            Category::Signature => &mut self.signature,
        }
    }

    /// Append an artifact to a category.
    pub fn push(&mut self, category: Category, artifact: DeployableArtifact) {
        self.slot_mut(category).push(artifact);
    }

    /// Replace the contents of a category.
    pub fn replace(&mut self, category: Category, artifacts: Vec<DeployableArtifact>) {
        *self.slot_mut(category) = artifacts;
    }

    /// Artifacts in a category.
    #[must_use]
    pub fn get(&self, category: Category) -> &[DeployableArtifact] {
        match category {
            Category::Primary => &self.primary,
            Category::Pom => &self.pom,
            Category::Classified => &self.classified,
            Category::Signature => &self.signature,
        }
    }

    /// Iterate over every category in deployment order, including empty
    /// ones.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[DeployableArtifact])> {
        Category::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }

    /// Every artifact, flattened in deployment order.
    pub fn artifacts(&self) -> impl Iterator<Item = &DeployableArtifact> {
        self.iter().flat_map(|(_, artifacts)| artifacts)
    }

    /// Consume the batches, returning every artifact in deployment order.
    #[must_use]
    pub fn into_artifacts(self) -> Vec<DeployableArtifact> {
        [self.primary, self.pom, self.classified, self.signature]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Total number of artifacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().map(|(_, artifacts)| artifacts.len()).sum()
    }

    /// Returns true when no category holds an artifact.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, artifacts)| artifacts.is_empty())
    }
}

/// Collapse a timestamped snapshot path to its `-SNAPSHOT` form.
///
/// Paths of any other kind are returned unchanged.
///
/// # Examples
///
/// ```
/// use artifactory_deployer::batch::canonical_path;
///
/// assert_eq!(
///     canonical_path("/com/example/foo/1.0.0-SNAPSHOT/foo-1.0.0-20240305.110926-1.jar"),
///     "/com/example/foo/1.0.0-SNAPSHOT/foo-1.0.0-SNAPSHOT.jar",
/// );
/// assert_eq!(canonical_path("/foo-1.0.0.zip"), "/foo-1.0.0.zip");
/// ```
#[must_use]
pub fn canonical_path(path: &str) -> Cow<'_, str> {
    let Some(coordinates) = Coordinates::from_path(path) else {
        return Cow::Borrowed(path);
    };
    match (coordinates.version_kind(), coordinates.snapshot_version()) {
        (VersionKind::TimestampedSnapshot, Some(stamped)) => {
            Cow::Owned(path.replace(stamped, coordinates.version()))
        }
        _ => Cow::Borrowed(path),
    }
}

/// Tracks canonical paths so each is deployed at most once.
#[derive(Debug, Default)]
pub struct Normaliser {
    seen: HashSet<String>,
}

impl Normaliser {
    /// Create a normaliser with nothing seen.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalise `path`, returning `None` if the canonical path has
    /// already been admitted.
    pub fn admit(&mut self, path: &str) -> Option<String> {
        let canonical = canonical_path(path);
        if canonical != path {
            debug!("Stripped timestamp version {path} to {canonical}");
        }
        if self.seen.contains(canonical.as_ref()) {
            debug!("Skipping {path}: {canonical} is already included");
            return None;
        }
        let admitted = canonical.into_owned();
        self.seen.insert(admitted.clone());
        Some(admitted)
    }
}
