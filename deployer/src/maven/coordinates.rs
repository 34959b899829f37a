//! Maven coordinates derived from repository paths.
//!
//! A Maven repository stores an artifact at
//! `group/segments/artifactId/version/artifactId-version[-classifier].ext`.
//! Parsing is purely positional: a path that does not follow the layout has
//! no coordinates, which callers treat as "not a module artifact" rather
//! than as an error.

use std::fmt;

/// Suffix marking a snapshot version folder.
const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Digits in the date part of a snapshot timestamp (`yyyyMMdd`).
const TIMESTAMP_DATE_DIGITS: usize = 8;

/// Digits in the time part of a snapshot timestamp (`HHmmss`).
const TIMESTAMP_TIME_DIGITS: usize = 6;

/// How a version should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionKind {
    /// A fixed release version such as `1.0.0`.
    Release,
    /// A snapshot whose file name uses the literal `-SNAPSHOT` version.
    Snapshot,
    /// A snapshot whose file name carries a deploy timestamp and build
    /// number, e.g. `1.0.0-20240305.110926-1`.
    TimestampedSnapshot,
}

/// Structured identity of a file in a Maven repository layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinates {
    group_id: String,
    artifact_id: String,
    version: String,
    classifier: Option<String>,
    extension: String,
    version_kind: VersionKind,
    snapshot_version: Option<String>,
}

impl Coordinates {
    /// Parse coordinates from a slash-delimited repository path.
    ///
    /// Returns `None` when the path does not follow the Maven layout.
    ///
    /// # Examples
    ///
    /// ```
    /// use artifactory_deployer::maven::{Coordinates, VersionKind};
    ///
    /// let coordinates =
    ///     Coordinates::from_path("/com/example/foo/1.0.0-SNAPSHOT/foo-1.0.0-20240305.110926-1-sources.jar")
    ///         .expect("maven layout");
    /// assert_eq!(coordinates.group_id(), "com.example");
    /// assert_eq!(coordinates.classifier(), Some("sources"));
    /// assert_eq!(coordinates.version_kind(), VersionKind::TimestampedSnapshot);
    /// assert_eq!(coordinates.snapshot_version(), Some("1.0.0-20240305.110926-1"));
    ///
    /// assert!(Coordinates::from_path("/foo-1.0.0.zip").is_none());
    /// ```
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let (file_name, rest) = segments.split_last()?;
        let (version, rest) = rest.split_last()?;
        let (artifact_id, group) = rest.split_last()?;
        if group.is_empty() {
            return None;
        }

        let name = file_name.strip_prefix(artifact_id)?.strip_prefix('-')?;
        let (version_kind, snapshot_version, remainder) = split_version(version, name)?;
        let (classifier, extension) = split_classifier_and_extension(remainder)?;

        Some(Self {
            group_id: group.join("."),
            artifact_id: (*artifact_id).to_owned(),
            version: (*version).to_owned(),
            classifier: classifier.map(str::to_owned),
            extension: extension.to_owned(),
            version_kind,
            snapshot_version,
        })
    }

    /// The dotted group identifier.
    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// The artifact identifier.
    #[must_use]
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// The version folder, e.g. `1.0.0` or `1.0.0-SNAPSHOT`.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The classifier (`sources`, `javadoc`, ...), if any.
    #[must_use]
    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    /// The text after the final dot of the file name.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// How the version should be interpreted.
    #[must_use]
    pub const fn version_kind(&self) -> VersionKind {
        self.version_kind
    }

    /// The timestamped version used in the file name, present only for
    /// [`VersionKind::TimestampedSnapshot`].
    #[must_use]
    pub fn snapshot_version(&self) -> Option<&str> {
        self.snapshot_version.as_deref()
    }

    /// The build-info module identifier, `group:artifact:version`.
    #[must_use]
    pub fn module_id(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.module_id())?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, "@{}", self.extension)
    }
}

/// Match the version component at the start of `name`, returning the kind,
/// the literal timestamped version (if any) and the remaining text.
fn split_version<'a>(
    version: &str,
    name: &'a str,
) -> Option<(VersionKind, Option<String>, &'a str)> {
    let Some(base) = version.strip_suffix(SNAPSHOT_SUFFIX) else {
        let remainder = name.strip_prefix(version)?;
        return Some((VersionKind::Release, None, remainder));
    };

    if let Some(remainder) = name.strip_prefix(version) {
        return Some((VersionKind::Snapshot, None, remainder));
    }

    let stamped = name.strip_prefix(base)?.strip_prefix('-')?;
    let (stamp, remainder) = stamped.split_at_checked(timestamp_len(stamped)?)?;
    Some((
        VersionKind::TimestampedSnapshot,
        Some(format!("{base}-{stamp}")),
        remainder,
    ))
}

/// Length of a leading `yyyyMMdd.HHmmss-buildNumber` stamp, if present.
fn timestamp_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let time_start = TIMESTAMP_DATE_DIGITS + 1;
    let build_start = time_start + TIMESTAMP_TIME_DIGITS + 1;

    let all_digits = |digits: &[u8]| digits.iter().all(u8::is_ascii_digit);
    if !all_digits(bytes.get(..TIMESTAMP_DATE_DIGITS)?)
        || bytes.get(TIMESTAMP_DATE_DIGITS) != Some(&b'.')
        || !all_digits(bytes.get(time_start..build_start - 1)?)
        || bytes.get(build_start - 1) != Some(&b'-')
    {
        return None;
    }

    let build_digits = bytes
        .get(build_start..)?
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    (build_digits > 0).then_some(build_start + build_digits)
}

/// Split `[-classifier].ext` (the extension may be compound, e.g.
/// `.jar.asc`) into its classifier and final extension.
fn split_classifier_and_extension(remainder: &str) -> Option<(Option<&str>, &str)> {
    let (stem, extension) = remainder.rsplit_once('.')?;
    if extension.is_empty() {
        return None;
    }
    if stem.is_empty() || stem.starts_with('.') {
        return Some((None, extension));
    }
    let classified = stem.strip_prefix('-')?;
    let classifier = classified.split('.').next().unwrap_or(classified);
    if classifier.is_empty() {
        return None;
    }
    Some((Some(classifier), extension))
}

#[cfg(test)]
#[path = "coordinates_tests.rs"]
mod tests;
