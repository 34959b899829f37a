//! Build-run records and the JSON payload registered with Artifactory.
//!
//! A [`BuildRun`] is assembled once per deployment after every artifact has
//! been uploaded. [`BuildInfo`] is its wire form, serialised with camelCase
//! keys as the `PUT /api/build` endpoint expects.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Name reported for the CI server that performed the build.
pub const CI_AGENT_NAME: &str = "GitHub Actions";

/// Name reported for the agent that deployed the build.
pub const BUILD_AGENT_NAME: &str = "Artifactory Action";

/// `started` timestamp layout: millisecond precision, always UTC.
const STARTED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// A single artifact entry within a build module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildArtifact {
    #[serde(rename = "type")]
    kind: String,
    sha1: String,
    md5: String,
    name: String,
}

impl BuildArtifact {
    /// Create an artifact record.
    #[must_use]
    pub fn new(
        kind: impl Into<String>,
        sha1: impl Into<String>,
        md5: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            sha1: sha1.into(),
            md5: md5.into(),
            name: name.into(),
        }
    }

    /// The artifact type, e.g. `jar`, `pom` or `java-source-jar`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// SHA-1 of the artifact content.
    #[must_use]
    pub fn sha1(&self) -> &str {
        &self.sha1
    }

    /// MD5 of the artifact content.
    #[must_use]
    pub fn md5(&self) -> &str {
        &self.md5
    }

    /// File name of the artifact.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A module (`group:artifact:version`) and the artifacts deployed for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildModule {
    id: String,
    artifacts: Vec<BuildArtifact>,
}

impl BuildModule {
    /// Create a module record.
    #[must_use]
    pub fn new(id: impl Into<String>, artifacts: Vec<BuildArtifact>) -> Self {
        Self {
            id: id.into(),
            artifacts,
        }
    }

    /// The module identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Artifacts in first-seen order.
    #[must_use]
    pub fn artifacts(&self) -> &[BuildArtifact] {
        &self.artifacts
    }
}

/// One deployment of a named build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRun {
    number: u64,
    started: DateTime<Utc>,
    uri: Option<String>,
    modules: Vec<BuildModule>,
}

impl BuildRun {
    /// Create a build run.
    #[must_use]
    pub const fn new(
        number: u64,
        started: DateTime<Utc>,
        uri: Option<String>,
        modules: Vec<BuildModule>,
    ) -> Self {
        Self {
            number,
            started,
            uri,
            modules,
        }
    }

    /// The build number.
    #[must_use]
    pub const fn number(&self) -> u64 {
        self.number
    }

    /// When the deployment started.
    #[must_use]
    pub const fn started(&self) -> DateTime<Utc> {
        self.started
    }

    /// Link to the build on the CI server.
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Modules produced by the build.
    #[must_use]
    pub fn modules(&self) -> &[BuildModule] {
        &self.modules
    }
}

/// The CI server that ran the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CiAgent {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

impl Default for CiAgent {
    fn default() -> Self {
        Self {
            name: CI_AGENT_NAME.to_owned(),
            version: None,
        }
    }
}

/// The tool that performed the deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildAgent {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

impl Default for BuildAgent {
    fn default() -> Self {
        Self {
            name: BUILD_AGENT_NAME.to_owned(),
            version: Some(env!("CARGO_PKG_VERSION").to_owned()),
        }
    }
}

/// Payload of the build-run registration request.
///
/// # Examples
///
/// ```
/// use artifactory_deployer::build_info::{BuildInfo, BuildRun};
/// use chrono::{TimeZone, Utc};
///
/// let started = Utc.timestamp_millis_opt(1_709_636_966_123).unwrap();
/// let run = BuildRun::new(5, started, None, Vec::new());
/// let json = serde_json::to_value(BuildInfo::new("my-build", &run)).unwrap();
///
/// assert_eq!(json["number"], "5");
/// assert_eq!(json["started"], "2024-03-05T11:09:26.123Z");
/// assert!(json["url"].is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    name: String,
    number: String,
    agent: CiAgent,
    build_agent: BuildAgent,
    #[serde(serialize_with = "serialize_started")]
    started: DateTime<Utc>,
    url: Option<String>,
    modules: Vec<BuildModule>,
}

impl BuildInfo {
    /// Describe `run` as a build of `build_name`.
    #[must_use]
    pub fn new(build_name: &str, run: &BuildRun) -> Self {
        Self {
            name: build_name.to_owned(),
            number: run.number().to_string(),
            agent: CiAgent::default(),
            build_agent: BuildAgent::default(),
            started: run.started(),
            url: run.uri().map(str::to_owned),
            modules: run.modules().to_vec(),
        }
    }

    /// The build name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The build number as sent on the wire.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Modules included in the payload.
    #[must_use]
    pub fn modules(&self) -> &[BuildModule] {
        &self.modules
    }
}

fn serialize_started<S: Serializer>(
    started: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&started.format(STARTED_FORMAT))
}
