//! Deploy configuration.
//!
//! Settings are read from an optional TOML file, overridden by command-line
//! flags and environment variables, then validated into the types the
//! deployment engine consumes.
//!
//! ```toml
//! [server]
//! uri = "https://repo.example.com"
//! username = "alice"
//!
//! [deploy]
//! folder = "build/repo"
//! repository = "libs-snapshot-local"
//! threads = 4
//!
//! [deploy.build]
//! name = "my-build"
//! number = 42
//!
//! [[deploy.artifact_properties]]
//! include = ["/**/*.zip"]
//! properties = { "zip.type" = "docs" }
//! ```

use crate::cli::Cli;
use artifactory_deployer::deploy::{BuildSettings, DEFAULT_THREADS, DeploySettings};
use artifactory_deployer::repository::{Credentials, DEFAULT_RETRY_DELAY};
use artifactory_deployer::rules::{PropertyRule, PropertyRuleError};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file '{path}'")]
    Read {
        /// The configuration file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this tool.
    #[error("failed to parse configuration file '{path}'")]
    Parse {
        /// The configuration file.
        path: Utf8PathBuf,
        /// The parse error.
        #[source]
        source: Box<toml::de::Error>,
    },

    /// A required setting has no value.
    #[error("{setting} is required")]
    Missing {
        /// Dotted name of the setting.
        setting: &'static str,
    },

    /// The thread count is zero.
    #[error("artifactory.deploy.threads must be at least 1")]
    NoThreads,

    /// An artifact property rule is invalid.
    #[error(transparent)]
    PropertyRule(#[from] PropertyRuleError),
}

/// Result type alias using [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The configuration file.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    /// Server connection settings.
    pub server: ServerConfig,
    /// Artifact signing settings.
    pub signing: SigningConfig,
    /// What to deploy and where.
    pub deploy: DeployOptions,
}

/// `[server]` table.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Artifactory server URI.
    pub uri: Option<String>,
    /// Username for basic authentication.
    pub username: Option<String>,
    /// Password for basic authentication.
    pub password: Option<String>,
}

/// `[signing]` table.
#[derive(Clone, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SigningConfig {
    /// ASCII-armoured secret key.
    pub key: Option<String>,
    /// Passphrase of the key.
    pub passphrase: Option<String>,
}

impl std::fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningConfig")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// `[deploy]` table.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DeployOptions {
    /// Artifactory project the build run belongs to.
    pub project: Option<String>,
    /// Folder to deploy.
    pub folder: Option<String>,
    /// Target repository.
    pub repository: Option<String>,
    /// Number of upload threads.
    pub threads: usize,
    /// Seconds between content upload attempts.
    pub retry_delay: u64,
    /// `[deploy.build]` table.
    pub build: BuildConfig,
    /// `[[deploy.artifact_properties]]` rules.
    pub artifact_properties: Vec<ArtifactPropertiesConfig>,
}

impl DeployOptions {
    const fn default_threads() -> usize {
        DEFAULT_THREADS
    }

    const fn default_retry_delay() -> u64 {
        DEFAULT_RETRY_DELAY.as_secs()
    }
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            project: None,
            folder: None,
            repository: None,
            threads: Self::default_threads(),
            retry_delay: Self::default_retry_delay(),
            build: BuildConfig::default(),
            artifact_properties: Vec::new(),
        }
    }
}

/// `[deploy.build]` table.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Build name.
    pub name: Option<String>,
    /// Build number.
    pub number: u64,
    /// Link to the CI run.
    pub uri: Option<String>,
}

/// One `[[deploy.artifact_properties]]` rule.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactPropertiesConfig {
    /// Globs a path must match.
    pub include: Vec<String>,
    /// Globs a path must not match.
    pub exclude: Vec<String>,
    /// Properties added to matching artifacts, in declaration order.
    pub properties: IndexMap<String, String>,
}

/// Signing key material.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey {
    /// ASCII-armoured secret key.
    pub key: String,
    /// Passphrase of the key.
    pub passphrase: String,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Validated configuration, ready to drive a deployment.
#[derive(Debug)]
pub struct ResolvedConfig {
    /// Engine settings.
    pub settings: DeploySettings,
    /// Basic-auth credentials, when a username is configured.
    pub credentials: Option<Credentials>,
    /// Signing key, when one is configured.
    pub signing: Option<SigningKey>,
    /// Pause between content upload attempts.
    pub retry_delay: Duration,
}

impl DeployConfig {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not valid.
    pub fn parse(path: &Utf8Path, text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source: Box::new(source),
        })
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Load the file named by `--config`, if any, then apply the other
    /// flags on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be loaded.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply(cli);
        Ok(config)
    }

    /// Override file values with any flags that were given.
    pub fn apply(&mut self, cli: &Cli) {
        fn set<T: Clone>(target: &mut Option<T>, value: Option<&T>) {
            if let Some(given) = value {
                *target = Some(given.clone());
            }
        }

        set(&mut self.server.uri, cli.uri.as_ref());
        set(&mut self.server.username, cli.username.as_ref());
        set(&mut self.server.password, cli.password.as_ref());
        set(&mut self.signing.key, cli.signing_key.as_ref());
        set(&mut self.signing.passphrase, cli.signing_passphrase.as_ref());
        set(&mut self.deploy.project, cli.project.as_ref());
        set(&mut self.deploy.repository, cli.repository.as_ref());
        set(&mut self.deploy.build.name, cli.build_name.as_ref());
        set(&mut self.deploy.build.uri, cli.build_uri.as_ref());
        if let Some(folder) = &cli.folder {
            self.deploy.folder = Some(folder.to_string());
        }
        if let Some(threads) = cli.threads {
            self.deploy.threads = threads;
        }
        if let Some(retry_delay) = cli.retry_delay {
            self.deploy.retry_delay = retry_delay;
        }
        if let Some(number) = cli.build_number {
            self.deploy.build.number = number;
        }
    }

    /// Check required settings and build the engine's inputs.
    ///
    /// `extra_rules` holds rules in the compact line form and is applied
    /// after the rules from the file.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing setting, or for a zero
    /// thread count or an invalid property rule.
    pub fn validate(self, extra_rules: Option<&str>) -> Result<ResolvedConfig> {
        let Self {
            server,
            signing: signing_config,
            deploy,
        } = self;

        let server_uri = required(server.uri, "artifactory.server.uri")?;
        let folder = required(deploy.folder, "artifactory.deploy.folder")?;
        let repository = required(deploy.repository, "artifactory.deploy.repository")?;
        let build_name = required(deploy.build.name, "artifactory.deploy.build.name")?;
        if deploy.threads == 0 {
            return Err(ConfigError::NoThreads);
        }

        let mut artifact_properties = deploy
            .artifact_properties
            .into_iter()
            .map(|rule| {
                PropertyRule::new(
                    rule.include,
                    rule.exclude,
                    rule.properties.into_iter().collect(),
                )
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if let Some(lines) = extra_rules {
            artifact_properties.extend(PropertyRule::parse_lines(lines)?);
        }

        let credentials = has_text(server.username).map(|username| {
            Credentials::new(username, server.password.unwrap_or_default())
        });
        let signing = has_text(signing_config.key).map(|key| SigningKey {
            key,
            passphrase: signing_config.passphrase.unwrap_or_default(),
        });

        Ok(ResolvedConfig {
            settings: DeploySettings {
                server_uri,
                project: has_text(deploy.project),
                folder: Utf8PathBuf::from(folder),
                repository,
                threads: deploy.threads,
                build: BuildSettings {
                    name: build_name,
                    number: deploy.build.number,
                    uri: has_text(deploy.build.uri),
                },
                artifact_properties,
            },
            credentials,
            signing,
            retry_delay: Duration::from_secs(deploy.retry_delay),
        })
    }
}

fn has_text(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn required(value: Option<String>, setting: &'static str) -> Result<String> {
    has_text(value).ok_or(ConfigError::Missing { setting })
}
