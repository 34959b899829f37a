//! CLI argument definitions for the deploy tool.
//!
//! Every setting can also come from the environment or from the TOML file
//! named by `--config`. Flags and environment variables override the file.

use camino::Utf8PathBuf;
use clap::Parser;

/// Deploy a folder of Maven build outputs to Artifactory as a build run.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "artifactory-deploy")]
#[command(version, about)]
#[command(after_help = concat!(
    "ARTIFACT PROPERTIES:\n",
    "  One rule per line in the form <includes>:<excludes>:<properties>, where\n",
    "  includes and excludes are comma-separated globs and properties are\n",
    "  comma-separated key=value pairs. For example:\n",
    "    /**/*.zip::zip.type=docs,zip.deployed=false\n\n",
    "EXAMPLES:\n",
    "  Deploy using a configuration file:\n",
    "    $ artifactory-deploy --config deploy.toml\n\n",
    "  Deploy with four upload threads:\n",
    "    $ artifactory-deploy --config deploy.toml --threads 4\n",
))]
pub struct Cli {
    /// TOML configuration file.
    #[arg(short, long, value_name = "FILE", env = "ARTIFACTORY_DEPLOY_CONFIG")]
    pub config: Option<Utf8PathBuf>,

    /// Artifactory server URI.
    #[arg(long, value_name = "URI", env = "ARTIFACTORY_SERVER_URI")]
    pub uri: Option<String>,

    /// Username for basic authentication.
    #[arg(long, value_name = "USER", env = "ARTIFACTORY_SERVER_USERNAME")]
    pub username: Option<String>,

    /// Password for basic authentication.
    #[arg(
        long,
        value_name = "PASSWORD",
        env = "ARTIFACTORY_SERVER_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// ASCII-armoured secret key used to sign artifacts.
    #[arg(
        long,
        value_name = "KEY",
        env = "ARTIFACTORY_SIGNING_KEY",
        hide_env_values = true
    )]
    pub signing_key: Option<String>,

    /// Passphrase of the signing key.
    #[arg(
        long,
        value_name = "PASSPHRASE",
        env = "ARTIFACTORY_SIGNING_PASSPHRASE",
        hide_env_values = true
    )]
    pub signing_passphrase: Option<String>,

    /// Artifactory project the build run belongs to.
    #[arg(long, value_name = "PROJECT", env = "ARTIFACTORY_DEPLOY_PROJECT")]
    pub project: Option<String>,

    /// Folder to deploy, laid out as a Maven repository.
    #[arg(short, long, value_name = "DIR", env = "ARTIFACTORY_DEPLOY_FOLDER")]
    pub folder: Option<Utf8PathBuf>,

    /// Target repository.
    #[arg(short, long, value_name = "REPO", env = "ARTIFACTORY_DEPLOY_REPOSITORY")]
    pub repository: Option<String>,

    /// Number of upload threads [default: 1].
    #[arg(short, long, value_name = "N", env = "ARTIFACTORY_DEPLOY_THREADS")]
    pub threads: Option<usize>,

    /// Seconds to wait between content upload attempts [default: 5].
    #[arg(long, value_name = "SECONDS", env = "ARTIFACTORY_DEPLOY_RETRY_DELAY")]
    pub retry_delay: Option<u64>,

    /// Build name.
    #[arg(long, value_name = "NAME", env = "ARTIFACTORY_DEPLOY_BUILD_NAME")]
    pub build_name: Option<String>,

    /// Build number.
    #[arg(long, value_name = "NUMBER", env = "ARTIFACTORY_DEPLOY_BUILD_NUMBER")]
    pub build_number: Option<u64>,

    /// Link to the CI run that produced the build.
    #[arg(long, value_name = "URI", env = "ARTIFACTORY_DEPLOY_BUILD_URI")]
    pub build_uri: Option<String>,

    /// Artifact property rules, one per line.
    #[arg(
        long,
        value_name = "RULES",
        env = "ARTIFACTORY_DEPLOY_ARTIFACT_PROPERTIES"
    )]
    pub artifact_properties: Option<String>,

    /// Log every per-file decision.
    #[arg(short, long)]
    pub verbose: bool,
}
