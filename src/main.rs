//! Deploy tool entrypoint.
//!
//! Resolves configuration, wires the HTTP uploader, file-system scanner and
//! optional gpg signer into a deployer, then runs it once.

use artifactory_deploy::AppError;
use artifactory_deploy::cli::Cli;
use artifactory_deploy::config::{DeployConfig, ResolvedConfig};
use artifactory_deploy::logging;
use artifactory_deployer::command::SystemCommandExecutor;
use artifactory_deployer::deploy::Deployer;
use artifactory_deployer::error::DeployError;
use artifactory_deployer::repository::{ArtifactUploader, HttpTransport};
use artifactory_deployer::scanner::FileSystemScanner;
use artifactory_deployer::signing::GpgSigner;
use clap::Parser;
use std::error::Error as _;
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let mut stderr = std::io::stderr();
    let run_result = run(&cli);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let resolved = DeployConfig::from_cli(cli)?.validate(cli.artifact_properties.as_deref())?;
    deploy(&resolved)
}

fn deploy(resolved: &ResolvedConfig) -> Result<(), AppError> {
    let settings = &resolved.settings;
    let transport = HttpTransport::new(resolved.credentials.as_ref());
    let uploader = ArtifactUploader::new(Box::new(transport), &settings.server_uri)
        .with_retry_delay(resolved.retry_delay);
    let deployer = Deployer::new(settings, &uploader, &FileSystemScanner);

    match &resolved.signing {
        Some(key) => {
            let signer = GpgSigner::new(
                Box::new(SystemCommandExecutor),
                &key.key,
                &key.passphrase,
            )
            .map_err(DeployError::from)?;
            deployer.with_signer(&signer).deploy()?;
        }
        None => {
            deployer.deploy()?;
        }
    }
    Ok(())
}

fn exit_code_for_run_result(result: Result<(), AppError>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            let mut source = err.source();
            while let Some(cause) = source {
                write_stderr_line(stderr, format!("  caused by: {cause}"));
                source = cause.source();
            }
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort reporting; ignore write failures.
    }
}
