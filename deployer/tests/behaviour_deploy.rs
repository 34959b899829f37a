//! Behaviour-driven tests for deploying a build folder.
//!
//! These scenarios drive the real scanner and deployer against a temporary
//! folder, recording repository calls instead of making HTTP requests.

use artifactory_deployer::build_info::BuildRun;
use artifactory_deployer::deploy::{BuildSettings, DeploySettings, Deployer};
use artifactory_deployer::error::DeployError;
use artifactory_deployer::rules::PropertyRule;
use artifactory_deployer::scanner::FileSystemScanner;
use artifactory_deployer::signing::{Signer, SigningError};
use artifactory_deployer::test_utils::{RecordingArtifactory, write_tree};
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::{Cell, RefCell};
use std::io::Read;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Deploy world
// ---------------------------------------------------------------------------

struct DeployWorld {
    // Keep the folder alive for the lifetime of the scenario.
    _dir: TempDir,
    settings: RefCell<DeploySettings>,
    artifactory: RefCell<RecordingArtifactory>,
    signed: Cell<bool>,
    result: RefCell<Option<Result<BuildRun, DeployError>>>,
}

#[fixture]
fn deploy_world() -> DeployWorld {
    let dir = TempDir::new().expect("failed to create temp dir");
    let folder = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("temp dir path not UTF-8");
    let settings = DeploySettings {
        server_uri: "https://repo.example.com".to_owned(),
        project: None,
        folder,
        repository: "libs-example-local".to_owned(),
        threads: 1,
        build: BuildSettings {
            name: "my-build".to_owned(),
            number: 1234,
            uri: None,
        },
        artifact_properties: Vec::new(),
    };
    DeployWorld {
        _dir: dir,
        settings: RefCell::new(settings),
        artifactory: RefCell::new(RecordingArtifactory::new()),
        signed: Cell::new(false),
        result: RefCell::new(None),
    }
}

/// Produces a recognisable signature without a keyring.
struct StubSigner;

impl Signer for StubSigner {
    fn sign(&self, content: &mut dyn Read) -> Result<Vec<u8>, SigningError> {
        let mut signature = b"-----BEGIN PGP SIGNATURE-----\n".to_vec();
        content
            .read_to_end(&mut signature)
            .map_err(SigningError::Workspace)?;
        Ok(signature)
    }
}

fn unquote(text: &str) -> &str {
    text.trim().trim_matches(|candidate| matches!(candidate, '"' | '\''))
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

#[given("an empty deploy folder")]
fn given_empty_folder(deploy_world: &DeployWorld) {
    let folder = deploy_world.settings.borrow().folder.clone();
    assert!(folder.read_dir_utf8().expect("read folder").next().is_none());
}

#[given("the deploy folder contains {path}")]
fn given_folder_contains(deploy_world: &DeployWorld, path: String) {
    let folder = deploy_world.settings.borrow().folder.clone();
    write_tree(&folder, &[path.as_str()]).expect("failed to write file");
}

#[given("a property rule adding {property} to {pattern}")]
fn given_property_rule(deploy_world: &DeployWorld, property: String, pattern: String) {
    let rules =
        PropertyRule::parse_lines(&format!("{pattern}::{property}")).expect("valid rule");
    deploy_world
        .settings
        .borrow_mut()
        .artifact_properties
        .extend(rules);
}

#[given("the build belongs to project {project}")]
fn given_project(deploy_world: &DeployWorld, project: String) {
    deploy_world.settings.borrow_mut().project = Some(project);
}

#[given("{threads} deploy threads")]
fn given_threads(deploy_world: &DeployWorld, threads: usize) {
    deploy_world.settings.borrow_mut().threads = threads;
}

#[given("artifacts are signed")]
fn given_signed(deploy_world: &DeployWorld) {
    deploy_world.signed.set(true);
}

#[given("the repository rejects {path}")]
fn given_repository_rejects(deploy_world: &DeployWorld, path: String) {
    deploy_world
        .artifactory
        .replace(RecordingArtifactory::failing_on(path));
}

#[when("the folder is deployed")]
fn when_deployed(deploy_world: &DeployWorld) {
    let settings = deploy_world.settings.borrow();
    let artifactory = deploy_world.artifactory.borrow();
    let deployer = Deployer::new(&settings, &*artifactory, &FileSystemScanner);
    let result = if deploy_world.signed.get() {
        deployer.with_signer(&StubSigner).deploy()
    } else {
        deployer.deploy()
    };
    deploy_world.result.replace(Some(result));
}

#[then("the deployment succeeds")]
fn then_succeeds(deploy_world: &DeployWorld) {
    let result = deploy_world.result.borrow();
    match result.as_ref() {
        Some(Ok(_)) => {}
        Some(Err(err)) => panic!("expected deployment to succeed: {err}"),
        None => panic!("deployment should have run"),
    }
}

#[then("the deployment fails with {message}")]
fn then_fails_with(deploy_world: &DeployWorld, message: String) {
    let expected = unquote(&message);
    let result = deploy_world.result.borrow();
    match result.as_ref() {
        Some(Err(err)) => assert!(
            err.to_string().starts_with(expected),
            "expected error '{err}' to start with '{expected}'"
        ),
        Some(Ok(run)) => panic!("expected deployment to fail but it registered {run:?}"),
        None => panic!("deployment should have run"),
    }
}

#[then("nothing is deployed")]
fn then_nothing_deployed(deploy_world: &DeployWorld) {
    let deployed = deploy_world.artifactory.borrow().deployed_paths();
    assert!(deployed.is_empty(), "unexpected deploys: {deployed:?}");
}

#[then("no build run is registered")]
fn then_no_build_run(deploy_world: &DeployWorld) {
    assert!(deploy_world.artifactory.borrow().build_runs().is_empty());
}

#[then("the deployed paths are {paths}")]
fn then_deployed_paths(deploy_world: &DeployWorld, paths: String) {
    let expected: Vec<&str> = paths.split(',').map(str::trim).collect();
    assert_eq!(deploy_world.artifactory.borrow().deployed_paths(), expected);
}

#[then("{path} is deployed with property {property}")]
fn then_deployed_with_property(deploy_world: &DeployWorld, path: String, property: String) {
    let (key, value) = property.split_once('=').expect("property in key=value form");
    let deployed = deploy_world.artifactory.borrow().deployed();
    let artifact = deployed
        .iter()
        .find(|artifact| artifact.path == path)
        .unwrap_or_else(|| panic!("{path} was not deployed"));
    assert_eq!(artifact.properties.get(key), Some(value));
}

#[then("the build run is registered in project {project}")]
fn then_registered_in_project(deploy_world: &DeployWorld, project: String) {
    let runs = deploy_world.artifactory.borrow().build_runs();
    assert_eq!(runs.len(), 1);
    assert!(runs.iter().all(|run| run.project.as_deref() == Some(project.as_str())));
}

#[then("the build run records module {module} with {count} artifacts")]
fn then_module_recorded(deploy_world: &DeployWorld, module: String, count: usize) {
    let runs = deploy_world.artifactory.borrow().build_runs();
    let run = runs.first().expect("build run registered");
    let recorded = run
        .build_run
        .modules()
        .iter()
        .find(|candidate| candidate.id() == module)
        .unwrap_or_else(|| panic!("module {module} not recorded"));
    assert_eq!(recorded.artifacts().len(), count);
}

#[then("the build run records {count} modules")]
fn then_module_count(deploy_world: &DeployWorld, count: usize) {
    let runs = deploy_world.artifactory.borrow().build_runs();
    let run = runs.first().expect("build run registered");
    assert_eq!(run.build_run.modules().len(), count);
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/deploy.feature", index = 0)]
fn scenario_registers_build_run(deploy_world: DeployWorld) {
    let _ = deploy_world;
}

#[scenario(path = "tests/features/deploy.feature", index = 1)]
fn scenario_rejects_empty_folder(deploy_world: DeployWorld) {
    let _ = deploy_world;
}

#[scenario(path = "tests/features/deploy.feature", index = 2)]
fn scenario_skips_sidecar_files(deploy_world: DeployWorld) {
    let _ = deploy_world;
}

#[scenario(path = "tests/features/deploy.feature", index = 3)]
fn scenario_collapses_timestamped_snapshots(deploy_world: DeployWorld) {
    let _ = deploy_world;
}

#[scenario(path = "tests/features/deploy.feature", index = 4)]
fn scenario_deploys_by_category(deploy_world: DeployWorld) {
    let _ = deploy_world;
}

#[scenario(path = "tests/features/deploy.feature", index = 5)]
fn scenario_applies_property_rules(deploy_world: DeployWorld) {
    let _ = deploy_world;
}

#[scenario(path = "tests/features/deploy.feature", index = 6)]
fn scenario_registers_in_project(deploy_world: DeployWorld) {
    let _ = deploy_world;
}

#[scenario(path = "tests/features/deploy.feature", index = 7)]
fn scenario_deploys_signatures_last(deploy_world: DeployWorld) {
    let _ = deploy_world;
}

#[scenario(path = "tests/features/deploy.feature", index = 8)]
fn scenario_rejects_already_signed(deploy_world: DeployWorld) {
    let _ = deploy_world;
}

#[scenario(path = "tests/features/deploy.feature", index = 9)]
fn scenario_stops_on_failed_upload(deploy_world: DeployWorld) {
    let _ = deploy_world;
}

#[scenario(path = "tests/features/deploy.feature", index = 10)]
fn scenario_uses_worker_threads(deploy_world: DeployWorld) {
    let _ = deploy_world;
}
