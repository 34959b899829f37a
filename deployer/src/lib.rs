//! Artifactory deployment engine.
//!
//! This crate turns a directory of Maven build outputs into a single
//! Artifactory "build run": it scans and filters the directory, derives
//! Maven coordinates from repository paths, collapses timestamped snapshot
//! duplicates, batches artifacts by category, uploads them through a
//! bounded worker pool with checksum deploy and retry, and finally
//! registers a build-info manifest describing the deployed modules.
//!
//! # Modules
//!
//! - [`artifact`] - Deployable artifacts, checksums, and property bags
//! - [`batch`] - Categories, snapshot path normalisation, and batching
//! - [`build_info`] - Build run and build-info payload types
//! - [`command`] - External command execution abstraction
//! - [`deploy`] - Deployment orchestration over a worker pool
//! - [`error`] - Semantic error types for fatal deployment failures
//! - [`maven`] - Maven coordinate parsing and build module synthesis
//! - [`repository`] - Artifactory client, upload protocol, and HTTP transport
//! - [`rules`] - Include/exclude path filters and artifact property rules
//! - [`scanner`] - Directory scanning and deployable file filtering
//! - [`signing`] - Detached signature generation for deployed artifacts

pub mod artifact;
pub mod batch;
pub mod build_info;
pub mod command;
pub mod deploy;
pub mod error;
pub mod maven;
pub mod repository;
pub mod rules;
pub mod scanner;
pub mod signing;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
