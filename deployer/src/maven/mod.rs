//! Maven repository layout support.
//!
//! # Sub-modules
//!
//! - [`coordinates`] - Parse repository paths into [`Coordinates`].
//! - [`modules`] - Group deployed artifacts into build-info modules.

pub mod coordinates;
pub mod modules;

pub use coordinates::{Coordinates, VersionKind};
pub use modules::BuildModulesGenerator;
