//! Deployable artifacts and the metadata that travels with them.
//!
//! # Sub-modules
//!
//! - [`checksums`] - SHA-1/MD5 pair computed in a single streaming pass.
//! - [`deployable`] - The [`DeployableArtifact`] value handed to uploaders.
//! - [`properties`] - Ordered key/value property bag.

pub mod checksums;
pub mod deployable;
pub mod properties;

pub use checksums::Checksums;
pub use deployable::{ArtifactContent, DeployableArtifact};
pub use properties::ArtifactProperties;
