//! The unit of deployment: a repository path plus re-openable content.

use super::{ArtifactProperties, Checksums};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::sync::{Arc, OnceLock};

/// Where an artifact's bytes come from.
#[derive(Debug, Clone)]
pub enum ArtifactContent {
    /// A regular file on disk, reopened for every read.
    File(Utf8PathBuf),
    /// Bytes held in memory, such as a generated signature.
    Bytes(Arc<[u8]>),
}

/// An artifact ready to be uploaded to a repository.
///
/// The repository path is the identity of the artifact within one
/// deployment. Checksums are either supplied up front or calculated from
/// the content on first access and memoised; they are never recalculated.
///
/// # Examples
///
/// ```
/// use artifactory_deployer::artifact::{ArtifactProperties, DeployableArtifact};
///
/// let artifact = DeployableArtifact::from_bytes(
///     "/com/example/foo/1.0/foo-1.0.jar.asc",
///     b"signature".to_vec(),
///     ArtifactProperties::new(),
/// );
/// assert_eq!(artifact.size(), 9);
/// assert_eq!(artifact.file_name(), "foo-1.0.jar.asc");
/// ```
#[derive(Debug)]
pub struct DeployableArtifact {
    path: String,
    content: ArtifactContent,
    size: u64,
    properties: ArtifactProperties,
    checksums: OnceLock<Checksums>,
}

impl DeployableArtifact {
    /// Create an artifact backed by a file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if `file` does not exist or is not a regular file.
    pub fn from_file(
        path: impl Into<String>,
        file: &Utf8Path,
        properties: ArtifactProperties,
    ) -> io::Result<Self> {
        let metadata = file.metadata()?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{file}' does not refer to a file"),
            ));
        }
        Ok(Self {
            path: path.into(),
            content: ArtifactContent::File(file.to_owned()),
            size: metadata.len(),
            properties,
            checksums: OnceLock::new(),
        })
    }

    /// Create an artifact backed by in-memory bytes.
    #[must_use]
    pub fn from_bytes(
        path: impl Into<String>,
        bytes: Vec<u8>,
        properties: ArtifactProperties,
    ) -> Self {
        let size = bytes.len() as u64;
        Self {
            path: path.into(),
            content: ArtifactContent::Bytes(bytes.into()),
            size,
            properties,
            checksums: OnceLock::new(),
        }
    }

    /// Supply checksums that have already been verified, skipping
    /// calculation.
    #[must_use]
    pub fn with_checksums(self, checksums: Checksums) -> Self {
        Self {
            checksums: OnceLock::from(checksums),
            ..self
        }
    }

    /// The repository path, always starting with `/`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The final segment of the repository path.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Content length in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Properties sent as matrix parameters on upload.
    #[must_use]
    pub const fn properties(&self) -> &ArtifactProperties {
        &self.properties
    }

    /// The backing content source.
    #[must_use]
    pub const fn content(&self) -> &ArtifactContent {
        &self.content
    }

    /// Open a fresh reader over the artifact's bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be opened.
    pub fn open(&self) -> io::Result<Box<dyn Read + Send + '_>> {
        match &self.content {
            ArtifactContent::File(file) => Ok(Box::new(File::open(file)?)),
            ArtifactContent::Bytes(bytes) => Ok(Box::new(Cursor::new(&bytes[..]))),
        }
    }

    /// The artifact checksums, calculated on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the content must be read and reading fails.
    pub fn checksums(&self) -> io::Result<&Checksums> {
        if let Some(checksums) = self.checksums.get() {
            return Ok(checksums);
        }
        let calculated = Checksums::calculate(self.open()?)?;
        Ok(self.checksums.get_or_init(|| calculated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_file(contents: &[u8]) -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(dir.path().join("foo.jar")).expect("UTF-8 path");
        fs::write(&path, contents).expect("write file");
        (dir, path)
    }

    #[test]
    fn file_artifact_reports_size_and_checksums() {
        let (_dir, file) = temp_file(b"abc");
        let artifact =
            DeployableArtifact::from_file("/foo.jar", &file, ArtifactProperties::new())
                .expect("artifact");

        assert_eq!(artifact.size(), 3);
        let checksums = artifact.checksums().expect("checksums");
        assert_eq!(checksums.sha1(), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn checksums_are_memoised_after_first_calculation() {
        let (_dir, file) = temp_file(b"abc");
        let artifact =
            DeployableArtifact::from_file("/foo.jar", &file, ArtifactProperties::new())
                .expect("artifact");
        let first = artifact.checksums().expect("checksums").clone();

        fs::remove_file(&file).expect("remove file");

        let second = artifact.checksums().expect("memoised checksums");
        assert_eq!(&first, second);
    }

    #[test]
    fn supplied_checksums_are_not_recalculated() {
        let supplied = Checksums::new("1".repeat(40), "2".repeat(32));
        let artifact =
            DeployableArtifact::from_bytes("/foo.jar", b"abc".to_vec(), ArtifactProperties::new())
                .with_checksums(supplied.clone());

        assert_eq!(artifact.checksums().expect("checksums"), &supplied);
    }

    #[test]
    fn from_file_rejects_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("UTF-8 path");
        let err = DeployableArtifact::from_file("/dir", &path, ArtifactProperties::new())
            .expect_err("directory should be rejected");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn content_can_be_read_repeatedly() {
        let artifact =
            DeployableArtifact::from_bytes("/a.txt", b"hello".to_vec(), ArtifactProperties::new());
        for _ in 0..2 {
            let mut text = String::new();
            artifact
                .open()
                .expect("open")
                .read_to_string(&mut text)
                .expect("read");
            assert_eq!(text, "hello");
        }
    }
}
