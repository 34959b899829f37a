//! Directory scanning for deployable files.
//!
//! The scanner walks the deploy folder recursively and returns every regular
//! file, sorted by path so that repeated runs upload in the same order.
//! Checksum sidecars and Maven metadata indexes are filtered out before
//! anything else sees them.

use camino::{Utf8Path, Utf8PathBuf};
use std::io;

/// File-name suffixes of checksum sidecar files.
const CHECKSUM_SUFFIXES: &[&str] = &[".md5", ".sha1", ".sha256", ".sha512"];

/// File names of repository-generated metadata indexes.
const METADATA_FILES: &[&str] = &["maven-metadata.xml", "maven-metadata-local.xml"];

/// Discovers files beneath a root directory.
#[cfg_attr(test, mockall::automock)]
pub trait DirectoryScanner: Send + Sync {
    /// Return every file beneath `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be read.
    fn scan(&self, root: &Utf8Path) -> io::Result<FileSet>;
}

/// Scanner backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemScanner;

impl DirectoryScanner for FileSystemScanner {
    fn scan(&self, root: &Utf8Path) -> io::Result<FileSet> {
        let mut files = Vec::new();
        let mut pending = vec![root.to_owned()];

        while let Some(dir) = pending.pop() {
            for entry in dir.read_dir_utf8()? {
                let entry = entry?;
                let file_type = entry.file_type()?;
                let path = entry.path();
                // Symlinked directories are not followed, so link cycles
                // cannot loop the walk.
                if file_type.is_dir() {
                    pending.push(path.to_owned());
                } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
                    files.push(path.to_owned());
                }
            }
        }

        files.sort();
        Ok(FileSet::new(files))
    }
}

/// An ordered set of files found by a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    files: Vec<Utf8PathBuf>,
}

impl FileSet {
    /// Wrap a list of files, keeping their order.
    #[must_use]
    pub const fn new(files: Vec<Utf8PathBuf>) -> Self {
        Self { files }
    }

    /// Keep only the files accepted by `predicate`.
    #[must_use]
    pub fn filter(self, predicate: impl Fn(&Utf8Path) -> bool) -> Self {
        Self {
            files: self
                .files
                .into_iter()
                .filter(|file| predicate(file))
                .collect(),
        }
    }

    /// Drop checksum sidecars and Maven metadata indexes.
    #[must_use]
    pub fn deployable(self) -> Self {
        self.filter(|file| !is_checksum_file(file))
            .filter(|file| !is_metadata_file(file))
    }

    /// Iterate over the files in order.
    pub fn iter(&self) -> impl Iterator<Item = &Utf8Path> {
        self.files.iter().map(Utf8PathBuf::as_path)
    }

    /// Number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if the set holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<P: Into<Utf8PathBuf>> FromIterator<P> for FileSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

fn lowercase_name(file: &Utf8Path) -> Option<String> {
    file.file_name().map(str::to_lowercase)
}

/// Returns true for `.md5`, `.sha1`, `.sha256` and `.sha512` files.
#[must_use]
pub fn is_checksum_file(file: &Utf8Path) -> bool {
    lowercase_name(file).is_some_and(|name| {
        CHECKSUM_SUFFIXES
            .iter()
            .any(|suffix| name.ends_with(suffix))
    })
}

/// Returns true for `maven-metadata.xml` and `maven-metadata-local.xml`.
#[must_use]
pub fn is_metadata_file(file: &Utf8Path) -> bool {
    lowercase_name(file).is_some_and(|name| METADATA_FILES.contains(&name.as_str()))
}

/// Returns true if `root` has no entries at all.
///
/// # Errors
///
/// Returns an error if `root` cannot be read.
pub fn is_empty_dir(root: &Utf8Path) -> io::Result<bool> {
    Ok(root.read_dir_utf8()?.next().is_none())
}

/// The repository path of `file` relative to `root`, using `/` separators
/// and a leading `/`.
///
/// Returns `None` if `file` is not beneath `root`.
///
/// # Examples
///
/// ```
/// use artifactory_deployer::scanner::deploy_path;
/// use camino::Utf8Path;
///
/// let path = deploy_path(
///     Utf8Path::new("/work/out"),
///     Utf8Path::new("/work/out/com/example/foo/1.0/foo-1.0.jar"),
/// );
/// assert_eq!(path.as_deref(), Some("/com/example/foo/1.0/foo-1.0.jar"));
/// ```
#[must_use]
pub fn deploy_path(root: &Utf8Path, file: &Utf8Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let mut path = String::new();
    for component in relative.components() {
        path.push('/');
        path.push_str(component.as_str());
    }
    (!path.is_empty()).then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn utf8_root(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("UTF-8 temp dir")
    }

    fn touch(root: &Utf8Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, b"").expect("write file");
    }

    #[test]
    fn scan_returns_sorted_files_recursively() {
        let dir = TempDir::new().expect("temp dir");
        let root = utf8_root(&dir);
        for relative in ["baz/baz.jar", "bar/bar.pom", "bar/bar.jar", "baz/qux/qux.jar"] {
            touch(&root, relative);
        }
        fs::create_dir_all(root.join("empty")).expect("create dir");

        let files = FileSystemScanner.scan(&root).expect("scan");

        let relative: Vec<_> = files
            .iter()
            .filter_map(|file| deploy_path(&root, file))
            .collect();
        assert_eq!(
            relative,
            ["/bar/bar.jar", "/bar/bar.pom", "/baz/baz.jar", "/baz/qux/qux.jar"]
        );
    }

    #[test]
    fn scan_of_missing_root_fails() {
        let dir = TempDir::new().expect("temp dir");
        let root = utf8_root(&dir).join("missing");
        assert!(FileSystemScanner.scan(&root).is_err());
    }

    #[rstest]
    #[case("foo-1.0.jar.md5", true)]
    #[case("foo-1.0.jar.SHA1", true)]
    #[case("foo-1.0.sha256", true)]
    #[case("foo-1.0.sha512", true)]
    #[case("foo-1.0.sha", false)]
    #[case("foo-1.0.jar", false)]
    fn detects_checksum_files(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_checksum_file(Utf8Path::new(name)), expected);
    }

    #[rstest]
    #[case("maven-metadata.xml", true)]
    #[case("Maven-Metadata-Local.xml", true)]
    #[case("maven-metadata-remote.xml", false)]
    fn detects_metadata_files(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_metadata_file(&Utf8Path::new("/a/b").join(name)), expected);
    }

    #[cfg(unix)]
    #[test]
    fn scan_does_not_follow_symlinked_directories() {
        let dir = TempDir::new().expect("temp dir");
        let root = utf8_root(&dir);
        touch(&root, "com/example/foo/1.0/foo-1.0.jar");
        std::os::unix::fs::symlink(&root, root.join("com/loop")).expect("symlink dir");
        std::os::unix::fs::symlink(
            root.join("com/example/foo/1.0/foo-1.0.jar"),
            root.join("linked.jar"),
        )
        .expect("symlink file");

        let files = FileSystemScanner.scan(&root).expect("scan");

        let relative: Vec<_> = files
            .iter()
            .filter_map(|file| deploy_path(&root, file))
            .collect();
        assert_eq!(relative, ["/com/example/foo/1.0/foo-1.0.jar", "/linked.jar"]);
    }

    #[test]
    fn deployable_drops_sidecars_and_metadata() {
        let files: FileSet = [
            "/r/com/example/foo/maven-metadata.xml",
            "/r/com/example/foo/1.0/foo-1.0.jar",
            "/r/com/example/foo/1.0/foo-1.0.jar.sha1",
            "/r/com/example/foo/1.0/foo-1.0.pom",
        ]
        .into_iter()
        .collect();

        let deployable = files.deployable();
        let kept: Vec<_> = deployable.iter().map(Utf8Path::as_str).collect();
        assert_eq!(
            kept,
            ["/r/com/example/foo/1.0/foo-1.0.jar", "/r/com/example/foo/1.0/foo-1.0.pom"]
        );
    }

    #[test]
    fn empty_dir_detection_counts_subdirectories() {
        let dir = TempDir::new().expect("temp dir");
        let root = utf8_root(&dir);
        assert!(is_empty_dir(&root).expect("read dir"));

        fs::create_dir(root.join("sub")).expect("create dir");
        assert!(!is_empty_dir(&root).expect("read dir"));
    }

    #[test]
    fn deploy_path_rejects_files_outside_root() {
        assert_eq!(deploy_path(Utf8Path::new("/a"), Utf8Path::new("/b/c.jar")), None);
        assert_eq!(deploy_path(Utf8Path::new("/a"), Utf8Path::new("/a")), None);
    }
}
