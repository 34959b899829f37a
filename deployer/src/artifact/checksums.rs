//! SHA-1 and MD5 checksums for artifact content.
//!
//! Artifactory identifies stored content by these two digests. Both are
//! computed together so that the content stream is read exactly once.

use md5::Md5;
use sha1::{Digest, Sha1};
use std::fmt;
use std::io::{self, Read};

/// Read buffer size used while hashing.
const BUFFER_SIZE: usize = 8192;

/// The SHA-1 and MD5 digests of an artifact, as lowercase hex strings.
///
/// # Examples
///
/// ```
/// use artifactory_deployer::artifact::Checksums;
///
/// let checksums = Checksums::calculate(&b"abc"[..]).unwrap();
/// assert_eq!(checksums.sha1(), "a9993e364706816aba3e25717850c26c9cd0d89d");
/// assert_eq!(checksums.md5(), "900150983cd24fb0d6963f7d28e17f72");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksums {
    sha1: String,
    md5: String,
}

impl Checksums {
    /// Create checksums from already-known hex digests.
    #[must_use]
    pub fn new(sha1: impl Into<String>, md5: impl Into<String>) -> Self {
        Self {
            sha1: sha1.into(),
            md5: md5.into(),
        }
    }

    /// Stream `content` to the end and compute both digests.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while reading `content`.
    pub fn calculate(mut content: impl Read) -> io::Result<Self> {
        let mut sha1 = Sha1::new();
        let mut md5 = Md5::new();
        let mut buffer = [0u8; BUFFER_SIZE];
        loop {
            let bytes_read = content.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            let chunk = &buffer[..bytes_read];
            sha1.update(chunk);
            md5.update(chunk);
        }
        Ok(Self {
            sha1: format!("{:x}", sha1.finalize()),
            md5: format!("{:x}", md5.finalize()),
        })
    }

    /// The SHA-1 digest (40 hex characters).
    #[must_use]
    pub fn sha1(&self) -> &str {
        &self.sha1
    }

    /// The MD5 digest (32 hex characters).
    #[must_use]
    pub fn md5(&self) -> &str {
        &self.md5
    }
}

impl fmt::Display for Checksums {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sha1={} md5={}", self.sha1, self.md5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty(
        b"",
        "da39a3ee5e6b4b0d3255bfef95601890afd80709",
        "d41d8cd98f00b204e9800998ecf8427e"
    )]
    #[case::abc(
        b"abc",
        "a9993e364706816aba3e25717850c26c9cd0d89d",
        "900150983cd24fb0d6963f7d28e17f72"
    )]
    fn calculates_known_digests(#[case] input: &[u8], #[case] sha1: &str, #[case] md5: &str) {
        let checksums = Checksums::calculate(input).expect("in-memory read");
        assert_eq!(checksums.sha1(), sha1);
        assert_eq!(checksums.md5(), md5);
    }

    #[test]
    fn content_larger_than_the_buffer_is_fully_hashed() {
        let content = vec![7u8; BUFFER_SIZE * 3 + 11];
        let streamed = Checksums::calculate(content.as_slice()).expect("in-memory read");
        let expected_sha1 = format!("{:x}", Sha1::digest(&content));
        assert_eq!(streamed.sha1(), expected_sha1);
        assert_eq!(streamed.sha1().len(), 40);
        assert_eq!(streamed.md5().len(), 32);
    }

    #[test]
    fn display_shows_both_digests() {
        let checksums = Checksums::new("aaa", "bbb");
        assert_eq!(checksums.to_string(), "sha1=aaa md5=bbb");
    }
}
