//! Classification of transport results into upload decisions.
//!
//! The uploader never inspects a [`TransportError`] directly. It asks this
//! module whether a failed attempt may be retried, or whether a rejected
//! checksum deploy may fall back to a content upload.

use super::TransportError;

/// HTTP statuses that Artifactory returns transiently under load.
const FLAKY_STATUSES: [u16; 2] = [400, 404];

/// Result of one content upload attempt.
#[derive(Debug)]
pub enum UploadOutcome {
    /// The server accepted the content.
    Success,
    /// The attempt failed transiently and may be repeated.
    Retriable(TransportError),
    /// The attempt failed and must not be repeated.
    Fatal(TransportError),
}

impl UploadOutcome {
    /// Classify a content upload result.
    ///
    /// A 400 or 404 response, or a socket-level failure anywhere in the
    /// error chain, is retriable. Everything else is fatal.
    #[must_use]
    pub fn classify(result: Result<(), TransportError>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(err) if is_flaky(&err) => Self::Retriable(err),
            Err(err) => Self::Fatal(err),
        }
    }
}

/// Result of a checksum deploy.
#[derive(Debug)]
pub enum ChecksumOutcome {
    /// The server already held the content and deployed it.
    Accepted,
    /// The server rejected the request; upload the content instead.
    Rejected(TransportError),
    /// The request failed in a way that content upload would not fix.
    Failed(TransportError),
}

impl ChecksumOutcome {
    /// Classify a checksum deploy result.
    ///
    /// Any 4xx response or socket-level failure means the content should be
    /// uploaded. Everything else is fatal.
    #[must_use]
    pub fn classify(result: Result<(), TransportError>) -> Self {
        match result {
            Ok(()) => Self::Accepted,
            Err(err) if err.is_client_error() || err.is_socket_failure() => Self::Rejected(err),
            Err(err) => Self::Failed(err),
        }
    }
}

fn is_flaky(err: &TransportError) -> bool {
    err.status()
        .is_some_and(|status| FLAKY_STATUSES.contains(&status))
        || err.is_socket_failure()
}
