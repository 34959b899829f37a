//! HTTP transport for the Artifactory REST API.
//!
//! The [`Transport`] trait is the seam between the upload decision logic and
//! the network. [`HttpTransport`] implements it with `ureq`.

use crate::artifact::DeployableArtifact;
use crate::build_info::BuildInfo;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::error::Error as _;
use std::io;
use std::time::Duration;
use thiserror::Error;
use ureq::SendBody;

/// Time allowed to establish a connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

/// Time allowed for the server to respond once a request is sent.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

const OCTET_STREAM: &str = "application/octet-stream";
const APPLICATION_JSON: &str = "application/json";

/// Where an artifact is deployed and the checksums it is declared with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployTarget {
    /// Full request URL including matrix parameters.
    pub url: String,
    /// SHA-1 sent in `X-Checksum-Sha1`.
    pub sha1: String,
    /// MD5 sent in `X-Checksum-Md5`.
    pub md5: String,
}

/// Errors raised by a [`Transport`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("{url} responded with HTTP status {status}")]
    Status {
        /// The request URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The connection failed or broke mid-request.
    #[error("I/O failure talking to {url}")]
    Io {
        /// The request URL.
        url: String,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The request failed for any other reason, e.g. a timeout or TLS error.
    #[error("request to {url} failed: {reason}")]
    Request {
        /// The request URL.
        url: String,
        /// A description of the failure.
        reason: String,
    },

    /// The artifact content could not be read for upload.
    #[error("failed to read artifact content")]
    Content(#[source] io::Error),

    /// The build-info payload could not be serialised.
    #[error("failed to encode build info")]
    Encode(#[from] serde_json::Error),
}

impl TransportError {
    /// The HTTP status, if the server responded.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true for a 4xx response.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|status| (400..500).contains(&status))
    }

    /// Returns true if a socket-level I/O error appears anywhere in the
    /// source chain.
    #[must_use]
    pub fn is_socket_failure(&self) -> bool {
        if let Self::Content(_) = self {
            return false;
        }
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(self);
        while let Some(err) = current {
            if err.downcast_ref::<io::Error>().is_some_and(is_socket_io_error) {
                return true;
            }
            current = err.source();
        }
        false
    }
}

/// Checks the error kind, then any `io::Error` wrapped inside it.
fn is_socket_io_error(err: &io::Error) -> bool {
    is_socket_kind(err.kind())
        || err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<io::Error>())
            .is_some_and(is_socket_io_error)
}

const fn is_socket_kind(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::NotConnected
            | io::ErrorKind::AddrInUse
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::HostUnreachable
            | io::ErrorKind::NetworkUnreachable
            | io::ErrorKind::UnexpectedEof
    )
}

/// Raw requests against an Artifactory server.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    /// `PUT` with `X-Checksum-Deploy: true` and no body, asking the server to
    /// deploy content it already holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    fn deploy_by_checksum(&self, target: &DeployTarget) -> Result<(), TransportError>;

    /// `PUT` the artifact's bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be read, the request fails, or
    /// the server rejects it.
    fn deploy_content(
        &self,
        target: &DeployTarget,
        artifact: &DeployableArtifact,
    ) -> Result<(), TransportError>;

    /// `PUT` a build-info payload to `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be encoded, the request fails,
    /// or the server rejects it.
    fn register_build_run(&self, url: &str, build_info: &BuildInfo)
    -> Result<(), TransportError>;
}

/// Username and password for HTTP basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The `Authorization` header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// [`Transport`] over HTTP(S) using a shared `ureq` agent.
#[derive(Debug)]
pub struct HttpTransport {
    agent: ureq::Agent,
    authorization: Option<String>,
}

impl HttpTransport {
    /// Create a transport, authenticating every request when `credentials`
    /// are given.
    #[must_use]
    pub fn new(credentials: Option<&Credentials>) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_connect(Some(CONNECT_TIMEOUT))
            .timeout_recv_response(Some(RESPONSE_TIMEOUT))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            authorization: credentials.map(Credentials::header_value),
        }
    }

    fn put(&self, url: &str) -> ureq::RequestBuilder<ureq::typestate::WithBody> {
        let request = self.agent.put(url);
        match &self.authorization {
            Some(value) => request.header("Authorization", value),
            None => request,
        }
    }

    fn deploy_request(
        &self,
        target: &DeployTarget,
    ) -> ureq::RequestBuilder<ureq::typestate::WithBody> {
        self.put(&target.url)
            .header("Content-Type", OCTET_STREAM)
            .header("X-Checksum-Sha1", &target.sha1)
            .header("X-Checksum-Md5", &target.md5)
    }
}

impl Transport for HttpTransport {
    fn deploy_by_checksum(&self, target: &DeployTarget) -> Result<(), TransportError> {
        self.deploy_request(target)
            .header("X-Checksum-Deploy", "true")
            .send_empty()
            .map_err(|err| map_ureq_error(&target.url, err))?;
        Ok(())
    }

    fn deploy_content(
        &self,
        target: &DeployTarget,
        artifact: &DeployableArtifact,
    ) -> Result<(), TransportError> {
        let mut reader = artifact.open().map_err(TransportError::Content)?;
        self.deploy_request(target)
            .header("Content-Length", &artifact.size().to_string())
            .send(SendBody::from_reader(&mut reader))
            .map_err(|err| map_ureq_error(&target.url, err))?;
        Ok(())
    }

    fn register_build_run(
        &self,
        url: &str,
        build_info: &BuildInfo,
    ) -> Result<(), TransportError> {
        let body = serde_json::to_vec(build_info)?;
        self.put(url)
            .header("Content-Type", APPLICATION_JSON)
            .send(&body[..])
            .map_err(|err| map_ureq_error(url, err))?;
        Ok(())
    }
}

/// Map a `ureq` error to a [`TransportError`], keeping I/O errors intact so
/// that socket failures can be recognised.
fn map_ureq_error(url: &str, err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::StatusCode(status) => TransportError::Status {
            url: url.to_owned(),
            status,
        },
        ureq::Error::Io(source) => TransportError::Io {
            url: url.to_owned(),
            source,
        },
        ureq::Error::ConnectionFailed => TransportError::Io {
            url: url.to_owned(),
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection failed"),
        },
        other => {
            let reason = match other.source() {
                Some(source) => format!("{other}: {source}"),
                None => other.to_string(),
            };
            TransportError::Request {
                url: url.to_owned(),
                reason,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const URL: &str = "https://repo.example.com/libs/foo.jar";

    #[rstest]
    #[case(400, true)]
    #[case(404, true)]
    #[case(416, true)]
    #[case(500, false)]
    #[case(302, false)]
    fn status_errors_classify_client_errors(#[case] status: u16, #[case] expected: bool) {
        let mapped = map_ureq_error(URL, ureq::Error::StatusCode(status));
        assert_eq!(mapped.status(), Some(status));
        assert_eq!(mapped.is_client_error(), expected);
        assert!(!mapped.is_socket_failure());
    }

    #[rstest]
    #[case(io::ErrorKind::ConnectionReset, true)]
    #[case(io::ErrorKind::BrokenPipe, true)]
    #[case(io::ErrorKind::ConnectionRefused, true)]
    #[case(io::ErrorKind::TimedOut, false)]
    #[case(io::ErrorKind::PermissionDenied, false)]
    fn io_errors_classify_socket_failures(#[case] kind: io::ErrorKind, #[case] expected: bool) {
        let mapped = map_ureq_error(URL, ureq::Error::Io(io::Error::from(kind)));
        assert!(matches!(mapped, TransportError::Io { .. }));
        assert_eq!(mapped.is_socket_failure(), expected);
    }

    #[test]
    fn socket_failure_is_found_deep_in_the_chain() {
        let inner = io::Error::from(io::ErrorKind::ConnectionReset);
        let wrapped = io::Error::other(inner);
        let err = TransportError::Io {
            url: URL.to_owned(),
            source: io::Error::other(wrapped),
        };
        assert!(err.is_socket_failure());
    }

    #[test]
    fn connection_failure_counts_as_socket_failure() {
        let mapped = map_ureq_error(URL, ureq::Error::ConnectionFailed);
        assert!(mapped.is_socket_failure());
    }

    #[test]
    fn local_read_failures_are_not_socket_failures() {
        let err = TransportError::Content(io::Error::from(io::ErrorKind::BrokenPipe));
        assert!(!err.is_socket_failure());
    }

    #[test]
    fn credentials_encode_basic_auth() {
        let credentials = Credentials::new("alice", "secret");
        assert_eq!(credentials.header_value(), "Basic YWxpY2U6c2VjcmV0");
        assert!(!format!("{credentials:?}").contains("secret"));
    }
}
