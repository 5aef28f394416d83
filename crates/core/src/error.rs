//! Error types for swc
//!
//! Two layers: [`ServiceError`] is the raw outcome of a single call against
//! Keystone or the Swift proxy, [`Error`] is the classified form the rest of
//! the system sees. Classification happens once, in [`Error::classify`], at
//! every external-call boundary; the raw failure always rides along as the
//! error source so nothing about the original failure is lost.

use thiserror::Error;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Result alias for calls across the [`crate::service::ObjectService`] seam.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Raw failure reported by the object-store service (or while feeding it).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// 401/403 from Keystone or the Swift proxy.
    #[error("unauthorized (status {status})")]
    Unauthorized { status: u16 },

    /// The requested resource does not exist.
    #[error("not found")]
    NotFound,

    /// The service answered with a status outside the expected set.
    #[error("unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// The request never completed (DNS, TLS, timeout, connection reset).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The service answered but the response could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Local I/O failure while producing the request body.
    #[error("i/o error: {0}")]
    Io(#[source] std::io::Error),
}

impl ServiceError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Whether a retry of the same call could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// External-call boundaries at which a [`ServiceError`] can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Session establishment against Keystone.
    Connect,
    /// Container lookup.
    ContainerLookup,
    /// Container creation.
    ContainerCreate,
    /// Object write.
    Upload,
}

/// Classified failures surfaced to callers.
///
/// Operations either fully succeed or fail with exactly one of these; nothing
/// is silently downgraded and nothing is retried internally.
#[derive(Debug, Error)]
pub enum Error {
    /// The storage URI could not be parsed at all.
    #[error("malformed storage URI '{uri}': {reason}")]
    MalformedUri { uri: String, reason: String },

    /// Invalid client construction input. No network call was attempted.
    #[error("{0}")]
    Construction(String),

    /// The service rejected the credentials. Retrying with the same
    /// credentials will not help.
    #[error("access to the object store at {host} was denied due to a bad username or password")]
    Authentication {
        host: String,
        #[source]
        source: ServiceError,
    },

    /// The service could not be reached or refused the session.
    #[error("could not establish a session with the object store at {host}")]
    Connection {
        host: String,
        #[source]
        source: ServiceError,
    },

    /// Container lookup failed for a reason other than simple absence.
    #[error("error getting container {container} from {host}")]
    ContainerLookup {
        host: String,
        container: String,
        #[source]
        source: ServiceError,
    },

    /// Container creation failed.
    #[error("error creating container {container}")]
    ContainerCreate {
        container: String,
        #[source]
        source: ServiceError,
    },

    /// Object write failed. Partial writes are not resumed.
    #[error("error uploading {source_description} to container {container}")]
    Upload {
        container: String,
        source_description: String,
        #[source]
        source: ServiceError,
    },

    /// Profile or transport configuration problem.
    #[error("configuration error: {0}")]
    Config(String),

    /// No profile with the given name exists.
    #[error("profile '{0}' not found")]
    ProfileNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify a service failure at an external-call boundary.
    ///
    /// Two tiers: an unauthorized response becomes [`Error::Authentication`]
    /// no matter which call produced it; every other failure is wrapped with
    /// the call site's resource context. The raw failure is preserved as the
    /// error source either way.
    pub fn classify(
        op: Op,
        host: &str,
        container: &str,
        source_description: Option<&str>,
        err: ServiceError,
    ) -> Error {
        if err.is_unauthorized() {
            return Error::Authentication {
                host: host.to_string(),
                source: err,
            };
        }

        match op {
            Op::Connect => Error::Connection {
                host: host.to_string(),
                source: err,
            },
            Op::ContainerLookup => Error::ContainerLookup {
                host: host.to_string(),
                container: container.to_string(),
                source: err,
            },
            Op::ContainerCreate => Error::ContainerCreate {
                container: container.to_string(),
                source: err,
            },
            Op::Upload => Error::Upload {
                container: container.to_string(),
                source_description: source_description.unwrap_or("<unknown source>").to_string(),
                source: err,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_unauthorized_wins_over_call_site() {
        for op in [Op::Connect, Op::ContainerLookup, Op::ContainerCreate, Op::Upload] {
            let err = Error::classify(
                op,
                "swift.example.com",
                "backups",
                Some("dump.db"),
                ServiceError::Unauthorized { status: 401 },
            );
            assert!(
                matches!(err, Error::Authentication { ref host, .. } if host == "swift.example.com"),
                "op {op:?} should classify as Authentication, got {err:?}"
            );
        }
    }

    #[test]
    fn test_catch_all_keeps_call_site_context() {
        let err = Error::classify(
            Op::ContainerLookup,
            "swift.example.com",
            "backups",
            None,
            ServiceError::UnexpectedStatus {
                status: 500,
                message: "boom".to_string(),
            },
        );
        assert!(matches!(
            err,
            Error::ContainerLookup { ref container, .. } if container == "backups"
        ));

        let err = Error::classify(
            Op::Upload,
            "swift.example.com",
            "backups",
            Some("dump.db"),
            ServiceError::Transport("connection reset".into()),
        );
        match err {
            Error::Upload {
                container,
                source_description,
                ..
            } => {
                assert_eq!(container, "backups");
                assert_eq!(source_description, "dump.db");
            }
            other => panic!("expected Upload, got {other:?}"),
        }
    }

    #[test]
    fn test_source_is_preserved() {
        let err = Error::classify(
            Op::Connect,
            "host",
            "backups",
            None,
            ServiceError::Unauthorized { status: 403 },
        );
        let source = err.source().expect("classified errors carry a source");
        assert_eq!(source.to_string(), "unauthorized (status 403)");
    }

    #[test]
    fn test_transient_service_errors() {
        assert!(ServiceError::Transport("timeout".into()).is_transient());
        assert!(
            ServiceError::UnexpectedStatus {
                status: 503,
                message: String::new()
            }
            .is_transient()
        );
        assert!(
            ServiceError::UnexpectedStatus {
                status: 429,
                message: String::new()
            }
            .is_transient()
        );
        assert!(!ServiceError::Unauthorized { status: 401 }.is_transient());
        assert!(!ServiceError::NotFound.is_transient());
        assert!(
            !ServiceError::UnexpectedStatus {
                status: 409,
                message: String::new()
            }
            .is_transient()
        );
    }
}
