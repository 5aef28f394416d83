//! Storage endpoint parsing
//!
//! A `swift://` URI carries everything needed to reach one container:
//! `swift://host[:port]/container?region=R&api_version=V&domain_id=D&security_protocol=ssl|non-ssl`.
//! [`StorageEndpoint::parse`] resolves it once; the result is immutable for
//! the lifetime of the client built from it.

use url::Url;

use crate::error::{Error, Result};

/// URI scheme served by this client.
pub const URI_SCHEME: &str = "swift";

/// Keystone's conventional identity port, used when the URI omits one.
const DEFAULT_AUTH_PORT: u16 = 5000;

/// Identity API version assumed when the URI does not name one.
const DEFAULT_API_VERSION: &str = "v2";

/// Whether the identity endpoint is reached over TLS.
///
/// Only the literal query value `non-ssl` selects plain HTTP; anything else,
/// including an absent parameter, means TLS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityProtocol {
    #[default]
    Ssl,
    NonSsl,
}

impl SecurityProtocol {
    fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("non-ssl") => Self::NonSsl,
            _ => Self::Ssl,
        }
    }

    pub fn http_scheme(self) -> &'static str {
        match self {
            Self::Ssl => "https",
            Self::NonSsl => "http",
        }
    }
}

/// Connection and container coordinates derived from a `swift://` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEndpoint {
    pub host: String,
    pub port: u16,
    /// The URI path with exactly one leading separator stripped. Never empty.
    pub container_name: String,
    pub region: Option<String>,
    pub api_version: Option<String>,
    pub domain_id: Option<String>,
    pub security_protocol: SecurityProtocol,
}

impl StorageEndpoint {
    /// Parse a storage URI.
    ///
    /// Literal characters that are invalid in a URI must arrive
    /// percent-encoded. Unrecognized query keys are ignored.
    pub fn parse(uri: &str) -> Result<Self> {
        let parsed = Url::parse(uri).map_err(|e| Error::MalformedUri {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;

        let host = parsed
            .host_str()
            .ok_or_else(|| Error::MalformedUri {
                uri: uri.to_string(),
                reason: "missing host".to_string(),
            })?
            .to_string();
        let port = parsed.port().unwrap_or(DEFAULT_AUTH_PORT);

        let container_name = strip_leading_separator(parsed.path()).to_string();
        if container_name.is_empty() {
            return Err(Error::Construction(format!(
                "no container name in storage URI '{uri}'"
            )));
        }

        let mut region = None;
        let mut api_version = None;
        let mut domain_id = None;
        let mut security_protocol = None;
        for (key, value) in parsed.query_pairs() {
            match key.as_ref() {
                "region" => region = Some(value.into_owned()),
                "api_version" => api_version = Some(value.into_owned()),
                "domain_id" => domain_id = Some(value.into_owned()),
                "security_protocol" => security_protocol = Some(value.into_owned()),
                _ => {}
            }
        }

        Ok(Self {
            host,
            port,
            container_name,
            region,
            api_version,
            domain_id,
            security_protocol: SecurityProtocol::from_query(security_protocol.as_deref()),
        })
    }

    /// Identity API version in effect for this endpoint.
    pub fn api_version(&self) -> &str {
        self.api_version.as_deref().unwrap_or(DEFAULT_API_VERSION)
    }

    /// Keystone token endpoint for this storage endpoint.
    ///
    /// `v3` uses the `/v3/auth/tokens` path; every other version keeps the
    /// legacy `<version>.0/tokens` form.
    pub fn auth_url(&self) -> String {
        let version = self.api_version();
        let path = if version == "v3" {
            format!("/{version}/auth/tokens")
        } else {
            format!("/{version}.0/tokens")
        };
        format!(
            "{}://{}:{}{}",
            self.security_protocol.http_scheme(),
            self.host,
            self.port,
            path
        )
    }
}

/// Strip exactly one leading path separator, if present.
fn strip_leading_separator(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_uri() {
        let endpoint = StorageEndpoint::parse(
            "swift://swift.example.com:5000/backups?region=regionOne&api_version=v3&domain_id=default&security_protocol=non-ssl",
        )
        .unwrap();

        assert_eq!(endpoint.host, "swift.example.com");
        assert_eq!(endpoint.port, 5000);
        assert_eq!(endpoint.container_name, "backups");
        assert_eq!(endpoint.region.as_deref(), Some("regionOne"));
        assert_eq!(endpoint.api_version.as_deref(), Some("v3"));
        assert_eq!(endpoint.domain_id.as_deref(), Some("default"));
        assert_eq!(endpoint.security_protocol, SecurityProtocol::NonSsl);
    }

    #[test]
    fn test_parse_defaults() {
        let endpoint = StorageEndpoint::parse("swift://swift.example.com/backups").unwrap();

        assert_eq!(endpoint.port, 5000);
        assert_eq!(endpoint.region, None);
        assert_eq!(endpoint.api_version, None);
        assert_eq!(endpoint.api_version(), "v2");
        assert_eq!(endpoint.domain_id, None);
        assert_eq!(endpoint.security_protocol, SecurityProtocol::Ssl);
    }

    #[test]
    fn test_unrecognized_query_keys_are_ignored() {
        let endpoint =
            StorageEndpoint::parse("swift://host:5000/backups?region=r&flavor=large").unwrap();
        assert_eq!(endpoint.region.as_deref(), Some("r"));
    }

    #[test]
    fn test_strips_exactly_one_leading_separator() {
        assert_eq!(strip_leading_separator("/backups"), "backups");
        assert_eq!(strip_leading_separator("//backups"), "/backups");
        assert_eq!(strip_leading_separator("backups"), "backups");
    }

    #[test]
    fn test_empty_container_is_a_construction_error() {
        let err = StorageEndpoint::parse("swift://host:5000/").unwrap_err();
        assert!(matches!(err, Error::Construction(_)), "got {err:?}");

        let err = StorageEndpoint::parse("swift://host:5000").unwrap_err();
        assert!(matches!(err, Error::Construction(_)), "got {err:?}");
    }

    #[test]
    fn test_unparseable_uri() {
        let err = StorageEndpoint::parse("not a uri at all").unwrap_err();
        assert!(matches!(err, Error::MalformedUri { .. }), "got {err:?}");
    }

    #[test]
    fn test_missing_host() {
        let err = StorageEndpoint::parse("swift:backups").unwrap_err();
        assert!(matches!(err, Error::MalformedUri { ref reason, .. } if reason == "missing host"));
    }

    #[test]
    fn test_auth_url_v3() {
        let endpoint =
            StorageEndpoint::parse("swift://host:5000/backups?api_version=v3").unwrap();
        assert_eq!(endpoint.auth_url(), "https://host:5000/v3/auth/tokens");
    }

    #[test]
    fn test_auth_url_v2_default() {
        let endpoint = StorageEndpoint::parse("swift://host:5000/backups").unwrap();
        assert_eq!(endpoint.auth_url(), "https://host:5000/v2.0/tokens");
    }

    #[test]
    fn test_auth_url_non_ssl() {
        let endpoint = StorageEndpoint::parse(
            "swift://host:5000/backups?security_protocol=non-ssl&api_version=v2",
        )
        .unwrap();
        assert_eq!(endpoint.auth_url(), "http://host:5000/v2.0/tokens");
    }
}
