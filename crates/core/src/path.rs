//! Pure path-derivation helpers
//!
//! These recover local and in-container paths from fully-qualified object
//! URIs. No network involvement; both directions are plain string work.

use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{Error, Result};

/// Leading path segments of a destination URI that are not part of the
/// object key: the container name and the top-level set segment.
const NON_KEY_SEGMENTS: usize = 2;

/// Recover the in-container object key from a fully-qualified destination URI.
///
/// The scheme, authority, container name and set segment are stripped:
/// `swift://host/backups/set1/b/object.dat` yields `b/object.dat`, independent
/// of the host. A URI whose path carries fewer segments has no derivable key
/// and is rejected rather than silently truncated.
pub fn object_path_from_uri(uri: &str) -> Result<String> {
    let parsed = Url::parse(uri).map_err(|e| Error::MalformedUri {
        uri: uri.to_string(),
        reason: e.to_string(),
    })?;

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|segments| segments.collect())
        .unwrap_or_default();

    if segments.len() <= NON_KEY_SEGMENTS {
        return Err(Error::MalformedUri {
            uri: uri.to_string(),
            reason: format!(
                "path has {} segment(s), need at least {} to derive an object key",
                segments.len(),
                NON_KEY_SEGMENTS + 1
            ),
        });
    }

    let key = segments[NON_KEY_SEGMENTS..].join("/");
    if key.is_empty() {
        return Err(Error::MalformedUri {
            uri: uri.to_string(),
            reason: "empty object key".to_string(),
        });
    }

    Ok(key)
}

/// Reduce a fully-qualified destination URI to its endpoint URI: scheme,
/// authority, container segment and query string, object segments dropped.
/// Lets a caller connect from nothing but a destination.
pub fn endpoint_uri_from_destination(uri: &str) -> Result<String> {
    let parsed = Url::parse(uri).map_err(|e| Error::MalformedUri {
        uri: uri.to_string(),
        reason: e.to_string(),
    })?;

    let host = parsed.host_str().ok_or_else(|| Error::MalformedUri {
        uri: uri.to_string(),
        reason: "missing host".to_string(),
    })?;
    let container = parsed
        .path_segments()
        .and_then(|mut segments| segments.next())
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| Error::MalformedUri {
            uri: uri.to_string(),
            reason: "no container segment".to_string(),
        })?;

    let mut endpoint = format!("{}://{}", parsed.scheme(), host);
    if let Some(port) = parsed.port() {
        endpoint.push_str(&format!(":{port}"));
    }
    endpoint.push('/');
    endpoint.push_str(container);
    if let Some(query) = parsed.query() {
        endpoint.push('?');
        endpoint.push_str(query);
    }
    Ok(endpoint)
}

/// Map a remote object URI onto a local mount point.
///
/// The scheme is dropped and the URI host becomes the first directory below
/// the mount point, mirroring how a mount session lays files out on disk.
pub fn uri_to_local_path(mount_point: &Path, uri: &str) -> Result<PathBuf> {
    let parsed = Url::parse(uri).map_err(|e| Error::MalformedUri {
        uri: uri.to_string(),
        reason: e.to_string(),
    })?;

    let host = parsed.host_str().ok_or_else(|| Error::MalformedUri {
        uri: uri.to_string(),
        reason: "missing host".to_string(),
    })?;

    Ok(mount_point
        .join(host)
        .join(parsed.path().trim_start_matches('/')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_is_container_relative() {
        let key = object_path_from_uri("swift://host/backups/set1/b/object.dat").unwrap();
        assert_eq!(key, "b/object.dat");
    }

    #[test]
    fn test_object_key_is_host_independent() {
        let a = object_path_from_uri("swift://host-a/backups/set1/object.dat").unwrap();
        let b = object_path_from_uri("swift://host-b:8080/backups/set1/object.dat").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, "object.dat");
    }

    #[test]
    fn test_short_path_is_rejected() {
        // Container plus one segment is not enough to derive a key.
        let err = object_path_from_uri("swift://host/backups/object.dat").unwrap_err();
        assert!(matches!(err, Error::MalformedUri { .. }), "got {err:?}");

        let err = object_path_from_uri("swift://host/backups").unwrap_err();
        assert!(matches!(err, Error::MalformedUri { .. }), "got {err:?}");
    }

    #[test]
    fn test_trailing_separator_is_rejected() {
        let err = object_path_from_uri("swift://host/backups/set1/").unwrap_err();
        assert!(matches!(err, Error::MalformedUri { ref reason, .. } if reason == "empty object key"));
    }

    #[test]
    fn test_endpoint_uri_from_destination() {
        let endpoint = endpoint_uri_from_destination(
            "swift://host:5000/backups/set1/object.dat?api_version=v3&region=r",
        )
        .unwrap();
        assert_eq!(endpoint, "swift://host:5000/backups?api_version=v3&region=r");

        let endpoint =
            endpoint_uri_from_destination("swift://host/backups/set1/object.dat").unwrap();
        assert_eq!(endpoint, "swift://host/backups");
    }

    #[test]
    fn test_endpoint_uri_needs_a_container_segment() {
        let err = endpoint_uri_from_destination("swift://host").unwrap_err();
        assert!(matches!(err, Error::MalformedUri { .. }));
    }

    #[test]
    fn test_uri_to_local_path() {
        let local =
            uri_to_local_path(Path::new("/tmp/mnt"), "swift://host/backups/set1/object.dat")
                .unwrap();
        assert_eq!(
            local,
            PathBuf::from("/tmp/mnt/host/backups/set1/object.dat")
        );
    }

    #[test]
    fn test_uri_to_local_path_missing_host() {
        let err = uri_to_local_path(Path::new("/tmp/mnt"), "swift:object.dat").unwrap_err();
        assert!(matches!(err, Error::MalformedUri { .. }));
    }
}
