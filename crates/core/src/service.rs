//! The object-store service seam
//!
//! The client core never talks to Keystone or the Swift proxy directly; it
//! drives this trait. `swc-swift` provides the HTTP implementation, tests
//! provide recording stubs. Keeping the seam this narrow is what makes the
//! session/container/upload logic testable without a network.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::endpoint::StorageEndpoint;
use crate::error::{Error, Result, ServiceResult};

/// Username/password pair consumed by [`ObjectService::authenticate`].
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Both values are required; a missing or empty one fails construction
    /// before any network call is attempted.
    pub fn new(username: Option<String>, password: Option<String>) -> Result<Self> {
        match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Ok(Self { username, password })
            }
            _ => Err(Error::Construction(
                "username and password are required values".to_string(),
            )),
        }
    }
}

/// An authenticated handle: where the object API lives and the token that
/// unlocks it. Cached by the client, never by the service.
#[derive(Debug, Clone)]
pub struct Session {
    /// Public object-store URL from the service catalog, account suffix
    /// included.
    pub storage_url: String,
    /// Token sent as `X-Auth-Token` on every subsequent request.
    pub token: String,
}

/// A resolved container.
#[derive(Debug, Clone)]
pub struct Container {
    pub name: String,
    pub object_count: Option<u64>,
    pub bytes_used: Option<u64>,
}

/// Outcome of a completed object PUT.
#[derive(Debug, Clone)]
pub struct PutOutcome {
    pub status: u16,
    pub etag: Option<String>,
}

/// Streaming request body for an object PUT.
///
/// The payload is only ever pulled chunk by chunk; nothing buffers it whole.
/// `content_length` is `None` for chunked transfer encoding; when set, the
/// transport declares it instead of chunking.
pub struct UploadBody {
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    pub stream: BoxStream<'static, std::io::Result<Bytes>>,
}

/// Operations the object-store service must offer.
///
/// Absence is signalled through `ServiceError::NotFound`, rejection through
/// `ServiceError::Unauthorized`; implementations never classify beyond that.
#[async_trait]
pub trait ObjectService: Send + Sync {
    /// Exchange credentials for a session against the endpoint's auth URL.
    async fn authenticate(
        &self,
        endpoint: &StorageEndpoint,
        credentials: &Credentials,
    ) -> ServiceResult<Session>;

    /// Look up a container by name.
    async fn get_container(&self, session: &Session, name: &str) -> ServiceResult<Container>;

    /// Create a container. Swift's PUT is idempotent, so racing creators all
    /// succeed.
    async fn create_container(&self, session: &Session, name: &str) -> ServiceResult<Container>;

    /// Write one object, streaming the body. Only 201 and 202 count as
    /// success.
    async fn put_object(
        &self,
        session: &Session,
        container: &str,
        key: &str,
        body: UploadBody,
    ) -> ServiceResult<PutOutcome>;
}
