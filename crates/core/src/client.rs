//! The Swift storage client
//!
//! [`SwiftStorage`] ties together an endpoint parsed once at construction, a
//! lazily-established authenticated session, a get-or-create container, and a
//! streaming upload engine — all over the [`ObjectService`] seam, so the same
//! logic runs against the HTTP adapter and against test stubs.
//!
//! One client serves one endpoint + container. Operations take `&mut self`;
//! callers needing concurrency run one client per destination.

use std::io;

use bytes::Bytes;
use futures::channel::mpsc;
use futures::{SinkExt, StreamExt};

use crate::endpoint::{StorageEndpoint, URI_SCHEME};
use crate::error::{Error, Op, Result, ServiceError, ServiceResult};
use crate::path;
use crate::service::{Container, Credentials, ObjectService, PutOutcome, Session, UploadBody};
use crate::source::ChunkSource;

/// Statuses Swift reports for an accepted object PUT.
const PUT_ACCEPTED: [u16; 2] = [201, 202];

/// Chunks the upload channel buffers ahead of the transport. Bounds upload
/// memory at `UPLOAD_CHANNEL_DEPTH + 1` chunks.
const UPLOAD_CHANNEL_DEPTH: usize = 4;

/// How an upload declares its size to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadStrategy {
    /// Always stream with chunked transfer encoding, even when the source
    /// knows its byte count.
    #[default]
    Chunked,
    /// Declare the source's byte count when it is known; stream otherwise.
    ContentLength,
}

/// Options consumed by [`SwiftStorage::new_with_opts`].
#[derive(Debug, Clone, Default)]
pub struct StorageOptions {
    pub uri: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Client for one Swift endpoint + container.
#[derive(Debug)]
pub struct SwiftStorage<S> {
    endpoint: StorageEndpoint,
    credentials: Credentials,
    service: S,
    strategy: UploadStrategy,
    // Lazy, set at most once per instance. Plain Options suffice: the &mut
    // receiver rules out concurrent initialization.
    session: Option<Session>,
    container: Option<Container>,
}

impl<S: ObjectService> SwiftStorage<S> {
    /// URI scheme this client serves.
    pub fn uri_scheme() -> &'static str {
        URI_SCHEME
    }

    /// Build a client from `{uri, username, password}` options.
    ///
    /// Fails before any network traffic when a credential is missing or the
    /// URI does not resolve to an endpoint.
    pub fn new_with_opts(opts: StorageOptions, service: S) -> Result<Self> {
        let credentials = Credentials::new(opts.username, opts.password)?;
        let endpoint = StorageEndpoint::parse(&opts.uri)?;
        Ok(Self {
            endpoint,
            credentials,
            service,
            strategy: UploadStrategy::default(),
            session: None,
            container: None,
        })
    }

    /// Replace the upload strategy (defaults to [`UploadStrategy::Chunked`]).
    pub fn with_strategy(mut self, strategy: UploadStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn endpoint(&self) -> &StorageEndpoint {
        &self.endpoint
    }

    pub fn container_name(&self) -> &str {
        &self.endpoint.container_name
    }

    /// Authenticated session, established on first use and cached for the
    /// lifetime of this client. A failed attempt caches nothing, so the next
    /// call authenticates again instead of reusing a dead handle.
    async fn session(&mut self) -> Result<Session> {
        if let Some(session) = &self.session {
            return Ok(session.clone());
        }

        let session = self
            .service
            .authenticate(&self.endpoint, &self.credentials)
            .await
            .map_err(|err| {
                let classified = self.classify(Op::Connect, None, err);
                tracing::error!(host = %self.endpoint.host, error = %classified, "session establishment failed");
                classified
            })?;

        tracing::debug!(host = %self.endpoint.host, "authenticated against object store");
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Container handle, resolved on first use: looked up, created when the
    /// lookup reports absence, and cached for the lifetime of this client.
    /// Subsequent calls short-circuit without contacting the service.
    pub async fn container(&mut self) -> Result<Container> {
        if let Some(container) = &self.container {
            return Ok(container.clone());
        }

        let session = self.session().await?;
        let name = self.endpoint.container_name.clone();

        let container = match self.service.get_container(&session, &name).await {
            Ok(container) => {
                tracing::debug!(container = %name, "container found");
                container
            }
            Err(err) if err.is_not_found() => {
                tracing::debug!(container = %name, "container does not exist, creating");
                self.create_container(&session, &name).await?
            }
            Err(err) => {
                let classified = self.classify(Op::ContainerLookup, None, err);
                tracing::error!(error = %classified, "container lookup failed");
                return Err(classified);
            }
        };

        self.container = Some(container.clone());
        Ok(container)
    }

    async fn create_container(&self, session: &Session, name: &str) -> Result<Container> {
        match self.service.create_container(session, name).await {
            Ok(container) => {
                tracing::debug!(container = %name, "container created");
                Ok(container)
            }
            Err(err) => {
                let classified = self.classify(Op::ContainerCreate, None, err);
                tracing::error!(error = %classified, "container create failed");
                Err(classified)
            }
        }
    }

    /// Ensure the container exists. The path argument only exists for
    /// interface parity with mount-based storages and is ignored.
    pub async fn mkdir(&mut self, _path: &str) -> Result<Container> {
        self.container().await
    }

    /// Upload the source as a single object named by the destination URI.
    ///
    /// The object key is the destination path relative to the container; the
    /// body is streamed in bounded chunks, never buffered whole. Per-upload
    /// scratch state is cleared on exit, success or failure, so the next call
    /// starts from a fresh read position. Failed uploads are not retried here
    /// — that is the caller's decision.
    pub async fn upload_single(
        &mut self,
        dest_uri: &str,
        source: &mut dyn ChunkSource,
    ) -> Result<PutOutcome> {
        let object_key = path::object_path_from_uri(dest_uri)?;
        let container = self.container().await?;
        let session = self.session().await?;
        let description = source.description();

        tracing::debug!(
            source = %description,
            container = %container.name,
            key = %object_key,
            "uploading object"
        );

        let outcome = self
            .stream_object(&session, &container.name, &object_key, source)
            .await;
        let cleared = source.clear().await;

        match outcome {
            Ok(outcome) if PUT_ACCEPTED.contains(&outcome.status) => {
                cleared?;
                tracing::debug!(key = %object_key, status = outcome.status, "object written");
                Ok(outcome)
            }
            Ok(outcome) => {
                if let Err(e) = cleared {
                    tracing::warn!(error = %e, "failed to clear upload source");
                }
                let err = self.classify(
                    Op::Upload,
                    Some(&description),
                    ServiceError::UnexpectedStatus {
                        status: outcome.status,
                        message: "object PUT returned an unexpected success status".to_string(),
                    },
                );
                tracing::error!(error = %err, "upload failed");
                Err(err)
            }
            Err(err) => {
                if let Err(e) = cleared {
                    tracing::warn!(error = %e, "failed to clear upload source");
                }
                let classified = self.classify(Op::Upload, Some(&description), err);
                tracing::error!(error = %classified, "upload failed");
                Err(classified)
            }
        }
    }

    /// Pump the source through a bounded channel into the service's PUT.
    ///
    /// The producer side reads one chunk at a time and blocks once the
    /// channel is full, so memory stays flat; the consumer side is the
    /// transport draining the body stream.
    async fn stream_object(
        &self,
        session: &Session,
        container: &str,
        key: &str,
        source: &mut dyn ChunkSource,
    ) -> ServiceResult<PutOutcome> {
        let content_length = match self.strategy {
            UploadStrategy::Chunked => None,
            UploadStrategy::ContentLength => source.byte_count(),
        };
        let content_type = mime_guess::from_path(key)
            .first()
            .map(|mime| mime.essence_str().to_string());

        let (mut tx, rx) = mpsc::channel::<io::Result<Bytes>>(UPLOAD_CHANNEL_DEPTH);
        let body = UploadBody {
            content_length,
            content_type,
            stream: rx.boxed(),
        };

        let put = self.service.put_object(session, container, key, body);
        let pump = async move {
            loop {
                match source.read_chunk().await {
                    Ok(Some(chunk)) => {
                        if tx.send(Ok(chunk)).await.is_err() {
                            // Receiver dropped: the transport gave up first;
                            // its error is the one worth reporting.
                            return Ok(());
                        }
                    }
                    Ok(None) => return Ok(()),
                    Err(err) => {
                        let copy = io::Error::new(err.kind(), err.to_string());
                        let _ = tx.send(Err(copy)).await;
                        return Err(err);
                    }
                }
            }
        };

        let (put_outcome, pumped) = futures::join!(put, pump);

        match (put_outcome, pumped) {
            (Err(err), _) => Err(err),
            (Ok(_), Err(read_err)) => Err(ServiceError::Io(read_err)),
            (Ok(outcome), Ok(())) => Ok(outcome),
        }
    }

    /// The single classification point for every service failure.
    fn classify(&self, op: Op, source_description: Option<&str>, err: ServiceError) -> Error {
        Error::classify(
            op,
            &self.endpoint.host,
            &self.endpoint.container_name,
            source_description,
            err,
        )
    }
}
