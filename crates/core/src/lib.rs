//! swc-core: Core library for the swc Swift CLI client
//!
//! This crate provides the backend-independent half of swc:
//! - Storage URI parsing and object-key derivation
//! - The lazily-authenticated client with get-or-create containers and
//!   streaming uploads
//! - The `ObjectService` seam the HTTP adapter implements
//! - Profile, transport and retry configuration
//!
//! The crate knows nothing about HTTP. Everything network-shaped goes
//! through [`ObjectService`], which keeps the client logic testable against
//! recording stubs.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod path;
pub mod retry;
pub mod service;
pub mod source;

pub use client::{StorageOptions, SwiftStorage, UploadStrategy};
pub use config::{Profile, ProfileManager, RetryConfig, TransportConfig};
pub use endpoint::{SecurityProtocol, StorageEndpoint, URI_SCHEME};
pub use error::{Error, Op, Result, ServiceError, ServiceResult};
pub use path::{endpoint_uri_from_destination, object_path_from_uri, uri_to_local_path};
pub use retry::{RetryBuilder, backoff_delay, is_retryable_error, retry_with_backoff};
pub use service::{Container, Credentials, ObjectService, PutOutcome, Session, UploadBody};
pub use source::{ChunkSource, FileSource};
