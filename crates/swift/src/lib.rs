//! swc-swift: Keystone/Swift HTTP adapter for the swc CLI
//!
//! Implements the `ObjectService` trait from swc-core over reqwest. The core
//! decides *when* to authenticate, look up, create and upload; this crate
//! only knows *how* those calls look on the wire.

pub mod service;
pub mod types;

pub use service::HttpObjectService;
