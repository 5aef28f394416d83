//! Command implementations

pub mod completions;
pub mod mkdir;
pub mod profile;
pub mod upload;

use anyhow::{Context, bail};
use swc_core::{ProfileManager, RetryConfig, StorageOptions, TransportConfig};

/// Connection settings resolved from a profile and/or explicit flags.
#[derive(Debug)]
pub(crate) struct Connection {
    pub options: StorageOptions,
    pub transport: TransportConfig,
    pub retry: RetryConfig,
}

/// Merge a named profile with explicit overrides. Explicit values win; the
/// profile fills in whatever was not given on the command line.
pub(crate) fn resolve_connection(
    profile_name: Option<&str>,
    uri: Option<&str>,
    username: Option<String>,
    password: Option<String>,
    insecure: bool,
) -> anyhow::Result<Connection> {
    let profile = match profile_name {
        Some(name) => Some(
            ProfileManager::new()
                .and_then(|manager| manager.get(name))
                .with_context(|| format!("could not load profile '{name}'"))?,
        ),
        None => None,
    };

    let uri = uri
        .map(str::to_string)
        .or_else(|| profile.as_ref().map(|p| p.uri.clone()));
    let Some(uri) = uri else {
        bail!("a storage URI is required (give one explicitly or via --profile)");
    };

    let username = username.or_else(|| profile.as_ref().map(|p| p.username.clone()));
    let password = password.or_else(|| profile.as_ref().map(|p| p.password.clone()));

    let mut transport = profile
        .as_ref()
        .map(|p| p.transport.clone())
        .unwrap_or_default();
    if insecure {
        transport.insecure = true;
    }
    let retry = profile
        .as_ref()
        .map(|p| p.retry.clone())
        .unwrap_or_default();

    Ok(Connection {
        options: StorageOptions {
            uri,
            username,
            password,
        },
        transport,
        retry,
    })
}
