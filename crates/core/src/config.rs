//! Profile and transport configuration
//!
//! Profiles are named connection entries (URI plus credentials plus tuning)
//! persisted as TOML under the user config directory. The `SWC_CONFIG_DIR`
//! environment variable overrides the location for scripts and tests.
//! [`TransportConfig`] is handed to the HTTP service at construction time —
//! timeout and TLS policy never come from global state.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Retry tuning consumed by [`crate::retry::retry_with_backoff`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10_000,
        }
    }
}

/// Transport options injected into the service at construction time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransportConfig {
    /// Per-request read timeout, seconds.
    pub read_timeout_secs: u64,
    /// Connection establishment timeout, seconds.
    pub connect_timeout_secs: u64,
    /// Accept TLS certificates that fail verification (lab deployments with
    /// self-signed certs).
    pub insecure: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            read_timeout_secs: 300,
            connect_timeout_secs: 30,
            insecure: false,
        }
    }
}

/// A named connection entry: everything an upload needs besides the file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    /// Full `swift://` storage URI, query parameters included.
    pub uri: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Profile {
    pub fn new(name: &str, uri: &str, username: &str, password: &str) -> Self {
        Self {
            name: name.to_string(),
            uri: uri.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            transport: TransportConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    profiles: Vec<Profile>,
}

/// Loads and stores profiles in `profiles.toml` under the config directory.
#[derive(Debug, Clone)]
pub struct ProfileManager {
    path: PathBuf,
}

impl ProfileManager {
    pub fn new() -> Result<Self> {
        let dir = match std::env::var_os("SWC_CONFIG_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| {
                    Error::Config("could not determine the user config directory".to_string())
                })?
                .join("swc"),
        };
        Ok(Self {
            path: dir.join("profiles.toml"),
        })
    }

    /// Manager over an explicit file path. Test seam.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Add or replace a profile. The stored file stays sorted by name so
    /// listings are stable.
    pub fn set(&self, profile: Profile) -> Result<()> {
        let mut file = self.load()?;
        file.profiles.retain(|p| p.name != profile.name);
        file.profiles.push(profile);
        file.profiles.sort_by(|a, b| a.name.cmp(&b.name));
        self.store(&file)
    }

    pub fn list(&self) -> Result<Vec<Profile>> {
        Ok(self.load()?.profiles)
    }

    pub fn get(&self, name: &str) -> Result<Profile> {
        self.load()?
            .profiles
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::ProfileNotFound(name.to_string()))
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        let mut file = self.load()?;
        let before = file.profiles.len();
        file.profiles.retain(|p| p.name != name);
        if file.profiles.len() == before {
            return Err(Error::ProfileNotFound(name.to_string()));
        }
        self.store(&file)
    }

    fn load(&self) -> Result<ProfileFile> {
        if !self.path.exists() {
            return Ok(ProfileFile::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("could not parse {}: {e}", self.path.display())))
    }

    fn store(&self, file: &ProfileFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(file).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> (tempfile::TempDir, ProfileManager) {
        let dir = tempfile::TempDir::new().unwrap();
        let manager = ProfileManager::with_path(dir.path().join("profiles.toml"));
        (dir, manager)
    }

    #[test]
    fn test_round_trip() {
        let (_dir, manager) = manager();

        let profile = Profile::new(
            "lab",
            "swift://host:5000/backups?api_version=v3",
            "admin",
            "secret",
        );
        manager.set(profile.clone()).unwrap();

        assert_eq!(manager.get("lab").unwrap(), profile);
        assert_eq!(manager.list().unwrap(), vec![profile]);
    }

    #[test]
    fn test_set_replaces_by_name() {
        let (_dir, manager) = manager();

        manager
            .set(Profile::new("lab", "swift://a/backups", "admin", "one"))
            .unwrap();
        manager
            .set(Profile::new("lab", "swift://b/backups", "admin", "two"))
            .unwrap();

        let profiles = manager.list().unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].uri, "swift://b/backups");
    }

    #[test]
    fn test_listing_is_sorted_by_name() {
        let (_dir, manager) = manager();

        manager
            .set(Profile::new("zeta", "swift://z/backups", "u", "p"))
            .unwrap();
        manager
            .set(Profile::new("alpha", "swift://a/backups", "u", "p"))
            .unwrap();

        let names: Vec<_> = manager.list().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["alpha", "zeta"]);
    }

    #[test]
    fn test_missing_profile() {
        let (_dir, manager) = manager();

        assert!(matches!(
            manager.get("nope").unwrap_err(),
            Error::ProfileNotFound(_)
        ));
        assert!(matches!(
            manager.remove("nope").unwrap_err(),
            Error::ProfileNotFound(_)
        ));
    }

    #[test]
    fn test_missing_file_is_an_empty_list() {
        let (_dir, manager) = manager();
        assert!(manager.list().unwrap().is_empty());
    }

    #[test]
    fn test_defaults_fill_in_for_sparse_toml() {
        let (_dir, manager) = manager();
        if let Some(parent) = manager.path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(
            &manager.path,
            r#"
[[profiles]]
name = "lab"
uri = "swift://host:5000/backups"
username = "admin"
password = "secret"
"#,
        )
        .unwrap();

        let profile = manager.get("lab").unwrap();
        assert_eq!(profile.transport, TransportConfig::default());
        assert_eq!(profile.retry, RetryConfig::default());
    }
}
