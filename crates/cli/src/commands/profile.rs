//! Profile management commands
//!
//! Profiles are named references to Swift endpoints: the full storage URI
//! plus credentials and transport tuning.

use clap::Subcommand;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use swc_core::{Profile, ProfileManager, StorageEndpoint};

/// Profile subcommands for managing storage connections
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Add or update a profile
    Set(SetArgs),

    /// List all configured profiles
    List(ListArgs),

    /// Remove a profile
    Remove(RemoveArgs),
}

/// Arguments for the `profile set` command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Profile name (e.g., "lab", "prod")
    pub name: String,

    /// Storage URI (e.g., `swift://swift.example.com:5000/backups?api_version=v3`)
    pub uri: String,

    /// Keystone username
    pub username: String,

    /// Keystone password
    pub password: String,

    /// Accept TLS certificates that fail verification
    #[arg(long, default_value = "false")]
    pub insecure: bool,
}

/// Arguments for the `profile list` command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show full details including transport settings
    #[arg(short, long)]
    pub long: bool,
}

/// Arguments for the `profile remove` command
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the profile to remove
    pub name: String,
}

/// JSON output for profile list
#[derive(Serialize)]
struct ProfileListOutput {
    profiles: Vec<ProfileInfo>,
}

/// Profile information for JSON output (without the password)
#[derive(Serialize)]
struct ProfileInfo {
    name: String,
    uri: String,
    username: String,
    insecure: bool,
}

impl From<&Profile> for ProfileInfo {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            uri: profile.uri.clone(),
            username: profile.username.clone(),
            insecure: profile.transport.insecure,
        }
    }
}

/// JSON output for profile set/remove operations
#[derive(Serialize)]
struct ProfileOperationOutput {
    success: bool,
    profile: String,
    message: String,
}

/// Execute a profile subcommand
pub async fn execute(cmd: ProfileCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let manager = match ProfileManager::new() {
        Ok(manager) => manager,
        Err(e) => {
            formatter.error(&format!("Failed to load profiles: {e}"));
            return ExitCode::GeneralError;
        }
    };

    match cmd {
        ProfileCommands::Set(args) => execute_set(args, &manager, &formatter).await,
        ProfileCommands::List(args) => execute_list(args, &manager, &formatter).await,
        ProfileCommands::Remove(args) => execute_remove(args, &manager, &formatter).await,
    }
}

async fn execute_set(args: SetArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    if args.name.is_empty() {
        formatter.error("Profile name cannot be empty");
        return ExitCode::UsageError;
    }

    // The URI has to resolve to an endpoint now, not at upload time.
    if let Err(e) = StorageEndpoint::parse(&args.uri) {
        formatter.error(&e.to_string());
        return ExitCode::UsageError;
    }

    let mut profile = Profile::new(&args.name, &args.uri, &args.username, &args.password);
    profile.transport.insecure = args.insecure;

    match manager.set(profile) {
        Ok(()) => {
            if formatter.is_json() {
                let output = ProfileOperationOutput {
                    success: true,
                    profile: args.name.clone(),
                    message: format!("Profile '{}' configured successfully", args.name),
                };
                formatter.json(&output);
            } else {
                let styled_name = formatter.style_name(&args.name);
                formatter.success(&format!("Profile '{styled_name}' configured successfully."));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::GeneralError
        }
    }
}

async fn execute_list(args: ListArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    match manager.list() {
        Ok(profiles) => {
            if formatter.is_json() {
                let output = ProfileListOutput {
                    profiles: profiles.iter().map(ProfileInfo::from).collect(),
                };
                formatter.json(&output);
            } else if profiles.is_empty() {
                formatter.println("No profiles configured.");
            } else if args.long {
                for profile in &profiles {
                    let styled_name = formatter.style_name(&format!("{:<12}", profile.name));
                    let styled_uri = formatter.style_url(&profile.uri);
                    let styled_detail = formatter.style_detail(&format!(
                        "user: {}, read timeout: {}s{}",
                        profile.username,
                        profile.transport.read_timeout_secs,
                        if profile.transport.insecure {
                            ", insecure"
                        } else {
                            ""
                        }
                    ));
                    formatter.println(&format!("{styled_name} {styled_uri} ({styled_detail})"));
                }
            } else {
                for profile in &profiles {
                    let styled_name = formatter.style_name(&format!("{:<12}", profile.name));
                    let styled_uri = formatter.style_url(&profile.uri);
                    formatter.println(&format!("{styled_name} {styled_uri}"));
                }
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::GeneralError
        }
    }
}

async fn execute_remove(
    args: RemoveArgs,
    manager: &ProfileManager,
    formatter: &Formatter,
) -> ExitCode {
    match manager.remove(&args.name) {
        Ok(()) => {
            if formatter.is_json() {
                let output = ProfileOperationOutput {
                    success: true,
                    profile: args.name.clone(),
                    message: format!("Profile '{}' removed successfully", args.name),
                };
                formatter.json(&output);
            } else {
                let styled_name = formatter.style_name(&args.name);
                formatter.success(&format!("Profile '{styled_name}' removed successfully."));
            }
            ExitCode::Success
        }
        Err(swc_core::Error::ProfileNotFound(_)) => {
            formatter.error(&format!("Profile '{}' not found", args.name));
            ExitCode::NotFound
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::GeneralError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_info_hides_the_password() {
        let profile = Profile::new("lab", "swift://host:5000/backups", "admin", "secret");
        let info = ProfileInfo::from(&profile);
        let value = serde_json::to_value(&info).unwrap();

        assert_eq!(value["name"], "lab");
        assert_eq!(value["username"], "admin");
        assert!(value.get("password").is_none());
    }

    #[test]
    fn test_set_args_defaults() {
        let args = SetArgs {
            name: "lab".to_string(),
            uri: "swift://host:5000/backups".to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
            insecure: false,
        };

        assert!(!args.insecure);
    }
}
