//! mkdir command - ensure the container behind a storage URI exists
//!
//! Get-or-create: looks the container up and creates it when absent. Running
//! it against an existing container is a no-op that still succeeds.

use clap::Args;
use serde::Serialize;

use crate::commands::resolve_connection;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use swc_core::SwiftStorage;
use swc_swift::HttpObjectService;

/// Ensure the container behind a storage URI exists
#[derive(Args, Debug)]
pub struct MkdirArgs {
    /// Storage URI naming the container (swift://host:port/container?...)
    pub uri: Option<String>,

    /// Profile supplying the endpoint, credentials and transport options
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Keystone username (overrides the profile)
    #[arg(long, env = "SWC_USERNAME")]
    pub username: Option<String>,

    /// Keystone password (overrides the profile)
    #[arg(long, env = "SWC_PASSWORD")]
    pub password: Option<String>,

    /// Accept TLS certificates that fail verification
    #[arg(long)]
    pub insecure: bool,
}

#[derive(Debug, Serialize)]
struct MkdirOutput {
    container: String,
    object_count: Option<u64>,
    bytes_used: Option<u64>,
}

/// Execute the mkdir command
pub async fn execute(args: MkdirArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let connection = match resolve_connection(
        args.profile.as_deref(),
        args.uri.as_deref(),
        args.username,
        args.password,
        args.insecure,
    ) {
        Ok(connection) => connection,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            return ExitCode::UsageError;
        }
    };

    let service = match HttpObjectService::new(&connection.transport) {
        Ok(service) => service,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::GeneralError;
        }
    };

    let mut storage = match SwiftStorage::new_with_opts(connection.options, service) {
        Ok(storage) => storage,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from(&e);
        }
    };

    match storage.container().await {
        Ok(container) => {
            if formatter.is_json() {
                formatter.json(&MkdirOutput {
                    container: container.name,
                    object_count: container.object_count,
                    bytes_used: container.bytes_used,
                });
            } else {
                let styled_name = formatter.style_name(&container.name);
                formatter.success(&format!("Container '{styled_name}' is present."));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mkdir_output_shape() {
        let output = MkdirOutput {
            container: "backups".to_string(),
            object_count: Some(3),
            bytes_used: None,
        };
        let value = serde_json::to_value(&output).unwrap();

        assert_eq!(value["container"], "backups");
        assert_eq!(value["object_count"], 3);
        assert!(value["bytes_used"].is_null());
    }
}
