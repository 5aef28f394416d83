//! swc: command-line client for OpenStack Swift object storage
//!
//! Uploads stream through the swc-core client over the swc-swift HTTP
//! adapter; this binary only parses arguments, resolves profiles and formats
//! output.

mod commands;
mod exit_code;
mod output;

use clap::{Parser, Subcommand};

use output::OutputConfig;

#[derive(Parser)]
#[command(
    name = "swc",
    version,
    about = "OpenStack Swift object storage client",
    propagate_version = true
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit machine-readable JSON instead of styled text
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a local file as a single object
    Upload(commands::upload::UploadArgs),

    /// Ensure the container behind a storage URI exists
    Mkdir(commands::mkdir::MkdirArgs),

    /// Manage connection profiles
    #[command(subcommand)]
    Profile(commands::profile::ProfileCommands),

    /// Generate shell completions
    Completions(commands::completions::CompletionsArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_config = OutputConfig {
        json: cli.json,
        quiet: cli.quiet,
        no_color: cli.no_color,
    };

    let code = match cli.command {
        Commands::Upload(args) => commands::upload::execute(args, output_config).await,
        Commands::Mkdir(args) => commands::mkdir::execute(args, output_config).await,
        Commands::Profile(cmd) => commands::profile::execute(cmd, output_config).await,
        Commands::Completions(args) => commands::completions::execute(args),
    };

    std::process::exit(code as i32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_apply_after_subcommands() {
        let cli = Cli::try_parse_from(["swc", "profile", "list", "--json"]).unwrap();
        assert!(cli.json);
    }
}
