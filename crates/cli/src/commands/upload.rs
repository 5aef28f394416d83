//! upload command - stream one local file into a container
//!
//! Ensures the destination container exists (creating it on first use) and
//! streams the file as a single object in bounded chunks. Transient failures
//! can be retried with `--retry`; the client itself never retries.

use std::path::PathBuf;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::commands::resolve_connection;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use swc_core::source::DEFAULT_CHUNK_SIZE;
use swc_core::{
    ChunkSource, FileSource, SwiftStorage, UploadStrategy, backoff_delay,
    endpoint_uri_from_destination, is_retryable_error, object_path_from_uri,
};
use swc_swift::HttpObjectService;

/// Stream one local file into a container as a single object
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Local file to upload
    pub file: PathBuf,

    /// Destination object URI (swift://host/container/set/.../name)
    pub dest: String,

    /// Profile supplying the endpoint, credentials and transport options
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Keystone username (overrides the profile)
    #[arg(long, env = "SWC_USERNAME")]
    pub username: Option<String>,

    /// Keystone password (overrides the profile)
    #[arg(long, env = "SWC_PASSWORD")]
    pub password: Option<String>,

    /// Chunk size in bytes for the streamed transfer
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Declare the file size up front instead of chunked transfer encoding
    #[arg(long)]
    pub content_length: bool,

    /// Extra attempts for transient failures (0 = fail fast)
    #[arg(long, default_value = "0")]
    pub retry: u32,

    /// Accept TLS certificates that fail verification
    #[arg(long)]
    pub insecure: bool,
}

#[derive(Debug, Serialize)]
struct UploadOutput {
    file: String,
    container: String,
    key: String,
    bytes: u64,
    status: u16,
    etag: Option<String>,
}

/// Chunk source decorator that advances a progress bar as chunks are read.
struct ProgressSource<S> {
    inner: S,
    bar: ProgressBar,
}

#[async_trait::async_trait]
impl<S: ChunkSource> ChunkSource for ProgressSource<S> {
    fn description(&self) -> String {
        self.inner.description()
    }

    fn byte_count(&self) -> Option<u64> {
        self.inner.byte_count()
    }

    async fn read_chunk(&mut self) -> std::io::Result<Option<bytes::Bytes>> {
        let chunk = self.inner.read_chunk().await?;
        if let Some(chunk) = &chunk {
            self.bar.inc(chunk.len() as u64);
        }
        Ok(chunk)
    }

    async fn clear(&mut self) -> std::io::Result<()> {
        self.bar.set_position(0);
        self.inner.clear().await
    }
}

/// Execute the upload command
pub async fn execute(args: UploadArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    // The object key is derivable without touching the network; reject
    // malformed destinations before resolving anything else.
    let key = match object_path_from_uri(&args.dest) {
        Ok(key) => key,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::UsageError;
        }
    };
    tracing::debug!(dest = %args.dest, key = %key, "resolved object key");

    // Without a profile, the destination itself must carry the endpoint.
    let endpoint_uri = if args.profile.is_some() {
        None
    } else {
        match endpoint_uri_from_destination(&args.dest) {
            Ok(uri) => Some(uri),
            Err(e) => {
                formatter.error(&e.to_string());
                return ExitCode::UsageError;
            }
        }
    };

    let connection = match resolve_connection(
        args.profile.as_deref(),
        endpoint_uri.as_deref(),
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
    let retry_config = connection.retry.clone();

    let service = match HttpObjectService::new(&connection.transport) {
        Ok(service) => service,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::GeneralError;
        }
    };

    let strategy = if args.content_length {
        UploadStrategy::ContentLength
    } else {
        UploadStrategy::Chunked
    };
    let mut storage = match SwiftStorage::new_with_opts(connection.options, service) {
        Ok(storage) => storage.with_strategy(strategy),
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from(&e);
        }
    };

    let file_source = match FileSource::with_chunk_size(&args.file, args.chunk_size).await {
        Ok(source) => source,
        Err(e) => {
            formatter.error(&format!("could not open {}: {e}", args.file.display()));
            return ExitCode::GeneralError;
        }
    };
    let total = file_source.byte_count().unwrap_or(0);

    let bar = if formatter.is_json() || formatter.is_quiet() {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template(
                "{bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    };
    let mut source = ProgressSource {
        inner: file_source,
        bar: bar.clone(),
    };

    // The upload itself never retries; this loop is the caller-side retry
    // the --retry flag asks for. A cleared source rewinds between attempts.
    let mut attempt = 0;
    let result = loop {
        match storage.upload_single(&args.dest, &mut source).await {
            Ok(outcome) => break Ok(outcome),
            Err(err) => {
                attempt += 1;
                if attempt > args.retry || !is_retryable_error(&err) {
                    break Err(err);
                }
                let delay = backoff_delay(&retry_config, attempt);
                formatter.warning(&format!(
                    "upload failed: {err}; retrying in {}ms ({attempt}/{})",
                    delay.as_millis(),
                    args.retry
                ));
                tokio::time::sleep(delay).await;
            }
        }
    };
    bar.finish_and_clear();

    match result {
        Ok(outcome) => {
            if formatter.is_json() {
                formatter.json(&UploadOutput {
                    file: args.file.display().to_string(),
                    container: storage.container_name().to_string(),
                    key,
                    bytes: total,
                    status: outcome.status,
                    etag: outcome.etag,
                });
            } else {
                let styled_size =
                    formatter.style_size(&humansize::format_size(total, humansize::BINARY));
                let styled_container = formatter.style_name(storage.container_name());
                formatter.success(&format!(
                    "Uploaded {} ({styled_size}) to container '{styled_container}' as '{key}'",
                    args.file.display()
                ));
            }
            ExitCode::Success
        }
        Err(err) => {
            formatter.error(&err.to_string());
            ExitCode::from(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_args_defaults() {
        let args = UploadArgs {
            file: PathBuf::from("dump.db"),
            dest: "swift://host/backups/set1/dump.db".to_string(),
            profile: None,
            username: None,
            password: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            content_length: false,
            retry: 0,
            insecure: false,
        };

        assert_eq!(args.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(args.retry, 0);
        assert!(!args.content_length);
    }

    #[test]
    fn test_upload_output_omits_nothing_needed_by_scripts() {
        let output = UploadOutput {
            file: "dump.db".to_string(),
            container: "backups".to_string(),
            key: "set1/dump.db".to_string(),
            bytes: 42,
            status: 201,
            etag: Some("etag".to_string()),
        };
        let value = serde_json::to_value(&output).unwrap();

        assert_eq!(value["container"], "backups");
        assert_eq!(value["status"], 201);
        assert_eq!(value["bytes"], 42);
    }
}
