//! CLI output configuration and formatting

mod formatter;

pub use formatter::Formatter;

/// Output behavior shared by every command, resolved from global flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Strict JSON on stdout, errors as JSON on stderr.
    pub json: bool,
    /// Suppress everything except errors.
    pub quiet: bool,
    /// Plain text without ANSI styling.
    pub no_color: bool,
}
