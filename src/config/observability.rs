//! Logging Config

use clap::Args;

/// How log lines are rendered on stderr.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// One short line per event.
    Compact,

    /// One JSON object per event, for piping into other tools.
    Json,
}

/// Logging settings for a storefront session.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Level for storefront events (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl LoggingConfig {
    /// Filter directives: storefront events at the chosen level, other crates at `warn`.
    ///
    /// A level that already contains directives (`a=debug,b=info`) is used as is.
    pub fn directives(&self) -> String {
        let level = self.log_level.trim();

        if level.contains('=') || level.contains(',') {
            level.to_string()
        } else {
            format!("warn,{}={level}", env!("CARGO_CRATE_NAME"))
        }
    }
}
