use tracing_subscriber::{filter::LevelFilter, EnvFilter};

/// Logging arguments shared by all binaries.
#[derive(Debug, Clone, clap::Args)]
pub struct LogArgs {
    /// The log verbosity. `RUST_LOG` directives, if set, are applied on top of it.
    #[clap(
        long = "log.level",
        value_enum,
        default_value_t = LogLevel::Info,
        env = "LOG_LEVEL",
        global = true
    )]
    pub level: LogLevel,
    /// The format of log output. Defaults to `color` when stdout is a terminal, `text` otherwise.
    #[clap(long = "log.format", value_enum, global = true)]
    pub format: Option<LogFormat>,
}

impl Default for LogArgs {
    fn default() -> Self {
        LogArgs {
            level: LogLevel::Info,
            format: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, clap::ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, clap::ValueEnum)]
pub enum LogFormat {
    /// Newline-delimited JSON events.
    Json,
    /// Plain text without ANSI escapes.
    Text,
    /// Text with ANSI colors.
    Color,
}

impl LogFormat {
    fn resolve(format: Option<LogFormat>) -> LogFormat {
        match format {
            Some(format) => format,
            None if atty::is(atty::Stream::Stdout) => LogFormat::Color,
            None => LogFormat::Text,
        }
    }
}

/// Installs the global tracing subscriber. Events are written to stdout, which is
/// what the monitoring server captures from alert scripts.
pub fn init_logging(args: &LogArgs) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(args.level).into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stdout)
        .with_target(false);

    // A subscriber may already be installed (for example, by a test harness).
    let result = match LogFormat::resolve(args.format) {
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
        LogFormat::Text => builder.with_ansi(false).try_init(),
        LogFormat::Color => builder.with_ansi(true).try_init(),
    };
    if let Err(error) = result {
        tracing::debug!(%error, "tracing subscriber was already initialized");
    }
}
