//! Structured logging setup for ag-kaizen
//!
//! This module provides initialization and configuration for structured logging using
//! the `tracing` ecosystem. Log lines go to stderr so that `analyze` output on
//! stdout stays machine-readable.
//!
//! # Features
//!
//! - Console output with pretty formatting (default)
//! - Optional JSON output for production environments
//! - Environment-based configuration via `RUST_LOG`
//! - Thread-safe, can only be initialized once
//!
//! # Example
//!
//! ```no_run
//! use ag_kaizen::util::logging;
//!
//! logging::init_from_env();
//!
//! tracing::info!("Service started");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

/// Noisy dependencies kept at `warn` unless `RUST_LOG` says otherwise
const QUIET_TARGETS: &[&str] = &["h2=warn", "hyper=warn", "reqwest=warn", "genai=warn"];

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format (for structured logging in production)
    pub use_json: bool,

    /// Include the module target (e.g., ag_kaizen::assist) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,

    /// Include thread ID and name in logs
    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    /// INFO level, pretty console output, targets on
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    /// Creates a logging configuration with the specified level
    ///
    /// # Example
    ///
    /// ```
    /// use ag_kaizen::util::LoggingConfig;
    /// use tracing::Level;
    ///
    /// let config = LoggingConfig::with_level(Level::DEBUG);
    /// assert!(!config.use_json);
    /// ```
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }
}

/// Parses a log level from a string
///
/// Returns `Level::INFO` if the string is not a known level.
///
/// ```
/// use ag_kaizen::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("loud"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn build_filter(level: Level, rust_log_set: bool) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("ag_kaizen={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    if !rust_log_set {
        if let Ok(directive) = format!("tower_http={}", level).parse() {
            filter = filter.add_directive(directive);
        }
        for target in QUIET_TARGETS {
            if let Ok(directive) = target.parse() {
                filter = filter.add_directive(directive);
            }
        }
    }

    filter
}

/// Initializes the logging system with the provided configuration
///
/// Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level, env::var("RUST_LOG").is_ok());

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        }
    });
}

/// Reads `KAIZEN_LOG_JSON` (true/false)
pub fn json_from_env() -> bool {
    env::var("KAIZEN_LOG_JSON")
        .ok()
        .and_then(|v| v.trim().parse::<bool>().ok())
        .unwrap_or(false)
}

/// Initializes logging from environment variables
///
/// - `KAIZEN_LOG_LEVEL` - Log level (trace, debug, info, warn, error)
/// - `KAIZEN_LOG_JSON` - Use JSON output (true/false)
/// - `RUST_LOG` - Standard Rust log filtering
pub fn init_from_env() {
    let level_str = env::var("KAIZEN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    init_logging(LoggingConfig {
        level: parse_level(&level_str),
        use_json: json_from_env(),
        ..Default::default()
    });
}
