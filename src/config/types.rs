//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_API_URL, DEFAULT_COUNTDOWN_SECS, RESOLVE_TIMEOUT_SECS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Session configuration.
///
/// Doubles as the CLI surface of the binary and the programmatic entry point
/// of the library. Construct it with `Config::parse()` in a binary or with
/// struct syntax plus `..Default::default()` in library callers.
///
/// # Examples
///
/// ```no_run
/// use shortlink_gate::Config;
///
/// let config = Config {
///     short_code: "abc123".into(),
///     countdown_secs: 8,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "shortlink_gate",
    version,
    about = "Resolves a short link, shows a preview, counts down, then redirects."
)]
pub struct Config {
    /// Short code to resolve (the path segment of the short URL)
    pub short_code: String,

    /// Backend API base URL
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Seconds to count down before redirecting
    #[arg(long = "countdown", default_value_t = DEFAULT_COUNTDOWN_SECS)]
    pub countdown_secs: u32,

    /// Per-request timeout in seconds for link resolution
    #[arg(long, default_value_t = RESOLVE_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Bearer token attached to backend requests, if the session is signed in
    #[arg(long)]
    pub access_token: Option<String>,

    /// Skip the countdown and confirm the redirect immediately
    #[arg(long)]
    pub now: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            short_code: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            timeout_seconds: RESOLVE_TIMEOUT_SECS,
            access_token: None,
            now: false,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.countdown_secs, DEFAULT_COUNTDOWN_SECS);
        assert_eq!(config.timeout_seconds, RESOLVE_TIMEOUT_SECS);
        assert!(config.access_token.is_none());
        assert!(!config.now);
    }

    #[test]
    fn test_config_parses_countdown_flag() {
        let config = Config::parse_from(["shortlink_gate", "abc123", "--countdown", "8"]);
        assert_eq!(config.short_code, "abc123");
        assert_eq!(config.countdown_secs, 8);
    }

    #[test]
    fn test_config_parses_now_flag() {
        let config = Config::parse_from(["shortlink_gate", "abc123", "--now"]);
        assert!(config.now);
    }
}
