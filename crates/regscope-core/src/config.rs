//! Session configuration.
//!
//! Catalog selection is never configurable; it follows from the register
//! names the backend reports. What can be configured is how the backend is
//! launched and how long callers wait for it.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use regscope_protocol::RegisterValueFormat;

use crate::error::{RegscopeError, RegscopeResult};

/// Environment variable naming the MI debugger executable.
pub const DEBUGGER_ENV: &str = "REGSCOPE_DEBUGGER";
/// Environment variable holding the backend timeout in milliseconds.
pub const TIMEOUT_ENV: &str = "REGSCOPE_TIMEOUT_MS";

/// How long a caller waits for one backend round trip by default.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for one debugging session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig
{
    /// Debugger executable speaking MI (default: `gdb`)
    pub debugger: PathBuf,
    /// Extra arguments, e.g. `-p 1234` or `./prog core.1234`
    pub debugger_args: Vec<String>,
    /// Upper bound on a single backend round trip
    pub backend_timeout: Duration,
    /// Format requested for register values
    pub value_format: RegisterValueFormat,
}

impl Default for SessionConfig
{
    fn default() -> Self
    {
        Self {
            debugger: PathBuf::from("gdb"),
            debugger_args: Vec::new(),
            backend_timeout: DEFAULT_BACKEND_TIMEOUT,
            value_format: RegisterValueFormat::Hex,
        }
    }
}

impl SessionConfig
{
    /// Defaults overridden by `REGSCOPE_DEBUGGER` and `REGSCOPE_TIMEOUT_MS`.
    ///
    /// ## Errors
    ///
    /// `InvalidArgument` if the timeout is not a positive integer.
    pub fn from_env() -> RegscopeResult<Self>
    {
        let mut config = Self::default();
        if let Ok(debugger) = env::var(DEBUGGER_ENV) {
            if !debugger.is_empty() {
                config.debugger = PathBuf::from(debugger);
            }
        }
        if let Ok(raw) = env::var(TIMEOUT_ENV) {
            config.backend_timeout = parse_timeout_ms(&raw)?;
        }
        Ok(config)
    }

    /// Replace the extra debugger arguments.
    #[must_use]
    pub fn with_debugger_args(mut self, args: Vec<String>) -> Self
    {
        self.debugger_args = args;
        self
    }

    /// Replace the backend timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self
    {
        self.backend_timeout = timeout;
        self
    }
}

/// Parse a millisecond count, rejecting zero.
///
/// ## Errors
///
/// `InvalidArgument` for anything but a positive integer.
pub fn parse_timeout_ms(raw: &str) -> RegscopeResult<Duration>
{
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(RegscopeError::InvalidArgument(format!(
            "backend timeout must be a positive number of milliseconds, got '{raw}'"
        ))),
        Ok(ms) => Ok(Duration::from_millis(ms)),
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_defaults()
    {
        let config = SessionConfig::default();
        assert_eq!(config.debugger, PathBuf::from("gdb"));
        assert!(config.debugger_args.is_empty());
        assert_eq!(config.backend_timeout, DEFAULT_BACKEND_TIMEOUT);
        assert_eq!(config.value_format, RegisterValueFormat::Hex);
    }

    #[test]
    fn test_parse_timeout_ms()
    {
        assert_eq!(parse_timeout_ms("250").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_timeout_ms(" 5 ").unwrap(), Duration::from_millis(5));
        assert!(matches!(parse_timeout_ms("0"), Err(RegscopeError::InvalidArgument(_))));
        assert!(matches!(parse_timeout_ms("soon"), Err(RegscopeError::InvalidArgument(_))));
    }

    #[test]
    fn test_builders()
    {
        let config = SessionConfig::default()
            .with_debugger_args(vec!["-p".to_string(), "42".to_string()])
            .with_timeout(Duration::from_secs(1));
        assert_eq!(config.debugger_args, vec!["-p", "42"]);
        assert_eq!(config.backend_timeout, Duration::from_secs(1));
    }
}
