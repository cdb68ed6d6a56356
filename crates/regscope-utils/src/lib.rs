//! # regscope Utilities
//!
//! Shared utilities for the regscope workspace, mainly the logging setup
//! built on `tracing`.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{
    init_logging, init_logging_for_tui, init_logging_with_level, init_with, LogConfig, LogFormat, LogLevel,
    LoggingError, LoggingGuard,
};
pub use tracing::{debug, error, info, trace, warn};
