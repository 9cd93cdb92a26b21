use std::fmt;

use tracing::{debug, error, info, warn};

use crate::core::handler::HandlerInfo;
use crate::core::handler_middleware::HandlerMiddleware;
use crate::core::next::Next;

/// Logging levels for the middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Middleware that logs handler execution through `tracing`
///
/// Three events per handler that runs:
///
/// * `Debug` when the handler starts
/// * `Info` when it calls `next` with no error
/// * `Error` when it calls `next` with an error
///
/// A handler that never calls `next` only produces the start event.
///
/// # Example
///
/// ```ignore
/// use connect_sequence::middleware::logging::{LoggingMiddleware, LogLevel};
///
/// let seq = Sequence::new(req, res, done)
///     .middleware(LoggingMiddleware::new(LogLevel::Info))
///     .handler(authorize);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LoggingMiddleware {
    level: LogLevel,
    log_success: bool,
    log_failure: bool,
}

impl LoggingMiddleware {
    /// Create a new logging middleware with the specified minimum level
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            log_success: true,
            log_failure: true,
        }
    }

    /// Create a logging middleware that only logs errors
    pub fn errors_only() -> Self {
        Self {
            level: LogLevel::Error,
            log_success: false,
            log_failure: true,
        }
    }

    /// Create a logging middleware with info level (default)
    pub fn info() -> Self {
        Self::new(LogLevel::Info)
    }

    /// Create a logging middleware with debug level
    pub fn debug() -> Self {
        Self::new(LogLevel::Debug)
    }

    /// Configure whether to log handlers that continue without error
    pub fn with_success_logging(mut self, enabled: bool) -> Self {
        self.log_success = enabled;
        self
    }

    /// Configure whether to log handlers that continue with an error
    pub fn with_failure_logging(mut self, enabled: bool) -> Self {
        self.log_failure = enabled;
        self
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    fn should_log(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    fn log(&self, level: LogLevel, site: &Site, message: fmt::Arguments<'_>) {
        if !self.should_log(level) {
            return;
        }

        let Site {
            sequence,
            index,
            handler,
        } = site;
        match level {
            LogLevel::Debug => debug!(sequence = %sequence, index, handler = %handler, "{}", message),
            LogLevel::Info => info!(sequence = %sequence, index, handler = %handler, "{}", message),
            LogLevel::Warn => warn!(sequence = %sequence, index, handler = %handler, "{}", message),
            LogLevel::Error => error!(sequence = %sequence, index, handler = %handler, "{}", message),
        }
    }
}

/// Owned copy of the handler info, carried into the continuation hook
struct Site {
    sequence: String,
    index: usize,
    handler: String,
}

impl<E: fmt::Debug + 'static> HandlerMiddleware<E> for LoggingMiddleware {
    fn on_enter(&self, info: &HandlerInfo<'_>, next: Next<E>) -> Next<E> {
        let site = Site {
            sequence: info.sequence.to_string(),
            index: info.index,
            handler: info.name.to_string(),
        };
        self.log(LogLevel::Debug, &site, format_args!("starting {}", info.kind));

        let this = *self;
        next.inspect(move |outcome| match outcome {
            None if this.log_success => {
                this.log(LogLevel::Info, &site, format_args!("continued"));
            }
            Some(err) if this.log_failure => {
                this.log(LogLevel::Error, &site, format_args!("continued with error: {:?}", err));
            }
            _ => {}
        })
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::info()
    }
}
