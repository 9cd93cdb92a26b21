//! Handler middleware, each behind its own cargo feature.

/// Logging middleware for handler execution
#[cfg(feature = "logging")]
pub mod logging;

/// Timing/performance measurement middleware
#[cfg(feature = "timing")]
pub mod timing;

/// Metrics collection middleware
#[cfg(feature = "metrics")]
pub mod metrics;
