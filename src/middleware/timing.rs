use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use hashbrown::HashMap;
use tracing::info;

use crate::core::handler::HandlerInfo;
use crate::core::handler_middleware::HandlerMiddleware;
use crate::core::next::Next;

/// Middleware that measures how long each handler holds control
///
/// The clock starts when the handler is entered and stops when it calls its
/// continuation, so a handler that defers `next` is measured up to the
/// deferred call.
///
/// # Example
///
/// ```ignore
/// use connect_sequence::middleware::timing::TimingMiddleware;
/// use std::time::Duration;
///
/// // Log all handlers
/// let seq = Sequence::new(req, res, done)
///     .middleware(TimingMiddleware::new())
///     .handler(load_user);
///
/// // Only log slow handlers (> 100ms) and keep the numbers
/// let timing = TimingMiddleware::new()
///     .with_threshold(Duration::from_millis(100))
///     .recording();
/// let seq = seq.middleware(timing.clone());
/// ```
#[derive(Clone)]
pub struct TimingMiddleware {
    threshold: Option<Duration>,
    recorded: Option<Rc<RefCell<HashMap<String, Duration>>>>,
}

impl TimingMiddleware {
    /// Create a new timing middleware that logs every handler duration
    pub fn new() -> Self {
        Self {
            threshold: None,
            recorded: None,
        }
    }

    /// Only log handlers that take at least the specified threshold
    pub fn with_threshold(mut self, threshold: Duration) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Keep the latest duration of each handler, keyed by handler name
    ///
    /// Clones share the recorded durations.
    pub fn recording(mut self) -> Self {
        self.recorded = Some(Rc::default());
        self
    }

    /// Latest recorded duration for `handler`, if recording is enabled
    pub fn duration_of(&self, handler: &str) -> Option<Duration> {
        self.recorded.as_ref()?.borrow().get(handler).copied()
    }

    fn should_log(threshold: Option<Duration>, duration: Duration) -> bool {
        match threshold {
            Some(threshold) => duration >= threshold,
            None => true,
        }
    }

    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();
        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", duration.as_secs_f64())
        }
    }
}

impl<E: 'static> HandlerMiddleware<E> for TimingMiddleware {
    fn on_enter(&self, info: &HandlerInfo<'_>, next: Next<E>) -> Next<E> {
        let start = Instant::now();
        let handler = info.name.to_string();
        let sequence = info.sequence.to_string();
        let threshold = self.threshold;
        let recorded = self.recorded.clone();

        next.inspect(move |_| {
            let duration = start.elapsed();

            if Self::should_log(threshold, duration) {
                info!(
                    sequence = %sequence,
                    handler = %handler,
                    "took {}",
                    Self::format_duration(duration)
                );
            }

            if let Some(recorded) = recorded {
                recorded.borrow_mut().insert(handler, duration);
            }
        })
    }
}

impl Default for TimingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}
