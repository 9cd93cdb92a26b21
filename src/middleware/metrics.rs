use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use hashbrown::HashMap;

use crate::core::handler::HandlerInfo;
use crate::core::handler_middleware::HandlerMiddleware;
use crate::core::next::Next;

/// Statistics for a single handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerMetrics {
    pub handler_name: String,
    /// Times the handler was entered
    pub invocations: u64,
    /// Times it called `next` with no error
    pub continued: u64,
    /// Times it called `next` with an error
    pub errored: u64,
    pub total_duration_micros: u64,
    pub min_duration_micros: u64,
    pub max_duration_micros: u64,
}

impl HandlerMetrics {
    fn new(handler_name: String) -> Self {
        Self {
            handler_name,
            invocations: 0,
            continued: 0,
            errored: 0,
            total_duration_micros: 0,
            min_duration_micros: u64::MAX,
            max_duration_micros: 0,
        }
    }

    fn record(&mut self, duration_micros: u64, errored: bool) {
        if errored {
            self.errored += 1;
        } else {
            self.continued += 1;
        }

        self.total_duration_micros += duration_micros;
        self.min_duration_micros = self.min_duration_micros.min(duration_micros);
        self.max_duration_micros = self.max_duration_micros.max(duration_micros);
    }

    /// Invocations that have not called `next` (yet)
    pub fn pending(&self) -> u64 {
        self.invocations
            .saturating_sub(self.continued)
            .saturating_sub(self.errored)
    }

    /// Average time until `next` was called, in microseconds
    pub fn avg_duration_micros(&self) -> u64 {
        let completed = self.continued + self.errored;
        if completed == 0 {
            0
        } else {
            self.total_duration_micros / completed
        }
    }

    /// Share of completed invocations that continued without error (0.0 - 100.0)
    pub fn success_rate(&self) -> f64 {
        let completed = self.continued + self.errored;
        if completed == 0 {
            0.0
        } else {
            (self.continued as f64 / completed as f64) * 100.0
        }
    }
}

/// Middleware that collects per-handler execution metrics
///
/// Metrics are keyed by handler name, so unnamed handlers are aggregated
/// under `"anonymous"`. Clones share the same storage, which makes it easy to
/// keep a handle for reading after the sequence consumed the middleware.
///
/// A continuation records into the entry that was current when its handler
/// was entered. After [`reset`](Self::reset), continuations still held by
/// handlers report into the discarded entries and never touch new ones.
///
/// # Example
///
/// ```ignore
/// use connect_sequence::middleware::metrics::MetricsMiddleware;
///
/// let metrics = MetricsMiddleware::new();
///
/// Sequence::new(req, res, done)
///     .middleware(metrics.clone())
///     .with(Handler::normal(load_user).named("load_user"))
///     .run();
///
/// metrics.print_summary();
/// let stats = metrics.get_metrics("load_user");
/// ```
#[derive(Clone, Default)]
pub struct MetricsMiddleware {
    metrics: Rc<RefCell<HashMap<String, Rc<RefCell<HandlerMetrics>>>>>,
}

impl MetricsMiddleware {
    /// Create a new metrics middleware
    pub fn new() -> Self {
        Self::default()
    }

    /// Get metrics for a specific handler
    pub fn get_metrics(&self, handler_name: &str) -> Option<HandlerMetrics> {
        self.metrics
            .borrow()
            .get(handler_name)
            .map(|entry| entry.borrow().clone())
    }

    /// Get all collected metrics, sorted by handler name
    pub fn get_all_metrics(&self) -> Vec<HandlerMetrics> {
        let mut all: Vec<_> = self
            .metrics
            .borrow()
            .values()
            .map(|entry| entry.borrow().clone())
            .collect();
        all.sort_by(|a, b| a.handler_name.cmp(&b.handler_name));
        all
    }

    /// Reset all metrics
    pub fn reset(&self) {
        self.metrics.borrow_mut().clear();
    }

    /// Print a summary of all metrics to stdout
    pub fn print_summary(&self) {
        println!("\n=== Handler Metrics Summary ===");
        println!(
            "{:<25} {:>10} {:>10} {:>10} {:>10} {:>12} {:>12} {:>12} {:>10}",
            "Handler", "Calls", "Continued", "Errored", "Pending", "Avg (µs)", "Min (µs)", "Max (µs)", "Success %"
        );
        println!("{}", "-".repeat(125));

        for metric in self.get_all_metrics() {
            let min = if metric.min_duration_micros == u64::MAX {
                0
            } else {
                metric.min_duration_micros
            };
            println!(
                "{:<25} {:>10} {:>10} {:>10} {:>10} {:>12} {:>12} {:>12} {:>9.1}%",
                metric.handler_name,
                metric.invocations,
                metric.continued,
                metric.errored,
                metric.pending(),
                metric.avg_duration_micros(),
                min,
                metric.max_duration_micros,
                metric.success_rate()
            );
        }
        println!();
    }
}

impl<E: 'static> HandlerMiddleware<E> for MetricsMiddleware {
    fn on_enter(&self, info: &HandlerInfo<'_>, next: Next<E>) -> Next<E> {
        let entry = Rc::clone(
            self.metrics
                .borrow_mut()
                .entry_ref(info.name)
                .or_insert_with(|| {
                    Rc::new(RefCell::new(HandlerMetrics::new(info.name.to_string())))
                }),
        );
        entry.borrow_mut().invocations += 1;

        let start = Instant::now();
        next.inspect(move |outcome| {
            let duration = start.elapsed().as_micros() as u64;
            entry.borrow_mut().record(duration, outcome.is_some());
        })
    }
}
