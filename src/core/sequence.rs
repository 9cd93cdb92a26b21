use std::borrow::Cow;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::core::builder::SequenceBuilder;
use crate::core::error::{SequenceError, SequenceResult};
use crate::core::filter::{FilterFlags, Gate, GroupId};
use crate::core::handler::{Handler, HandlerFn, HandlerInfo, HandlerKind};
use crate::core::handler_middleware::HandlerMiddleware;
use crate::core::next::Next;
use crate::core::registration::IntoHandler;

pub(crate) const DEFAULT_LABEL: &str = "sequence";

/// A handler plus the filter gate it was appended under, if any
pub(crate) struct Entry<Req, Res, E> {
    pub(crate) handler: Handler<Req, Res, E>,
    pub(crate) gate: Option<Gate<Req>>,
}

/// Ordered list of handlers bound to one request/response pair
///
/// Handlers run in the order they were appended. Each one receives a
/// [`Next`] and decides when, and whether, the sequence moves on. Passing an
/// error to `next` switches the sequence into error mode: normal handlers are
/// skipped until an error handler takes the error, and if none does the
/// terminal continuation receives it.
///
/// # Lifecycle
///
/// Created empty, filled by the append family, consumed by [`run`](Self::run).
///
/// # Example
///
/// ```ignore
/// use connect_sequence::{Handler, Sequence};
///
/// let mut seq = Sequence::new(req, res, |err: Option<AppError>| {
///     if let Some(err) = err {
///         eprintln!("unhandled: {err}");
///     }
/// });
///
/// seq.append(Handler::normal(parse_body))?
///     .append(Handler::normal(authorize))?
///     .append_if(|req: &Request| req.is_admin(), [Handler::normal(audit)])?
///     .append(Handler::error(render_error))?;
///
/// seq.run();
/// ```
pub struct Sequence<Req, Res, E> {
    request: Req,
    response: Res,
    terminal: Next<E>,
    entries: Vec<Entry<Req, Res, E>>,
    middlewares: Vec<Rc<dyn HandlerMiddleware<E>>>,
    next_group: u32,
    label: Cow<'static, str>,
}

impl<Req: 'static, Res: 'static, E: 'static> Sequence<Req, Res, E> {
    /// Create an empty sequence bound to `request`, `response` and the
    /// terminal continuation
    ///
    /// The terminal continuation runs once every handler has moved on. It
    /// receives the outstanding error, if one reached the end of the chain
    /// without being handled.
    pub fn new<T>(request: Req, response: Res, terminal: T) -> Self
    where
        T: FnOnce(Option<E>) + 'static,
    {
        Self::from_parts(request, response, Next::new(terminal), DEFAULT_LABEL.into())
    }

    /// Start a validated construction, see [`SequenceBuilder`]
    pub fn builder() -> SequenceBuilder<Req, Res, E> {
        SequenceBuilder::new()
    }

    pub(crate) fn from_parts(
        request: Req,
        response: Res,
        terminal: Next<E>,
        label: Cow<'static, str>,
    ) -> Self {
        Self {
            request,
            response,
            terminal,
            entries: Vec::new(),
            middlewares: Vec::new(),
            next_group: 0,
            label,
        }
    }

    /// Set the label used in log events for this sequence
    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    /// Append a normal handler (fluent API - consumes self)
    pub fn handler<F>(self, f: F) -> Self
    where
        F: Fn(&Req, &Res, Next<E>) + 'static,
    {
        self.with(Handler::normal(f))
    }

    /// Append an error handler (fluent API - consumes self)
    pub fn error_handler<F>(self, f: F) -> Self
    where
        F: Fn(E, &Req, &Res, Next<E>) + 'static,
    {
        self.with(Handler::error(f))
    }

    /// Append an already built handler (fluent API - consumes self)
    pub fn with(mut self, handler: Handler<Req, Res, E>) -> Self {
        self.entries.push(Entry { handler, gate: None });
        self
    }

    /// Add a middleware layer around every handler that runs
    ///
    /// # Execution Order: LIFO (Last In, First Out)
    ///
    /// The last middleware added is the outermost layer:
    ///
    /// ```text
    /// Timing.on_enter
    ///   → Logging.on_enter
    ///     → handler(req, res, next)
    ///     ← Logging hook (next called)
    /// ← Timing hook
    /// ```
    pub fn middleware<M>(mut self, middleware: M) -> Self
    where
        M: HandlerMiddleware<E> + 'static,
    {
        self.middlewares.push(Rc::new(middleware));
        self
    }

    /// Append one handler value
    ///
    /// # Errors
    ///
    /// [`SequenceError::InvalidArgument`] if `handler` does not convert into
    /// a handler; nothing is appended in that case.
    pub fn append<H>(&mut self, handler: H) -> SequenceResult<&mut Self>
    where
        H: IntoHandler<Req, Res, E>,
    {
        let handler = handler.into_handler()?;
        self.entries.push(Entry { handler, gate: None });
        Ok(self)
    }

    /// Append handlers in order, all or nothing
    ///
    /// # Errors
    ///
    /// [`SequenceError::InvalidArgument`] if any value does not convert into
    /// a handler. None of the values are appended in that case.
    pub fn append_list<I, H>(&mut self, handlers: I) -> SequenceResult<&mut Self>
    where
        I: IntoIterator<Item = H>,
        H: IntoHandler<Req, Res, E>,
    {
        let handlers = collect_handlers(handlers)?;
        self.entries
            .extend(handlers.into_iter().map(|handler| Entry { handler, gate: None }));
        Ok(self)
    }

    /// Append handlers that only run when `filter(request)` holds
    ///
    /// The handlers form one group. The filter runs once per run, when the
    /// first member of the group is about to run, and its answer gates every
    /// member of the group, normal handlers and error handlers alike. A closed
    /// group passes the current outcome through untouched.
    ///
    /// # Errors
    ///
    /// * [`SequenceError::InvalidArgument`] if any value does not convert into
    ///   a handler
    /// * [`SequenceError::MissingArgument`] if no handler is given
    ///
    /// Nothing is appended on error.
    pub fn append_if<F, I, H>(&mut self, filter: F, handlers: I) -> SequenceResult<&mut Self>
    where
        F: Fn(&Req) -> bool + 'static,
        I: IntoIterator<Item = H>,
        H: IntoHandler<Req, Res, E>,
    {
        let handlers = collect_handlers(handlers)?;
        if handlers.is_empty() {
            return Err(SequenceError::missing(
                "append_if needs a filter and at least one handler",
            ));
        }

        let gate = Gate::new(GroupId(self.next_group), Rc::new(filter));
        self.next_group += 1;
        self.entries.extend(handlers.into_iter().map(|handler| Entry {
            handler,
            gate: Some(gate.clone()),
        }));
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Kinds of the appended handlers, in append order
    pub fn kinds(&self) -> impl Iterator<Item = HandlerKind> + '_ {
        self.entries.iter().map(|entry| entry.handler.kind())
    }

    /// Names of the appended handlers, in append order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|entry| entry.handler.name())
    }

    /// Run the sequence
    ///
    /// Builds the continuation chain from the last handler back to the first,
    /// each link closing over the one after it, then starts the first link
    /// with no error. Returns as soon as the handlers stop calling their
    /// continuations synchronously; a handler that keeps its `Next` for later
    /// resumes the chain whenever it calls it.
    ///
    /// # Stack use
    ///
    /// A handler that calls `next` before returning runs the rest of the
    /// sequence inside its own call, so a fully synchronous run nests a few
    /// small frames (the link closure, `dispatch`, the handler) per handler.
    /// Thousands of synchronous handlers fit on a default 2 MiB thread;
    /// longer chains should defer some continuations to the host event loop
    /// or run on a thread with a larger stack.
    pub fn run(self) {
        let Self {
            request,
            response,
            terminal,
            entries,
            middlewares,
            label,
            ..
        } = self;

        debug!(sequence = %label, handlers = entries.len(), "running sequence");

        let state = Rc::new(RunState {
            label,
            request,
            response,
            flags: FilterFlags::default(),
            middlewares,
        });

        let tail = {
            let state = Rc::clone(&state);
            terminal.inspect(move |outcome| {
                debug!(
                    sequence = %state.label,
                    unhandled_error = outcome.is_some(),
                    "reached terminal continuation"
                );
            })
        };

        let head = entries
            .into_iter()
            .enumerate()
            .rev()
            .fold(tail, |next, (index, entry)| {
                let state = Rc::clone(&state);
                Next::new(move |outcome| state.dispatch(index, &entry, outcome, next))
            });

        drop(state);
        head.proceed();
    }
}

fn collect_handlers<Req, Res, E, I, H>(handlers: I) -> SequenceResult<Vec<Handler<Req, Res, E>>>
where
    I: IntoIterator<Item = H>,
    H: IntoHandler<Req, Res, E>,
{
    handlers.into_iter().map(IntoHandler::into_handler).collect()
}

/// State shared by every link of one run
struct RunState<Req, Res, E> {
    label: Cow<'static, str>,
    request: Req,
    response: Res,
    flags: FilterFlags,
    middlewares: Vec<Rc<dyn HandlerMiddleware<E>>>,
}

/// What `dispatch` did with a link, for trace output
#[derive(Debug, Clone, Copy)]
enum Step {
    Run,
    SkipNormal,
    SkipErrorHandler,
    FilterClosed,
}

impl<Req: 'static, Res: 'static, E: 'static> RunState<Req, Res, E> {
    // Synchronous handlers nest one dispatch per link, so nothing here may
    // keep large locals on the stack; logging and layering stay out of line.
    fn dispatch(&self, index: usize, entry: &Entry<Req, Res, E>, outcome: Option<E>, next: Next<E>) {
        match (entry.handler.func(), outcome) {
            (HandlerFn::Normal(f), None) => {
                if self.gate_open(index, entry) {
                    self.note(index, entry, Step::Run);
                    f(&self.request, &self.response, self.layer(index, &entry.handler, next));
                } else {
                    next.proceed();
                }
            }
            (HandlerFn::Error(f), Some(err)) => {
                if self.gate_open(index, entry) {
                    self.note(index, entry, Step::Run);
                    f(err, &self.request, &self.response, self.layer(index, &entry.handler, next));
                } else {
                    next.fail(err);
                }
            }
            (HandlerFn::Normal(_), Some(err)) => {
                self.note(index, entry, Step::SkipNormal);
                next.fail(err);
            }
            (HandlerFn::Error(_), None) => {
                self.note(index, entry, Step::SkipErrorHandler);
                next.proceed();
            }
        }
    }

    #[inline(never)]
    fn gate_open(&self, index: usize, entry: &Entry<Req, Res, E>) -> bool {
        let Some(gate) = &entry.gate else {
            return true;
        };

        let open = self.flags.is_open(gate, &self.request);
        if !open {
            self.note(index, entry, Step::FilterClosed);
        }
        open
    }

    #[inline(never)]
    fn note(&self, index: usize, entry: &Entry<Req, Res, E>, step: Step) {
        let handler = &entry.handler;
        let message = match step {
            Step::Run => "running",
            Step::SkipNormal => "error outstanding, skipping",
            Step::SkipErrorHandler => "no error outstanding, skipping",
            Step::FilterClosed => "filter closed, skipping",
        };
        trace!(
            sequence = %self.label,
            index,
            handler = handler.name(),
            kind = %handler.kind(),
            group = ?entry.gate.as_ref().map(Gate::group),
            "{}",
            message
        );
    }

    /// Pass `next` through the middleware stack, outermost (last added) first
    #[inline(never)]
    fn layer(&self, index: usize, handler: &Handler<Req, Res, E>, next: Next<E>) -> Next<E> {
        if self.middlewares.is_empty() {
            return next;
        }

        let info = HandlerInfo {
            sequence: &self.label,
            index,
            name: handler.name(),
            kind: handler.kind(),
        };
        self.middlewares
            .iter()
            .rev()
            .fold(next, |next, middleware| middleware.on_enter(&info, next))
    }
}
