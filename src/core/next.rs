/// One-shot continuation handed to every handler
///
/// Calling [`proceed`](Self::proceed) moves the sequence on in normal mode;
/// calling [`fail`](Self::fail) moves it on in error mode, which skips normal
/// handlers until an error handler picks the error up.
///
/// Every method takes `self` by value, so a continuation runs at most once.
/// A handler may keep its `Next` and call it later (from a queue, a timer
/// callback, ...). Dropping it without calling it stops the sequence.
///
/// # Example
///
/// ```ignore
/// seq.append(Handler::normal(|req: &Request, _res: &Response, next| {
///     if req.is_authorized() {
///         next.proceed();
///     } else {
///         next.fail(AppError::Unauthorized);
///     }
/// }))?;
/// ```
pub struct Next<E> {
    link: Box<dyn FnOnce(Option<E>)>,
}

impl<E: 'static> Next<E> {
    /// Wrap a callback as a continuation
    pub fn new<F>(link: F) -> Self
    where
        F: FnOnce(Option<E>) + 'static,
    {
        Self {
            link: Box::new(link),
        }
    }

    /// Continue with no error
    pub fn proceed(self) {
        (self.link)(None)
    }

    /// Continue in error mode with `err`
    pub fn fail(self, err: E) {
        (self.link)(Some(err))
    }

    /// Continue with an explicit outcome: `None` proceeds, `Some` fails
    pub fn resume(self, outcome: Option<E>) {
        (self.link)(outcome)
    }

    /// Continue from a `Result`: `Ok` proceeds, `Err` fails
    pub fn settle<T>(self, result: Result<T, E>) {
        self.resume(result.err())
    }

    /// Return a continuation that runs `hook` on the outcome before
    /// forwarding it to `self`
    ///
    /// This is how middleware observes the moment a handler hands control on.
    pub fn inspect<F>(self, hook: F) -> Self
    where
        F: FnOnce(Option<&E>) + 'static,
    {
        Self::new(move |outcome: Option<E>| {
            hook(outcome.as_ref());
            self.resume(outcome)
        })
    }
}

impl<E> std::fmt::Debug for Next<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}
