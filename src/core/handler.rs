use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use crate::core::next::Next;

/// Shared callable behind a normal handler
pub(crate) type NormalFn<Req, Res, E> = Rc<dyn Fn(&Req, &Res, Next<E>)>;

/// Shared callable behind an error handler
pub(crate) type ErrorFn<Req, Res, E> = Rc<dyn Fn(E, &Req, &Res, Next<E>)>;

/// The two kinds of handler a sequence can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// Runs while no error is outstanding
    Normal,
    /// Runs only while an error is outstanding
    ErrorHandler,
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerKind::Normal => write!(f, "handler"),
            HandlerKind::ErrorHandler => write!(f, "error handler"),
        }
    }
}

pub(crate) enum HandlerFn<Req, Res, E> {
    Normal(NormalFn<Req, Res, E>),
    Error(ErrorFn<Req, Res, E>),
}

impl<Req, Res, E> Clone for HandlerFn<Req, Res, E> {
    fn clone(&self) -> Self {
        match self {
            HandlerFn::Normal(f) => HandlerFn::Normal(Rc::clone(f)),
            HandlerFn::Error(f) => HandlerFn::Error(Rc::clone(f)),
        }
    }
}

/// One step of request processing
///
/// A handler is either *normal* (`request, response, next`) or an *error
/// handler* (`error, request, response, next`). The kind is fixed by the
/// constructor used, [`Handler::normal`] or [`Handler::error`].
///
/// Handlers are cheap to clone; clones share the same callable.
///
/// # Example
///
/// ```ignore
/// let auth = Handler::normal(|req: &Request, _res: &Response, next| {
///     if req.user().is_some() { next.proceed() } else { next.fail("unauthorized") }
/// })
/// .named("auth");
///
/// let recover = Handler::error(|err, _req: &Request, res: &Response, next| {
///     res.set_status(401);
///     next.proceed();
/// });
/// ```
pub struct Handler<Req, Res, E> {
    name: Option<Cow<'static, str>>,
    func: HandlerFn<Req, Res, E>,
}

impl<Req, Res, E> Handler<Req, Res, E> {
    /// Create a normal handler
    pub fn normal<F>(f: F) -> Self
    where
        F: Fn(&Req, &Res, Next<E>) + 'static,
    {
        Self {
            name: None,
            func: HandlerFn::Normal(Rc::new(f)),
        }
    }

    /// Create an error handler
    pub fn error<F>(f: F) -> Self
    where
        F: Fn(E, &Req, &Res, Next<E>) + 'static,
    {
        Self {
            name: None,
            func: HandlerFn::Error(Rc::new(f)),
        }
    }

    /// Give the handler a name, used by logging and metrics
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The handler's name, or `"anonymous"` if none was set
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("anonymous")
    }

    pub fn kind(&self) -> HandlerKind {
        match self.func {
            HandlerFn::Normal(_) => HandlerKind::Normal,
            HandlerFn::Error(_) => HandlerKind::ErrorHandler,
        }
    }

    pub fn is_error_handler(&self) -> bool {
        self.kind() == HandlerKind::ErrorHandler
    }

    pub(crate) fn func(&self) -> &HandlerFn<Req, Res, E> {
        &self.func
    }
}

impl<Req, Res, E> Clone for Handler<Req, Res, E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            func: self.func.clone(),
        }
    }
}

impl<Req, Res, E> fmt::Debug for Handler<Req, Res, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .finish()
    }
}

/// What middleware gets to see about the handler about to run
#[derive(Debug, Clone, Copy)]
pub struct HandlerInfo<'a> {
    /// Label of the sequence running the handler
    pub sequence: &'a str,
    /// Position of the handler in append order
    pub index: usize,
    pub name: &'a str,
    pub kind: HandlerKind,
}
