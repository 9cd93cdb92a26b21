use std::borrow::Cow;

use crate::core::error::{SequenceError, SequenceResult};
use crate::core::next::Next;
use crate::core::sequence::{DEFAULT_LABEL, Sequence};

/// Validated construction for a [`Sequence`]
///
/// A sequence needs a request, a response and a terminal continuation.
/// [`Sequence::new`] takes all three at once; the builder lets them arrive
/// separately (from configuration, from an adapter, ...) and reports the
/// first one missing.
///
/// # Example
///
/// ```ignore
/// let seq = Sequence::builder()
///     .request(req)
///     .response(res)
///     .terminal(|err: Option<AppError>| finish(err))
///     .label("api")
///     .build()?;
/// ```
pub struct SequenceBuilder<Req, Res, E> {
    request: Option<Req>,
    response: Option<Res>,
    terminal: Option<Next<E>>,
    label: Cow<'static, str>,
}

impl<Req: 'static, Res: 'static, E: 'static> SequenceBuilder<Req, Res, E> {
    pub fn new() -> Self {
        Self {
            request: None,
            response: None,
            terminal: None,
            label: Cow::Borrowed(DEFAULT_LABEL),
        }
    }

    pub fn request(mut self, request: Req) -> Self {
        self.request = Some(request);
        self
    }

    pub fn response(mut self, response: Res) -> Self {
        self.response = Some(response);
        self
    }

    pub fn terminal<T>(mut self, terminal: T) -> Self
    where
        T: FnOnce(Option<E>) + 'static,
    {
        self.terminal = Some(Next::new(terminal));
        self
    }

    pub fn label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    /// Build the sequence
    ///
    /// # Errors
    ///
    /// [`SequenceError::MissingArgument`] naming the first of request,
    /// response or terminal continuation that was not supplied.
    pub fn build(self) -> SequenceResult<Sequence<Req, Res, E>> {
        let request = self.request.ok_or_else(|| SequenceError::missing("request"))?;
        let response = self.response.ok_or_else(|| SequenceError::missing("response"))?;
        let terminal = self
            .terminal
            .ok_or_else(|| SequenceError::missing("terminal continuation"))?;

        Ok(Sequence::from_parts(request, response, terminal, self.label))
    }
}

impl<Req: 'static, Res: 'static, E: 'static> Default for SequenceBuilder<Req, Res, E> {
    fn default() -> Self {
        Self::new()
    }
}
