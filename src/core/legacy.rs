use crate::core::handler::Handler;
use crate::core::sequence::Sequence;

/// Run `handlers` in order against `request` and `response`, then `terminal`
///
/// One-shot form of building a [`Sequence`], appending `handlers` and calling
/// [`Sequence::run`]. Kept for callers of the 0.1 API; it will be removed in
/// 0.3.
///
/// # Example
///
/// ```ignore
/// #[allow(deprecated)]
/// connect_sequence::legacy::run(req, res, |err| done(err), vec![
///     Handler::normal(first),
///     Handler::normal(second),
/// ]);
/// ```
#[deprecated(
    since = "0.2.0",
    note = "build a `Sequence`, append the handlers and call `Sequence::run`"
)]
pub fn run<Req, Res, E, T>(request: Req, response: Res, terminal: T, handlers: Vec<Handler<Req, Res, E>>)
where
    Req: 'static,
    Res: 'static,
    E: 'static,
    T: FnOnce(Option<E>) + 'static,
{
    handlers
        .into_iter()
        .fold(Sequence::new(request, response, terminal), Sequence::with)
        .with_label("legacy")
        .run()
}
