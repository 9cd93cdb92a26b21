use crate::core::handler::HandlerInfo;
use crate::core::next::Next;

/// Trait for middleware that observes handler execution
///
/// `on_enter` is called right before a handler runs and returns the
/// continuation the handler will receive. Wrapping `next` with
/// [`Next::inspect`] lets the middleware see the moment the handler hands
/// control on, and whether it did so with an error.
///
/// Handlers that the sequence skips (kind does not match the current mode,
/// or their filter is closed) are never shown to middleware.
///
/// # Execution Order
///
/// Middleware registered on a [`Sequence`](crate::Sequence) is layered LIFO:
/// the last one registered is the outermost layer. Its `on_enter` runs first
/// and its continuation hook runs last.
pub trait HandlerMiddleware<E> {
    fn on_enter(&self, info: &HandlerInfo<'_>, next: Next<E>) -> Next<E>;
}
