//! Conversions accepted by the append family.
//!
//! Typed callers pass [`Handler`] values and can never fail. Callers that
//! assemble handlers at runtime (plugin tables, configuration-driven stacks)
//! pass boxed `Any` values instead, and get `InvalidArgument` back for
//! anything that is not a handler of the sequence's type.

use std::any::{Any, type_name};

use crate::core::error::{SequenceError, SequenceResult};
use crate::core::handler::Handler;
use crate::core::sequence::Sequence;

/// Values that can be appended to a `Sequence<Req, Res, E>`
pub trait IntoHandler<Req, Res, E> {
    fn into_handler(self) -> SequenceResult<Handler<Req, Res, E>>;
}

impl<Req, Res, E> IntoHandler<Req, Res, E> for Handler<Req, Res, E> {
    fn into_handler(self) -> SequenceResult<Handler<Req, Res, E>> {
        Ok(self)
    }
}

impl<Req, Res, E> IntoHandler<Req, Res, E> for Option<Handler<Req, Res, E>> {
    fn into_handler(self) -> SequenceResult<Handler<Req, Res, E>> {
        self.ok_or_else(|| SequenceError::invalid("expected a handler, found none"))
    }
}

impl<Req: 'static, Res: 'static, E: 'static> IntoHandler<Req, Res, E> for Box<dyn Any> {
    fn into_handler(self) -> SequenceResult<Handler<Req, Res, E>> {
        self.downcast::<Handler<Req, Res, E>>()
            .map(|handler| *handler)
            .map_err(|_| {
                SequenceError::invalid(format!(
                    "value is not a {}",
                    type_name::<Handler<Req, Res, E>>()
                ))
            })
    }
}

impl<Req: 'static, Res: 'static, E: 'static> Sequence<Req, Res, E> {
    /// Append a runtime-typed list of handlers, all or nothing
    ///
    /// `value` must hold either a `Vec<Handler<Req, Res, E>>` or a
    /// `Vec<Box<dyn Any>>` whose items each hold a handler.
    ///
    /// # Errors
    ///
    /// [`SequenceError::InvalidArgument`] if `value` is not one of those list
    /// types, or if any item of a `Vec<Box<dyn Any>>` is not a handler.
    pub fn append_list_dyn(&mut self, value: Box<dyn Any>) -> SequenceResult<&mut Self> {
        let value = match value.downcast::<Vec<Handler<Req, Res, E>>>() {
            Ok(handlers) => return self.append_list(*handlers),
            Err(value) => value,
        };

        match value.downcast::<Vec<Box<dyn Any>>>() {
            Ok(items) => self.append_list(*items),
            Err(_) => Err(SequenceError::invalid(
                "expected a list of handlers, got another type",
            )),
        }
    }
}
