//! Connect Sequence - run request handlers one after another
//!
//! This library turns an ordered list of handlers and error handlers into a
//! single continuation chain. Each handler gets the request, the response and
//! a [`Next`]; it moves the sequence on by calling `next`, optionally with an
//! error, or stops it by dropping `next`.
//!
//! # Quick Start
//!
//! ```ignore
//! use connect_sequence::{Handler, Sequence};
//!
//! let mut seq = Sequence::new(req, res, |err: Option<String>| {
//!     if let Some(err) = err {
//!         eprintln!("request failed: {err}");
//!     }
//! });
//!
//! seq.append(Handler::normal(|req: &Request, _res: &Response, next| {
//!     if req.body().is_empty() {
//!         next.fail("empty body".to_string());
//!     } else {
//!         next.proceed();
//!     }
//! }))?
//! .append(Handler::error(|err, _req: &Request, res: &Response, next| {
//!     res.set_status(400);
//!     next.proceed();
//! }))?;
//!
//! seq.run();
//! ```
//!
//! # Features
//!
//! * `logging`, `timing`, `metrics` - handler middleware, see [`middleware`]
//! * `middleware` - all of the above
//! * `legacy` - the deprecated one-shot `legacy::run`

pub mod core;
pub mod middleware;

#[cfg(feature = "legacy")]
pub use crate::core::legacy;

// Convenience re-exports
pub use crate::core::builder::SequenceBuilder;
pub use crate::core::error::{SequenceError, SequenceResult};
pub use crate::core::handler::{Handler, HandlerInfo, HandlerKind};
pub use crate::core::handler_middleware::HandlerMiddleware;
pub use crate::core::next::Next;
pub use crate::core::registration::IntoHandler;
pub use crate::core::sequence::Sequence;
