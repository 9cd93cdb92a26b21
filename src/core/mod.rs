pub mod builder;
pub mod error;
pub mod filter;
pub mod handler;
pub mod handler_middleware;
pub mod next;
pub mod registration;
pub mod sequence;

#[cfg(feature = "legacy")]
pub mod legacy;
