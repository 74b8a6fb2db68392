//! # Server Module
//!
//! Transport-facing request and response types shared by the reference
//! [`Router`](crate::router::Router) and the invocation adapters.
//!
//! - [`Request`] carries the verb, the matched path variables, the decoded
//!   query string, headers and the raw body. Lookups are allocation-free.
//! - [`Response`] is what a handler produces: status, headers, body bytes.
//! - [`ResponseSink`] is the raw response writer handed to methods that
//!   declare a parameter of the response-sink type.
//! - [`Encoder`] is the serialization seam. [`JsonEncoder`] is the default.
//!
//! Small-vector storage (`ParamVec`, `HeaderVec`) keeps the common case of a
//! handful of parameters and headers on the stack.

mod encoder;
mod request;
mod response;

pub use encoder::{Encoder, JsonEncoder};
pub use request::{HeaderVec, ParamVec, Request, MAX_INLINE_HEADERS, MAX_INLINE_PARAMS};
pub use response::{Response, ResponseSink};
