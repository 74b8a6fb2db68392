//! # Router Module
//!
//! Reference implementation of the transport collaborator.
//!
//! The route compiler only needs something that accepts
//! `handle(verb, path_template, handler)`; that contract is the
//! [`Transport`] trait. [`Router`] implements it with regex matching over
//! `:name` templates and adds what a transport has to provide at dispatch
//! time:
//!
//! - path-variable extraction into [`Request::path_params`]
//! - the [`Middleware`](crate::middleware::Middleware) chain
//! - rendering of [`InvocationError`]s as serialized
//!   [`ApiError`](crate::api_error::ApiError) bodies (400 for coercion
//!   failures, 500 otherwise, 404 for unmatched requests)
//!
//! Routes are registered once at startup. Dispatch only reads the table,
//! so a `Router` can be shared across threads without locking.
//!
//! ## Matching
//!
//! Among the routes whose verb and template match, the one with the fewest
//! path variables wins (`/sms/latest` beats `/sms/:id`); ties go to the
//! earliest registration.
//!
//! [`Request::path_params`]: crate::server::Request::path_params
//! [`InvocationError`]: crate::invoke::InvocationError

mod core;

pub use self::core::{Handler, RouteEntry, Router, Transport};
