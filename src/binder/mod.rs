//! # Parameter Binder
//!
//! Maps every parameter of a controller method to exactly one runtime value
//! source. Resolution happens once, at registration time; the resulting
//! [`Binding`] list is shared read-only by the route table and the document
//! synthesizer.
//!
//! Resolution order, each step removing the matched parameters from the pool:
//!
//! 1. parameters typed as the request context, raw request or response sink
//! 2. `:name` variables of every combined route template
//! 3. `http.QueryParam` annotations
//! 4. `http.HeaderParam` annotations
//!
//! Anything left over is an [`UnboundParameter`](crate::error::CompileErrorKind::UnboundParameter).

mod core;

pub use self::core::{bind_parameters, implicit_kind, Binding, BindingKind};
