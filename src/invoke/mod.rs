//! # Invocation Adapter
//!
//! Turns an incoming request into a call of one controller method and its
//! results into a response.
//!
//! Metadata decides *which* method a route reaches; it cannot decide *how*
//! to call it in a statically typed program. Each exposed method therefore
//! gets a [`MethodAdapter`], registered up front under its [`MethodId`]
//! in an [`AdapterRegistry`]. An adapter pulls typed arguments out of
//! [`Arguments`] by parameter index and reports the method's results as an
//! [`Outcome`]:
//!
//! ```
//! use metaroute::context::RequestContext;
//! use metaroute::invoke::{AdapterRegistry, Outcome};
//! use metaroute::model::MethodId;
//!
//! let mut registry = AdapterRegistry::new();
//! registry.register(
//!     MethodId::new("example.com/sms", "SmsController", "Get"),
//!     |mut args| {
//!         let _ctx: RequestContext = args.take(0)?;
//!         let id: String = args.take(1)?;
//!         Outcome::new().value(&format!("sms {id}"))
//!     },
//! );
//! ```
//!
//! [`Endpoint`] is the per-method request path: it resolves each
//! [`Binding`](crate::binder::Binding) against the request, coerces raw
//! strings before the method body runs, invokes the adapter and renders the
//! outcome. Everything it captures is immutable, so one endpoint serves
//! concurrent requests without locking.
//!
//! [`MethodId`]: crate::model::MethodId

mod core;

pub use self::core::{
    AdapterRegistry, Argument, Arguments, Endpoint, FromArgument, InvocationError,
    MethodAdapter, Outcome, ParamPlan, Returned,
};
