//! # Route Compiler
//!
//! Turns annotated controller records into registered routes.
//!
//! Compilation happens in two steps:
//!
//! 1. **Planning** ([`plan_controller`], [`plan_model`]): for every method
//!    with at least one verb and one route template, resolve its
//!    [`Binding`](crate::binder::Binding)s and compute the
//!    prefix × suffix × verb route triples as typed [`RouteConfig`]s. Nothing
//!    is registered; the document synthesizer and the operator CLI work from
//!    plans alone.
//! 2. **Registration** ([`compile_controller`], [`compile_model`]): look up
//!    every planned method's adapter, build one shared
//!    [`Endpoint`](crate::invoke::Endpoint) per method and hand one handler
//!    per route to the [`Transport`](crate::router::Transport).
//!
//! A controller either registers completely or not at all: all plans and
//! adapters are resolved before the first route is handed to the transport.
//!
//! ```rust,ignore
//! let model = load_model("model.yaml")?;
//! let mut router = Router::new();
//! compile_model(&model, &registry, Arc::new(JsonEncoder), &mut router)?;
//! ```

mod core;

pub use self::core::{
    compile_controller, compile_model, parse_verb, plan_controller, plan_method, plan_model,
    MethodPlan, RouteConfig,
};
