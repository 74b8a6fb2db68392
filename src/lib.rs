//! # metaroute
//!
//! **metaroute** turns annotated controller metadata into an HTTP route table
//! and an [OpenAPI 3.1.0](https://spec.openapis.org/oas/v3.1.0) document.
//!
//! ## Overview
//!
//! A static-introspection step (outside this crate) describes every record,
//! method, parameter and annotation of an application as a
//! [`MetadataModel`](model::MetadataModel). metaroute reads that model once at
//! startup and:
//!
//! 1. binds each method parameter to a request source (path, query, header,
//!    context, raw request, response sink),
//! 2. compiles one route per verb and path combination and registers it with
//!    a [`Transport`](router::Transport),
//! 3. serves requests by coercing raw strings to the declared parameter types,
//!    invoking the method through its registered adapter and encoding the
//!    results,
//! 4. synthesizes an OpenAPI document in which every named type appears once.
//!
//! ## Architecture
//!
//! - **[`model`]** - Records, methods, parameters, annotations and aliases
//! - **[`annotation`]** - The annotation vocabulary and how it is read
//! - **[`path`]** - Route template joining and `:name` variable handling
//! - **[`binder`]** - Parameter binding resolution
//! - **[`compiler`]** - Route compilation and registration
//! - **[`coerce`]** - Type coercion of raw request strings
//! - **[`invoke`]** - Method adapters and the per-route request path
//! - **[`router`]** - In-process transport with middleware
//! - **[`server`]** - Request, response and encoder types
//! - **[`openapi`]** - Schema synthesis and the document model
//! - **[`api_error`]** - The wire error shape and error normalization
//! - **[`context`]** - Request-scoped context and request ids
//! - **[`cli`]** - The `metaroute-doc` command
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Router as router::Router
//!     participant MW as middleware::Middleware
//!     participant Endpoint as invoke::Endpoint
//!     participant Coerce as coerce::Coercer
//!     participant Adapter as invoke::MethodAdapter
//!     participant Encoder as server::Encoder
//!
//!     Client->>Router: Request
//!     Router->>MW: before()
//!     Router->>Router: match verb + template
//!     Router->>Endpoint: call(ctx, request)
//!     Endpoint->>Coerce: raw strings to declared types
//!     Coerce-->>Endpoint: ParamValue / CoerceError (400)
//!     Endpoint->>Adapter: invoke(Arguments)
//!     Adapter-->>Endpoint: Outcome
//!     alt first error return is non-nil
//!         Endpoint-->>Router: 500 + ApiError
//!     else
//!         Endpoint->>Encoder: encode each non-nil value
//!         Endpoint-->>Router: 200 + body
//!     end
//!     Router->>MW: after()
//!     Router-->>Client: Response
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use metaroute::{build_document, compile_model, load_model, AdapterRegistry, Router};
//! use metaroute::invoke::Outcome;
//! use metaroute::model::MethodId;
//! use metaroute::openapi::Info;
//! use metaroute::server::JsonEncoder;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let model = load_model("metadata.yaml")?;
//!
//! let mut adapters = AdapterRegistry::new();
//! adapters.register(
//!     MethodId::new("example.com/sms", "SmsController", "Get"),
//!     |mut args| {
//!         let id: String = args.take(1)?;
//!         Outcome::new().value(&format!("sms {id}"))
//!     },
//! );
//!
//! let mut router = Router::new();
//! compile_model(&model, &adapters, Arc::new(JsonEncoder), &mut router)?;
//!
//! let document = build_document(&model, Info::new("SMS", "1.0.0"))?;
//! println!("{}", document.to_yaml()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! The `metaroute-doc` binary and [`logging::init_logging`] read their
//! settings from `METAROUTE_*` environment variables; see [`runtime_config`].

pub mod annotation;
pub mod api_error;
pub mod binder;
pub mod cli;
pub mod coerce;
pub mod compiler;
pub mod context;
pub mod error;
pub mod invoke;
pub mod logging;
pub mod middleware;
pub mod model;
pub mod openapi;
pub mod path;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use api_error::{ApiError, ErrorContract};
pub use compiler::{compile_controller, compile_model, RouteConfig};
pub use context::{RequestContext, RequestId};
pub use error::{CompileError, CompileErrorKind, DocumentError};
pub use invoke::{AdapterRegistry, Outcome};
pub use model::{load_model, MetadataModel};
pub use openapi::{build_document, Document};
pub use router::Router;
