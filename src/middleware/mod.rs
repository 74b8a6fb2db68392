//! # Middleware Module
//!
//! Hooks that wrap every dispatched request.
//!
//! The chain is applied last-registered-outermost: on the way in, `before`
//! runs from the most recently registered middleware inward; on the way out,
//! `after` runs for every middleware whose `before` was entered, innermost
//! first. A `before` that returns a response short-circuits the rest of the
//! chain and the handler.
//!
//! ```rust,ignore
//! let mut router = Router::new();
//! router.use_middleware(Arc::new(TracingMiddleware));
//! ```

mod core;
mod tracing;

pub use self::core::Middleware;
pub use self::tracing::TracingMiddleware;
