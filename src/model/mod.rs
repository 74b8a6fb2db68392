//! # Metadata Model
//!
//! Records, methods, parameters, annotations and doc text as produced by the
//! static-introspection step. Everything downstream (binding, route
//! compilation, document synthesis) reads this model and never mutates it.
//!
//! The model is normally constructed by the introspection collaborator and
//! handed over in memory, or serialized to YAML/JSON and read back with
//! [`load_model`].

mod load;
mod types;

pub use load::*;
pub use types::*;
