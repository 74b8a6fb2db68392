//! # OpenAPI Module
//!
//! Synthesizes an OpenAPI 3.1 document from the same metadata and route
//! plans the compiler uses, without any live dispatch.
//!
//! For each exposed operation the document carries:
//! - the controller's group tag
//! - summary and description from the method doc
//! - one parameter per path, query or header binding (path parameters are
//!   required)
//! - a `200` response derived from the first non-error return value
//! - `400` and `500` responses referencing one shared `Error` schema
//!
//! ## Type mapping
//!
//! | declared | schema |
//! |----------|--------|
//! | `int`, `int32` | `integer` / `int32` |
//! | `int64` | `integer` / `int64` |
//! | `float32` | `number` / `float` |
//! | `float64` | `number` / `double` |
//! | `string` | `string` |
//! | `byte` | `string` / `byte` |
//! | `bool` | `boolean` |
//! | `[]T` | `array` of `T` |
//! | record, alias | `$ref` to a deduplicated component schema |
//!
//! Anything else is a fatal [`DocumentError::UnresolvableType`].
//!
//! [`DocumentError::UnresolvableType`]: crate::error::DocumentError::UnresolvableType

mod synth;
#[cfg(test)]
mod tests;
mod types;

pub use synth::{build_document, SchemaSynthesizer, ERROR_SCHEMA, SYNTHETIC_NAMESPACE};
pub use types::{
    Components, Document, Info, MediaType, Operation, Parameter, ParameterLocation, PathItem,
    Response, Schema, SchemaType, COMPONENTS_SCHEMAS, OPENAPI_VERSION,
};
