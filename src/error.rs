//! Startup-time errors: route compilation and document synthesis.
//!
//! These abort registration of the offending controller and are never
//! produced per request.

use thiserror::Error;

/// Why a method could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileErrorKind {
    #[error("the named route variable '{0}' has no matching method parameter")]
    UnknownRouteVariable(String),
    #[error("the query parameter '{0}' has no matching method parameter")]
    UnknownQueryParam(String),
    #[error("the header parameter '{0}' has no matching method parameter")]
    UnknownHeaderParam(String),
    #[error("method parameter '{0}' has not been mapped to a request parameter")]
    UnboundParameter(String),
    #[error("method has an empty route")]
    EmptyRoute,
    #[error("unsupported http verb '{0}'")]
    UnsupportedVerb(String),
    #[error("no method adapter registered for '{0}'")]
    MissingAdapter(String),
}

/// A [`CompileErrorKind`] located at a controller method.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{controller}.{method}: {kind}")]
pub struct CompileError {
    /// `namespace#Identifier` of the controller record
    pub controller: String,
    pub method: String,
    #[source]
    pub kind: CompileErrorKind,
}

impl CompileError {
    pub fn new(controller: impl Into<String>, method: impl Into<String>, kind: CompileErrorKind) -> Self {
        Self {
            controller: controller.into(),
            method: method.into(),
            kind,
        }
    }
}

/// Fatal error while building the API document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("cannot emit a schema for '{0}': neither a record, an alias nor a primitive")]
    UnresolvableType(String),
}
