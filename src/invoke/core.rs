use crate::api_error::{ApiError, ErrorContract};
use crate::binder::{Binding, BindingKind};
use crate::coerce::{CoerceError, Coercer, FromParam, ParamDecoders, ParamValue};
use crate::context::RequestContext;
use crate::model::{MethodDescriptor, MethodId, TypeKey, TypeRef};
use crate::router::Handler;
use crate::server::{Encoder, Request, Response, ResponseSink};
use http::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Per-request failures on the invocation path.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("parameter '{name}': {source}")]
    Coerce {
        name: String,
        #[source]
        source: CoerceError,
    },
    #[error("{method}: argument {index} is not a {expected}")]
    ArgumentMismatch {
        method: String,
        index: usize,
        expected: &'static str,
    },
    #[error("{0}")]
    Handler(ApiError),
    #[error("failed to serialize return value: {0:#}")]
    Serialization(anyhow::Error),
}

impl InvocationError {
    /// Status the reference transport answers with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            InvocationError::Coerce { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn to_api_error(&self) -> ApiError {
        match self {
            InvocationError::Coerce { name, source } => {
                let (id, type_name) = match source {
                    CoerceError::Coercion { .. } => ("error.param.coercion", "CoercionError"),
                    CoerceError::UnsupportedParamType { .. } => {
                        ("error.param.unsupported", "UnsupportedParamType")
                    }
                };
                ApiError::new(id, self.to_string())
                    .with_type(type_name)
                    .with_details(json!({ "parameter": name }))
            }
            InvocationError::ArgumentMismatch { .. } => {
                ApiError::new("error.argument.mismatch", self.to_string())
                    .with_type("ArgumentMismatch")
            }
            InvocationError::Handler(api) => api.clone(),
            InvocationError::Serialization(err) => {
                ApiError::new("error.serialization", self.to_string())
                    .with_type("SerializationError")
                    .with_cause(ApiError::from_anyhow(err))
            }
        }
    }
}

/// One resolved argument.
pub enum Argument {
    Context(RequestContext),
    Value(ParamValue),
    RawRequest(Arc<Request>),
    ResponseSink(ResponseSink),
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Context(ctx) => write!(f, "Context({})", ctx.request_id),
            Argument::Value(v) => write!(f, "Value({v:?})"),
            Argument::RawRequest(req) => write!(f, "RawRequest({} {})", req.method, req.path),
            Argument::ResponseSink(_) => f.write_str("ResponseSink"),
        }
    }
}

/// Typed extraction of an [`Argument`]. On mismatch the argument is handed
/// back untouched.
pub trait FromArgument: Sized {
    /// Human-readable name used in mismatch errors
    const EXPECTED: &'static str;

    fn from_argument(arg: Argument) -> Result<Self, Argument>;
}

macro_rules! from_param_value {
    ($ty:ty, $expected:literal, $($variant:ident)|+) => {
        impl FromArgument for $ty {
            const EXPECTED: &'static str = $expected;

            fn from_argument(arg: Argument) -> Result<Self, Argument> {
                match arg {
                    $(Argument::Value(ParamValue::$variant(v)) => Ok(v),)+
                    other => Err(other),
                }
            }
        }
    };
}

from_param_value!(i64, "int", Int | Int64);
from_param_value!(i32, "int32", Int32);
from_param_value!(u8, "byte", Byte);
from_param_value!(String, "string", String);
from_param_value!(f64, "float64", Float64);
from_param_value!(bool, "bool", Bool);

impl FromArgument for RequestContext {
    const EXPECTED: &'static str = "context";

    fn from_argument(arg: Argument) -> Result<Self, Argument> {
        match arg {
            Argument::Context(ctx) => Ok(ctx),
            other => Err(other),
        }
    }
}

impl FromArgument for Arc<Request> {
    const EXPECTED: &'static str = "raw request";

    fn from_argument(arg: Argument) -> Result<Self, Argument> {
        match arg {
            Argument::RawRequest(req) => Ok(req),
            other => Err(other),
        }
    }
}

impl FromArgument for ResponseSink {
    const EXPECTED: &'static str = "response sink";

    fn from_argument(arg: Argument) -> Result<Self, Argument> {
        match arg {
            Argument::ResponseSink(sink) => Ok(sink),
            other => Err(other),
        }
    }
}

/// The argument vector of one invocation, indexed by parameter position.
#[derive(Debug)]
pub struct Arguments {
    method: Arc<MethodId>,
    slots: Vec<Option<Argument>>,
}

impl Arguments {
    pub fn new(method: Arc<MethodId>, args: Vec<Argument>) -> Self {
        Self {
            method,
            slots: args.into_iter().map(Some).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Move the argument at `index` out as a `T`.
    pub fn take<T: FromArgument>(&mut self, index: usize) -> Result<T, InvocationError> {
        let arg = self.take_slot(index, T::EXPECTED)?;
        T::from_argument(arg).map_err(|arg| {
            self.slots[index] = Some(arg);
            self.mismatch(index, T::EXPECTED)
        })
    }

    /// Move out a value produced by a registered [`FromParam`] decoder.
    pub fn take_custom<T: Any>(&mut self, index: usize) -> Result<T, InvocationError> {
        let expected = std::any::type_name::<T>();
        match self.take_slot(index, expected)? {
            Argument::Value(ParamValue::Custom(boxed)) => match boxed.downcast::<T>() {
                Ok(value) => Ok(*value),
                Err(boxed) => {
                    self.slots[index] = Some(Argument::Value(ParamValue::Custom(boxed)));
                    Err(self.mismatch(index, expected))
                }
            },
            other => {
                self.slots[index] = Some(other);
                Err(self.mismatch(index, expected))
            }
        }
    }

    fn take_slot(&mut self, index: usize, expected: &'static str) -> Result<Argument, InvocationError> {
        self.slots
            .get_mut(index)
            .and_then(Option::take)
            .ok_or_else(|| self.mismatch(index, expected))
    }

    fn mismatch(&self, index: usize, expected: &'static str) -> InvocationError {
        InvocationError::ArgumentMismatch {
            method: self.method.to_string(),
            index,
            expected,
        }
    }
}

/// One result slot of a method.
pub enum Returned {
    Value(Value),
    Nil,
    Error(Box<dyn ErrorContract>),
}

impl fmt::Debug for Returned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Returned::Value(v) => write!(f, "Value({v})"),
            Returned::Nil => f.write_str("Nil"),
            Returned::Error(e) => write!(f, "Error({e})"),
        }
    }
}

/// Everything a method returned, in declaration order.
#[derive(Debug, Default)]
pub struct Outcome {
    returns: Vec<Returned>,
}

impl Outcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a serializable result. `None` and unit values serialize to
    /// null and count as nil.
    pub fn value<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, InvocationError> {
        let value = serde_json::to_value(value)
            .map_err(|e| InvocationError::Serialization(e.into()))?;
        self.returns.push(Returned::Value(value));
        Ok(self)
    }

    #[must_use]
    pub fn nil(mut self) -> Self {
        self.returns.push(Returned::Nil);
        self
    }

    #[must_use]
    pub fn error<E: ErrorContract>(mut self, err: E) -> Self {
        self.returns.push(Returned::Error(Box::new(err)));
        self
    }

    /// Append an `anyhow` error, normalized up front.
    #[must_use]
    pub fn anyhow(self, err: &anyhow::Error) -> Self {
        self.error(ApiError::from_anyhow(err))
    }

    /// The usual `(value, error)` pair: `Ok(v)` becomes `[v, nil]`,
    /// `Err(e)` becomes `[nil, e]`.
    pub fn from_result<T, E>(result: Result<T, E>) -> Result<Self, InvocationError>
    where
        T: Serialize,
        E: ErrorContract,
    {
        match result {
            Ok(value) => Ok(Self::new().value(&value)?.nil()),
            Err(err) => Ok(Self::new().nil().error(err)),
        }
    }

    #[must_use]
    pub fn returns(&self) -> &[Returned] {
        &self.returns
    }

    /// The first returned error, if any.
    #[must_use]
    pub fn first_error(&self) -> Option<&dyn ErrorContract> {
        self.returns.iter().find_map(|r| match r {
            Returned::Error(e) => Some(e.as_ref()),
            _ => None,
        })
    }
}

/// Statically typed call of one controller method.
pub trait MethodAdapter: Send + Sync {
    fn invoke(&self, args: Arguments) -> Result<Outcome, InvocationError>;
}

impl<F> MethodAdapter for F
where
    F: Fn(Arguments) -> Result<Outcome, InvocationError> + Send + Sync,
{
    fn invoke(&self, args: Arguments) -> Result<Outcome, InvocationError> {
        self(args)
    }
}

/// Method adapters and parameter decoders, filled in at startup.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<MethodId, Arc<dyn MethodAdapter>>,
    decoders: ParamDecoders,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure adapter. Replaces any previous adapter for `id`.
    pub fn register<F>(&mut self, id: MethodId, adapter: F) -> &mut Self
    where
        F: Fn(Arguments) -> Result<Outcome, InvocationError> + Send + Sync + 'static,
    {
        self.register_adapter(id, Arc::new(adapter))
    }

    pub fn register_adapter(&mut self, id: MethodId, adapter: Arc<dyn MethodAdapter>) -> &mut Self {
        if self.adapters.insert(id.clone(), adapter).is_some() {
            tracing::warn!(method = %id, "replacing method adapter");
        }
        self
    }

    /// Decode parameters declared as `ty` with `T`'s [`FromParam`].
    pub fn register_decoder<T: FromParam>(&mut self, ty: TypeKey) -> &mut Self {
        self.decoders.register::<T>(ty);
        self
    }

    #[must_use]
    pub fn get(&self, id: &MethodId) -> Option<Arc<dyn MethodAdapter>> {
        self.adapters.get(id).cloned()
    }

    #[must_use]
    pub fn decoders(&self) -> &ParamDecoders {
        &self.decoders
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.adapters.keys().collect::<Vec<_>>())
            .field("decoders", &self.decoders)
            .finish()
    }
}

/// A binding with its declared type and the coercion chosen at compile time.
#[derive(Debug, Clone)]
pub struct ParamPlan {
    pub binding: Binding,
    pub declared: TypeRef,
    pub coercer: Coercer,
}

/// The request path of one compiled method. Shared by every route the
/// method is exposed under.
#[derive(Clone)]
pub struct Endpoint {
    method: Arc<MethodId>,
    params: Arc<[ParamPlan]>,
    adapter: Arc<dyn MethodAdapter>,
    encoder: Arc<dyn Encoder>,
}

impl Endpoint {
    pub fn new(
        method: MethodId,
        descriptor: &MethodDescriptor,
        bindings: &[Binding],
        adapter: Arc<dyn MethodAdapter>,
        encoder: Arc<dyn Encoder>,
        decoders: &ParamDecoders,
    ) -> Self {
        let params: Vec<ParamPlan> = bindings
            .iter()
            .map(|binding| {
                let declared = descriptor
                    .params
                    .get(binding.index)
                    .map(|p| p.type_ref.clone())
                    .unwrap_or_default();
                let coercer = Coercer::resolve(&declared, decoders);
                ParamPlan {
                    binding: binding.clone(),
                    declared,
                    coercer,
                }
            })
            .collect();

        Self {
            method: Arc::new(method),
            params: params.into(),
            adapter,
            encoder,
        }
    }

    #[must_use]
    pub fn method_id(&self) -> &MethodId {
        &self.method
    }

    #[must_use]
    pub fn params(&self) -> &[ParamPlan] {
        &self.params
    }

    /// Resolve and coerce all arguments, invoke the method, render its
    /// outcome. Coercion failures are returned before the method runs.
    pub fn call(&self, ctx: &RequestContext, req: &Arc<Request>) -> Result<Response, InvocationError> {
        let mut sink: Option<ResponseSink> = None;
        let mut args = Vec::with_capacity(self.params.len());

        for plan in self.params.iter() {
            let alias = plan.binding.alias.as_str();
            let raw = match plan.binding.kind {
                BindingKind::Context => {
                    args.push(Argument::Context(ctx.clone()));
                    continue;
                }
                BindingKind::RawRequest => {
                    args.push(Argument::RawRequest(Arc::clone(req)));
                    continue;
                }
                BindingKind::ResponseSink => {
                    args.push(Argument::ResponseSink(
                        sink.get_or_insert_with(ResponseSink::new).clone(),
                    ));
                    continue;
                }
                BindingKind::Path => req.path_param(alias),
                BindingKind::Query => req.query_param(alias),
                BindingKind::Header => req.header(alias),
            };

            let value = plan
                .coercer
                .apply(raw.unwrap_or_default(), &plan.declared)
                .map_err(|source| InvocationError::Coerce {
                    name: alias.to_string(),
                    source,
                })?;
            args.push(Argument::Value(value));
        }

        let outcome = self
            .adapter
            .invoke(Arguments::new(Arc::clone(&self.method), args))?;

        if let Some(err) = outcome.first_error() {
            return Err(InvocationError::Handler(ApiError::normalize(err)));
        }

        let mut res = sink.map(|s| s.take()).unwrap_or_else(Response::ok);
        for returned in outcome.returns() {
            let Returned::Value(value) = returned else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let bytes = self
                .encoder
                .encode(value)
                .map_err(InvocationError::Serialization)?;
            res.set_header("content-type", self.encoder.content_type());
            res.body.extend_from_slice(&bytes);
        }
        Ok(res)
    }

    /// Erase into the transport's handler type.
    #[must_use]
    pub fn into_handler(self) -> Handler {
        Arc::new(move |ctx: &RequestContext, req: &Arc<Request>| self.call(ctx, req))
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method.to_string())
            .field("params", &self.params)
            .finish()
    }
}
