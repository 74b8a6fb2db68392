//! # Type Coercion Engine
//!
//! Converts the raw string of a path, query or header binding into the
//! declared parameter type. Builtin primitives are parsed directly; any other
//! type must provide the "construct from string" capability by implementing
//! [`FromParam`] and being registered in [`ParamDecoders`] at startup.
//!
//! Which strategy applies to a parameter is decided once, when the route is
//! compiled ([`Coercer::resolve`]); per request only the chosen parser runs.

use crate::model::{TypeKey, TypeRef};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Builtin types parsed directly from strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Int,
    Int32,
    Int64,
    Byte,
    String,
    Float64,
    Bool,
}

impl Primitive {
    /// The primitive a declared type denotes, if it is one.
    #[must_use]
    pub fn of(ty: &TypeRef) -> Option<Self> {
        if !ty.is_builtin() {
            return None;
        }
        match ty.identifier.as_str() {
            "int" => Some(Primitive::Int),
            "int32" => Some(Primitive::Int32),
            "int64" => Some(Primitive::Int64),
            "byte" => Some(Primitive::Byte),
            "string" => Some(Primitive::String),
            "float64" => Some(Primitive::Float64),
            "bool" => Some(Primitive::Bool),
            _ => None,
        }
    }

    pub fn parse(self, raw: &str) -> Result<ParamValue, String> {
        match self {
            Primitive::Int => raw.parse().map(ParamValue::Int).map_err(|e| e.to_string()),
            Primitive::Int32 => raw.parse().map(ParamValue::Int32).map_err(|e| e.to_string()),
            Primitive::Int64 => raw.parse().map(ParamValue::Int64).map_err(|e| e.to_string()),
            Primitive::Byte => raw.parse().map(ParamValue::Byte).map_err(|e| e.to_string()),
            Primitive::String => Ok(ParamValue::String(raw.to_string())),
            Primitive::Float64 => raw.parse().map(ParamValue::Float64).map_err(|e| e.to_string()),
            Primitive::Bool => parse_bool(raw).map(ParamValue::Bool),
        }
    }
}

/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(format!("invalid boolean literal '{raw}'")),
    }
}

/// A coerced parameter value.
pub enum ParamValue {
    Int(i64),
    Int32(i32),
    Int64(i64),
    Byte(u8),
    String(String),
    Float64(f64),
    Bool(bool),
    /// Value produced by a registered [`FromParam`] decoder
    Custom(Box<dyn Any + Send>),
}

impl fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) | ParamValue::Int64(v) => write!(f, "{v}"),
            ParamValue::Int32(v) => write!(f, "{v}"),
            ParamValue::Byte(v) => write!(f, "{v}"),
            ParamValue::String(v) => write!(f, "{v:?}"),
            ParamValue::Float64(v) => write!(f, "{v}"),
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Custom(_) => f.write_str("<custom>"),
        }
    }
}

/// The "construct from string" capability of non-primitive parameter types.
///
/// ```
/// use metaroute::coerce::FromParam;
///
/// struct SmsId(u64);
///
/// impl FromParam for SmsId {
///     fn from_param(raw: &str) -> anyhow::Result<Self> {
///         let digits = raw.strip_prefix("sms-").unwrap_or(raw);
///         Ok(SmsId(digits.parse()?))
///     }
/// }
/// ```
pub trait FromParam: Sized + Send + 'static {
    fn from_param(raw: &str) -> anyhow::Result<Self>;
}

/// Type-erased [`FromParam`] constructor.
pub type DecodeFn = fn(&str) -> anyhow::Result<Box<dyn Any + Send>>;

fn decode_boxed<T: FromParam>(raw: &str) -> anyhow::Result<Box<dyn Any + Send>> {
    Ok(Box::new(T::from_param(raw)?))
}

/// Registered string decoders for named parameter types.
#[derive(Clone, Default)]
pub struct ParamDecoders {
    decoders: HashMap<TypeKey, DecodeFn>,
}

impl ParamDecoders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `T`'s [`FromParam`] implementation for parameters declared as `ty`.
    pub fn register<T: FromParam>(&mut self, ty: TypeKey) -> &mut Self {
        self.decoders.insert(ty, decode_boxed::<T>);
        self
    }

    #[must_use]
    pub fn contains(&self, ty: &TypeKey) -> bool {
        self.decoders.contains_key(ty)
    }

    fn get(&self, ty: &TypeRef) -> Option<DecodeFn> {
        self.decoders.get(&ty.key()).copied()
    }
}

impl fmt::Debug for ParamDecoders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.decoders.keys()).finish()
    }
}

/// Request-time coercion failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    #[error("cannot parse '{value}' as {declared}: {reason}")]
    Coercion {
        value: String,
        declared: String,
        reason: String,
    },
    #[error("parameter type {declared} cannot be constructed from a string")]
    UnsupportedParamType { declared: String },
}

/// Coercion strategy for one declared parameter type.
#[derive(Clone, Copy)]
pub enum Coercer {
    Primitive(Primitive),
    Custom(DecodeFn),
    Unsupported,
}

impl Coercer {
    #[must_use]
    pub fn resolve(declared: &TypeRef, decoders: &ParamDecoders) -> Self {
        if let Some(primitive) = Primitive::of(declared) {
            return Coercer::Primitive(primitive);
        }
        match decoders.get(declared) {
            Some(decode) => Coercer::Custom(decode),
            None => Coercer::Unsupported,
        }
    }

    pub fn apply(&self, raw: &str, declared: &TypeRef) -> Result<ParamValue, CoerceError> {
        let failed = |reason: String| CoerceError::Coercion {
            value: raw.to_string(),
            declared: declared.to_string(),
            reason,
        };
        match self {
            Coercer::Primitive(p) => p.parse(raw).map_err(failed),
            Coercer::Custom(decode) => decode(raw)
                .map(ParamValue::Custom)
                .map_err(|e| failed(format!("{e:#}"))),
            Coercer::Unsupported => Err(CoerceError::UnsupportedParamType {
                declared: declared.to_string(),
            }),
        }
    }
}

impl fmt::Debug for Coercer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coercer::Primitive(p) => write!(f, "Primitive({p:?})"),
            Coercer::Custom(_) => f.write_str("Custom"),
            Coercer::Unsupported => f.write_str("Unsupported"),
        }
    }
}

/// One-shot coercion of `raw` to `declared`.
pub fn coerce(
    raw: &str,
    declared: &TypeRef,
    decoders: &ParamDecoders,
) -> Result<ParamValue, CoerceError> {
    Coercer::resolve(declared, decoders).apply(raw, declared)
}
