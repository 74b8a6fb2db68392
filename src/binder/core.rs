use crate::annotation::{
    route_pairs, ANNOTATION_HEADER_PARAM, ANNOTATION_QUERY_PARAM, ATTRIBUTE_ALIAS,
};
use crate::error::CompileErrorKind;
use crate::model::{
    MethodDescriptor, RecordDescriptor, TypeRef, CONTEXT_TYPE, RAW_REQUEST_TYPE,
    RESPONSE_SINK_TYPE,
};
use crate::path::{join_paths, path_variables};
use indexmap::IndexMap;
use std::fmt;

/// Where a parameter's value comes from at request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Context,
    Path,
    Query,
    Header,
    RawRequest,
    ResponseSink,
}

impl BindingKind {
    /// Kinds resolved from a raw string and passed through coercion.
    #[inline]
    #[must_use]
    pub fn takes_raw_value(self) -> bool {
        matches!(self, BindingKind::Path | BindingKind::Query | BindingKind::Header)
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BindingKind::Context => "context",
            BindingKind::Path => "path",
            BindingKind::Query => "query",
            BindingKind::Header => "header",
            BindingKind::RawRequest => "rawRequest",
            BindingKind::ResponseSink => "rawResponseSink",
        };
        f.write_str(s)
    }
}

/// Resolved value source of one method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Position of the parameter in the method signature
    pub index: usize,
    pub kind: BindingKind,
    /// Path variable, query key or header name. The parameter name for
    /// context and raw bindings.
    pub alias: String,
}

/// Binding kind implied by the parameter type alone, if any.
#[must_use]
pub fn implicit_kind(ty: &TypeRef) -> Option<BindingKind> {
    if ty.is(CONTEXT_TYPE) {
        Some(BindingKind::Context)
    } else if ty.is(RAW_REQUEST_TYPE) {
        Some(BindingKind::RawRequest)
    } else if ty.is(RESPONSE_SINK_TYPE) {
        Some(BindingKind::ResponseSink)
    } else {
        None
    }
}

/// Resolve a [`Binding`] for every parameter of `method`.
///
/// The result is ordered by parameter index.
pub fn bind_parameters(
    record: &RecordDescriptor,
    method: &MethodDescriptor,
) -> Result<Vec<Binding>, CompileErrorKind> {
    let mut pool: IndexMap<&str, usize> = method
        .params
        .iter()
        .enumerate()
        .map(|(idx, p)| (p.name.as_str(), idx))
        .collect();
    let mut bindings = Vec::with_capacity(method.params.len());

    for (idx, param) in method.params.iter().enumerate() {
        if let Some(kind) = implicit_kind(&param.type_ref) {
            pool.shift_remove(param.name.as_str());
            bindings.push(Binding {
                index: idx,
                kind,
                alias: param.name.clone(),
            });
        }
    }

    for (prefix, suffix) in route_pairs(record, method) {
        let route = join_paths(&prefix, &suffix);
        if route.is_empty() {
            return Err(CompileErrorKind::EmptyRoute);
        }

        for variable in path_variables(&route) {
            let already_bound = bindings
                .iter()
                .any(|b| b.kind == BindingKind::Path && b.alias == variable);
            if already_bound {
                continue;
            }
            let Some(idx) = pool.shift_remove(variable.as_str()) else {
                return Err(CompileErrorKind::UnknownRouteVariable(variable));
            };
            bindings.push(Binding {
                index: idx,
                kind: BindingKind::Path,
                alias: variable,
            });
        }
    }

    for annotation in method.find_annotations(ANNOTATION_QUERY_PARAM) {
        let name = annotation.value();
        let idx = take_named(&mut pool, &name)
            .ok_or_else(|| CompileErrorKind::UnknownQueryParam(name.clone()))?;
        bindings.push(Binding {
            index: idx,
            kind: BindingKind::Query,
            alias: alias_or(annotation.attribute(ATTRIBUTE_ALIAS), name),
        });
    }

    for annotation in method.find_annotations(ANNOTATION_HEADER_PARAM) {
        let name = annotation.value();
        let idx = take_named(&mut pool, &name)
            .ok_or_else(|| CompileErrorKind::UnknownHeaderParam(name.clone()))?;
        bindings.push(Binding {
            index: idx,
            kind: BindingKind::Header,
            alias: alias_or(annotation.attribute(ATTRIBUTE_ALIAS), name),
        });
    }

    if let Some((name, _)) = pool.first() {
        return Err(CompileErrorKind::UnboundParameter((*name).to_string()));
    }

    bindings.sort_by_key(|b| b.index);
    Ok(bindings)
}

fn take_named(pool: &mut IndexMap<&str, usize>, name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }
    pool.shift_remove(name)
}

fn alias_or(alias: Option<String>, name: String) -> String {
    alias.filter(|a| !a.is_empty()).unwrap_or(name)
}
