use crate::annotation::{group_tag, http_verbs, is_controller, route_pairs};
use crate::binder::{bind_parameters, Binding};
use crate::error::{CompileError, CompileErrorKind};
use crate::invoke::{AdapterRegistry, Endpoint};
use crate::model::{MetadataModel, MethodDescriptor, MethodId, RecordDescriptor};
use crate::path::{join_paths, to_oas_path};
use crate::router::{Handler, Transport};
use crate::server::Encoder;
use http::Method;
use std::sync::Arc;
use tracing::{debug, info};

/// One route triple in typed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    pub verb: Method,
    /// `:name`-style template
    pub path: String,
    pub group_tag: Option<String>,
    pub method: MethodId,
    pub bindings: Arc<[Binding]>,
}

impl RouteConfig {
    /// The template in `{name}` document syntax.
    #[must_use]
    pub fn oas_path(&self) -> String {
        to_oas_path(&self.path)
    }
}

/// Everything needed to expose one controller method.
#[derive(Debug, Clone)]
pub struct MethodPlan<'m> {
    pub record: &'m RecordDescriptor,
    pub descriptor: &'m MethodDescriptor,
    pub id: MethodId,
    pub bindings: Arc<[Binding]>,
    /// Prefix-major, then suffix, then verb declaration order
    pub routes: Vec<RouteConfig>,
}

/// Parse an HTTP verb, ignoring case.
pub fn parse_verb(raw: &str) -> Result<Method, CompileErrorKind> {
    match raw.to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "PUT" => Ok(Method::PUT),
        "POST" => Ok(Method::POST),
        "DELETE" => Ok(Method::DELETE),
        "OPTIONS" => Ok(Method::OPTIONS),
        "HEAD" => Ok(Method::HEAD),
        "PATCH" => Ok(Method::PATCH),
        "TRACE" => Ok(Method::TRACE),
        _ => Err(CompileErrorKind::UnsupportedVerb(raw.to_string())),
    }
}

/// Plan one method. `Ok(None)` when it declares no verb or no route.
pub fn plan_method<'m>(
    record: &'m RecordDescriptor,
    method: &'m MethodDescriptor,
) -> Result<Option<MethodPlan<'m>>, CompileError> {
    let fail = |kind| CompileError::new(record.key().to_string(), method.name.clone(), kind);

    let raw_verbs = http_verbs(&method.annotations);
    let pairs = route_pairs(record, method);
    if raw_verbs.is_empty() || pairs.is_empty() {
        debug!(
            controller = %record.key(),
            method = %method.name,
            "Method is not exposed"
        );
        return Ok(None);
    }

    let verbs = raw_verbs
        .iter()
        .map(|v| parse_verb(v))
        .collect::<Result<Vec<_>, _>>()
        .map_err(fail)?;
    let bindings: Arc<[Binding]> = bind_parameters(record, method).map_err(fail)?.into();

    let id = MethodId::of(record, method);
    let tag = group_tag(record);
    let mut routes = Vec::with_capacity(pairs.len() * verbs.len());
    for (prefix, suffix) in &pairs {
        let path = join_paths(prefix, suffix);
        for verb in &verbs {
            routes.push(RouteConfig {
                verb: verb.clone(),
                path: path.clone(),
                group_tag: tag.clone(),
                method: id.clone(),
                bindings: Arc::clone(&bindings),
            });
        }
    }

    Ok(Some(MethodPlan {
        record,
        descriptor: method,
        id,
        bindings,
        routes,
    }))
}

/// Plan every exposed method of a record, in declaration order.
pub fn plan_controller(record: &RecordDescriptor) -> Result<Vec<MethodPlan<'_>>, CompileError> {
    let mut plans = Vec::new();
    for method in &record.methods {
        if let Some(plan) = plan_method(record, method)? {
            plans.push(plan);
        }
    }
    Ok(plans)
}

/// Plan every controller (stereotype-annotated record) of a model.
pub fn plan_model(model: &MetadataModel) -> Result<Vec<MethodPlan<'_>>, CompileError> {
    let mut plans = Vec::new();
    for record in model.records.iter().filter(|r| is_controller(r)) {
        plans.extend(plan_controller(record)?);
    }
    Ok(plans)
}

fn prepare(
    plans: &[MethodPlan<'_>],
    registry: &AdapterRegistry,
    encoder: &Arc<dyn Encoder>,
) -> Result<Vec<Handler>, CompileError> {
    plans
        .iter()
        .map(|plan| {
            let adapter = registry.get(&plan.id).ok_or_else(|| {
                CompileError::new(
                    plan.record.key().to_string(),
                    plan.descriptor.name.clone(),
                    CompileErrorKind::MissingAdapter(plan.id.to_string()),
                )
            })?;
            let endpoint = Endpoint::new(
                plan.id.clone(),
                plan.descriptor,
                &plan.bindings,
                adapter,
                Arc::clone(encoder),
                registry.decoders(),
            );
            Ok(endpoint.into_handler())
        })
        .collect()
}

fn register<T: Transport + ?Sized>(
    plans: &[MethodPlan<'_>],
    handlers: Vec<Handler>,
    transport: &mut T,
) -> Vec<RouteConfig> {
    let mut registered = Vec::new();
    for (plan, handler) in plans.iter().zip(handlers) {
        for route in &plan.routes {
            info!(
                method = %route.verb,
                path = %route.path,
                handler = %route.method,
                "Compiled route"
            );
            transport.handle(route.verb.clone(), &route.path, Arc::clone(&handler));
            registered.push(route.clone());
        }
    }
    registered
}

/// Compile one controller record and register its routes.
///
/// Returns the registered routes. On error nothing has been registered.
pub fn compile_controller<T: Transport + ?Sized>(
    record: &RecordDescriptor,
    registry: &AdapterRegistry,
    encoder: Arc<dyn Encoder>,
    transport: &mut T,
) -> Result<Vec<RouteConfig>, CompileError> {
    let plans = plan_controller(record)?;
    let handlers = prepare(&plans, registry, &encoder)?;
    Ok(register(&plans, handlers, transport))
}

/// Compile every controller of a model. All controllers are planned and
/// checked before any route is registered.
pub fn compile_model<T: Transport + ?Sized>(
    model: &MetadataModel,
    registry: &AdapterRegistry,
    encoder: Arc<dyn Encoder>,
    transport: &mut T,
) -> Result<Vec<RouteConfig>, CompileError> {
    let plans = plan_model(model)?;
    let handlers = prepare(&plans, registry, &encoder)?;
    let routes = register(&plans, handlers, transport);
    info!(
        controllers = model.records.iter().filter(|r| is_controller(r)).count(),
        routes_count = routes.len(),
        "Route table compiled"
    );
    Ok(routes)
}
