use crate::api_error::ApiError;
use crate::context::{RequestContext, RequestId};
use crate::invoke::InvocationError;
use crate::middleware::Middleware;
use crate::path::template_to_regex;
use crate::server::{ParamVec, Request, Response};
use http::{Method, StatusCode};
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// A type-erased request handler.
pub type Handler =
    Arc<dyn Fn(&RequestContext, &Arc<Request>) -> Result<Response, InvocationError> + Send + Sync>;

/// The registration side of a transport.
pub trait Transport {
    /// Register `handler` for `verb` on a `:name`-style path template.
    fn handle(&mut self, verb: Method, path_template: &str, handler: Handler);
}

/// One registered route.
#[derive(Clone)]
pub struct RouteEntry {
    pub verb: Method,
    pub template: String,
    regex: Regex,
    params: Vec<Arc<str>>,
    handler: Handler,
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("verb", &self.verb)
            .field("template", &self.template)
            .field("params", &self.params)
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct Router {
    routes: Vec<RouteEntry>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware. The most recently added one runs outermost.
    pub fn use_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Registered routes in registration order.
    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Match `verb` and `path` to a route and extract its path variables.
    #[must_use]
    pub fn route(&self, verb: &Method, path: &str) -> Option<(&RouteEntry, ParamVec)> {
        let mut best: Option<(&RouteEntry, regex::Captures<'_>)> = None;
        for entry in self.routes.iter().filter(|e| &e.verb == verb) {
            let Some(caps) = entry.regex.captures(path) else {
                continue;
            };
            if best
                .as_ref()
                .map_or(true, |(b, _)| entry.params.len() < b.params.len())
            {
                best = Some((entry, caps));
            }
        }

        let (entry, caps) = best?;
        let params = entry
            .params
            .iter()
            .zip(caps.iter().skip(1))
            .filter_map(|(name, m)| m.map(|m| (Arc::clone(name), m.as_str().to_string())))
            .collect();
        Some((entry, params))
    }

    /// Dispatch with a fresh context. The request id is taken from an
    /// `x-request-id` header when it carries a valid ULID.
    pub fn serve(&self, req: Request) -> Response {
        let request_id = RequestId::from_header_or_new(req.header("x-request-id"));
        self.dispatch(&RequestContext::with_request_id(request_id), req)
    }

    /// Run one request through the middleware chain and the matched handler.
    pub fn dispatch(&self, ctx: &RequestContext, mut req: Request) -> Response {
        let start = Instant::now();
        let handler = match self.route(&req.method, &req.path) {
            Some((entry, params)) => {
                debug!(
                    request_id = %ctx.request_id,
                    method = %req.method,
                    path = %req.path,
                    route = %entry.template,
                    "Route matched"
                );
                req.path_params = params;
                Some(Arc::clone(&entry.handler))
            }
            None => None,
        };
        let req = Arc::new(req);

        let mut entered = 0;
        let mut early: Option<Response> = None;
        for mw in self.middlewares.iter().rev() {
            entered += 1;
            if let Some(res) = mw.before(ctx, &req) {
                debug!(
                    request_id = %ctx.request_id,
                    middleware = mw.name(),
                    "Middleware returned early response"
                );
                early = Some(res);
                break;
            }
        }

        let mut res = match (early, handler) {
            (Some(res), _) => res,
            (None, Some(handler)) => match handler(ctx, &req) {
                Ok(res) => res,
                Err(err) => {
                    error!(
                        request_id = %ctx.request_id,
                        method = %req.method,
                        path = %req.path,
                        status = err.status().as_u16(),
                        error = %err,
                        "Handler failed"
                    );
                    Response::error(err.status(), &err.to_api_error())
                }
            },
            (None, None) => {
                warn!(
                    request_id = %ctx.request_id,
                    method = %req.method,
                    path = %req.path,
                    "No route matched"
                );
                Response::error(
                    StatusCode::NOT_FOUND,
                    &ApiError::new(
                        "error.route.not_found",
                        format!("no route for {} {}", req.method, req.path),
                    )
                    .with_type("NotFound"),
                )
            }
        };

        let latency: Duration = start.elapsed();
        let first_entered = self.middlewares.len() - entered;
        for mw in &self.middlewares[first_entered..] {
            mw.after(ctx, &req, &mut res, latency);
        }
        res
    }
}

impl Transport for Router {
    fn handle(&mut self, verb: Method, path_template: &str, handler: Handler) {
        let (regex, params) = template_to_regex(path_template);
        let entry = RouteEntry {
            verb,
            template: path_template.to_string(),
            regex,
            params: params.into_iter().map(Arc::from).collect(),
            handler,
        };

        if let Some(existing) = self
            .routes
            .iter_mut()
            .find(|e| e.verb == entry.verb && e.template == entry.template)
        {
            warn!(
                method = %entry.verb,
                path = %entry.template,
                "Replaced existing route"
            );
            *existing = entry;
            return;
        }

        info!(
            method = %entry.verb,
            path = %entry.template,
            total_routes = self.routes.len() + 1,
            "Route registered"
        );
        self.routes.push(entry);
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes)
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}
