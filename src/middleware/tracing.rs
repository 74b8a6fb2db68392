use std::time::Duration;

use tracing::{debug, info, warn};

use super::Middleware;
use crate::context::RequestContext;
use crate::server::{Request, Response};

/// Logs request start and completion with request id and latency.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, ctx: &RequestContext, req: &Request) -> Option<Response> {
        debug!(
            request_id = %ctx.request_id,
            method = %req.method,
            path = %req.path,
            "Request started"
        );
        None
    }

    fn after(&self, ctx: &RequestContext, req: &Request, res: &mut Response, latency: Duration) {
        let latency_ms = latency.as_millis() as u64;
        if res.status.is_server_error() {
            warn!(
                request_id = %ctx.request_id,
                method = %req.method,
                path = %req.path,
                status = res.status.as_u16(),
                latency_ms,
                "Request failed"
            );
        } else {
            info!(
                request_id = %ctx.request_id,
                method = %req.method,
                path = %req.path,
                status = res.status.as_u16(),
                latency_ms,
                "Request completed"
            );
        }
    }
}
