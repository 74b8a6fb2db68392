use std::time::Duration;

use crate::context::RequestContext;
use crate::server::{Request, Response};

pub trait Middleware: Send + Sync {
    /// Name used in logs. Defaults to the implementing type.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn before(&self, _ctx: &RequestContext, _req: &Request) -> Option<Response> {
        None
    }

    fn after(&self, _ctx: &RequestContext, _req: &Request, _res: &mut Response, _latency: Duration) {}
}
