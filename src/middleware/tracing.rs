use std::time::Duration;

use tracing::{debug, info};

use super::Middleware;
use crate::dispatcher::DispatchState;
use crate::server::{RestRequest, RestResponse};

/// Logs the start and completion of each request.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, req: &RestRequest, state: &DispatchState) -> Option<RestResponse> {
        debug!(
            method = %req.method,
            path = %req.path,
            action = %state.action,
            format = %state.output_format,
            "Request start"
        );
        None
    }

    fn after(&self, req: &RestRequest, res: &mut RestResponse, latency: Duration) {
        info!(
            method = %req.method,
            path = %req.path,
            status = res.status,
            body_size_bytes = res.body.len(),
            latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
            "Request complete"
        );
    }
}
