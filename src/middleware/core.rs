use std::time::Duration;

use crate::dispatcher::DispatchState;
use crate::server::{RestRequest, RestResponse};

/// Hooks around the action of every request handled by a controller.
///
/// `before` sees the request after pre-dispatch; returning a response skips
/// the action. `after` runs once the response is complete.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &RestRequest, _state: &DispatchState) -> Option<RestResponse> {
        None
    }
    fn after(&self, _req: &RestRequest, _res: &mut RestResponse, _latency: Duration) {}
}
