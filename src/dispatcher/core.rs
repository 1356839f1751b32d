use std::sync::Arc;
use std::time::{Duration, Instant};

use http::Method;
use tracing::{debug, error, info, warn};

use crate::action::{self, resolve_action, Action};
use crate::error::RestError;
use crate::format::{ResponseEnvelope, ResponseFormatter};
use crate::method::resolve_method;
use crate::middleware::Middleware;
use crate::params::{aggregate, ParamMap};
use crate::runtime_config::RestConfig;
use crate::server::{RestRequest, RestResponse};
use crate::views::{TemplateViews, ViewEngine};

/// Query/body parameter that switches on suppress-response-codes mode.
pub const SUPPRESS_PARAM: &str = "suppressResponseCodes";

/// `cache-control` value sent after mutating requests.
pub const NO_CACHE: &str = "no-cache, no-store, max-age=0, must-revalidate";

/// Per-request dispatch decisions, produced by [`RestController::before`].
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchState {
    /// Effective method after overrides
    pub method: Method,
    pub action: Action,
    /// Aggregated parameters
    pub params: ParamMap,
    /// Output format identifier, e.g. `json`
    pub output_format: String,
    /// Send 200 and carry the real status in the body as `responseCode`
    pub suppress_response_codes: bool,
}

/// What an action sees: the request, the dispatch decisions and the response
/// it may add headers to.
pub struct RestContext<'a> {
    pub request: &'a RestRequest,
    pub state: &'a DispatchState,
    pub response: &'a mut RestResponse,
}

impl RestContext<'_> {
    /// Aggregated parameters of the request.
    #[must_use]
    pub fn params(&self) -> &ParamMap {
        &self.state.params
    }

    /// A parameter as a string; nested values yield `None`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.state.params.get(name).and_then(|v| v.as_str())
    }
}

/// Business logic behind a REST resource.
///
/// Each action returns the envelope to format. Actions a resource does not
/// override answer [`RestError::ActionNotImplemented`].
pub trait Resource: Send + Sync {
    fn index(&self, _ctx: &mut RestContext<'_>) -> Result<ResponseEnvelope, RestError> {
        Err(RestError::ActionNotImplemented(Action::Index))
    }

    fn create(&self, _ctx: &mut RestContext<'_>) -> Result<ResponseEnvelope, RestError> {
        Err(RestError::ActionNotImplemented(Action::Create))
    }

    fn update(&self, _ctx: &mut RestContext<'_>) -> Result<ResponseEnvelope, RestError> {
        Err(RestError::ActionNotImplemented(Action::Update))
    }

    fn delete(&self, _ctx: &mut RestContext<'_>) -> Result<ResponseEnvelope, RestError> {
        Err(RestError::ActionNotImplemented(Action::Delete))
    }
}

/// Runs one resource through method resolution, action mapping, parameter
/// aggregation and response formatting.
///
/// Holds only shared, immutable state; one controller serves any number of
/// requests, from any thread.
#[derive(Clone)]
pub struct RestController {
    resource: Arc<dyn Resource>,
    formatter: ResponseFormatter,
    config: RestConfig,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl std::fmt::Debug for RestController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestController")
            .field("formatter", &self.formatter)
            .field("config", &self.config)
            .field("middleware_count", &self.middlewares.len())
            .finish()
    }
}

impl RestController {
    /// Controller with the default formatter. HTML views come from
    /// `config.views_dir` when set.
    pub fn new(resource: Arc<dyn Resource>, config: RestConfig) -> Self {
        let views: Arc<dyn ViewEngine> = match &config.views_dir {
            Some(dir) => Arc::new(TemplateViews::new(dir.clone())),
            None => Arc::new(TemplateViews::builtin()),
        };
        Self {
            resource,
            formatter: ResponseFormatter::with_defaults(Some(views)),
            config,
            middlewares: Vec::new(),
        }
    }

    /// Replace the formatter (e.g. to register more formats).
    #[must_use]
    pub fn with_formatter(mut self, formatter: ResponseFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Append a middleware; hooks run in registration order.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        debug!(
            middleware_name = std::any::type_name_of_val(mw.as_ref()),
            middleware_count = self.middlewares.len() + 1,
            "Middleware registered"
        );
        self.middlewares.push(mw);
    }

    #[must_use]
    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    #[must_use]
    pub fn formatter(&self) -> &ResponseFormatter {
        &self.formatter
    }

    /// Pre-dispatch: method, action, parameters, output format and the
    /// suppress-response-codes flag, in that order.
    ///
    /// The effective method is written back to `req.method`.
    pub fn before(&self, req: &mut RestRequest) -> DispatchState {
        let method = resolve_method(req, &self.config.override_header);
        let action = resolve_action(&method);
        let params = aggregate(req);
        let output_format = req
            .route
            .format
            .clone()
            .unwrap_or_else(|| self.config.default_format.clone());
        let suppress_response_codes = params
            .get(SUPPRESS_PARAM)
            .and_then(|v| v.as_str())
            .is_some_and(|v| v == "true");

        debug!(
            method = %method,
            action = %action,
            output_format = %output_format,
            suppress_response_codes,
            "Dispatch state prepared"
        );

        DispatchState {
            method,
            action,
            params,
            output_format,
            suppress_response_codes,
        }
    }

    /// Post-dispatch: responses to mutating requests must not be cached.
    pub fn after(&self, req: &RestRequest, res: &mut RestResponse) {
        if req.method == Method::PUT || req.method == Method::POST || req.method == Method::DELETE
        {
            res.set_header("cache-control", NO_CACHE);
        }
    }

    /// Handle one request end to end.
    ///
    /// # Errors
    ///
    /// [`RestError::Format`] when the response cannot be rendered (the status
    /// is already 500 and `after` has not run), or
    /// [`RestError::ActionNotImplemented`] for an action the resource lacks.
    pub fn execute(&self, mut request: RestRequest) -> Result<RestResponse, RestError> {
        let start = Instant::now();
        let state = self.before(&mut request);

        // Middleware before
        let mut early_resp: Option<RestResponse> = None;
        for (idx, mw) in self.middlewares.iter().enumerate() {
            if early_resp.is_none() {
                early_resp = mw.before(&request, &state);
                if early_resp.is_some() {
                    debug!(
                        middleware_idx = idx,
                        middleware_name = std::any::type_name_of_val(mw.as_ref()),
                        "Middleware returned early response"
                    );
                }
            } else {
                mw.before(&request, &state);
            }
        }

        let mut response = match early_resp {
            Some(r) => r,
            None => self.run_action(&request, &state)?,
        };
        self.after(&request, &mut response);

        let latency = start.elapsed();
        for mw in &self.middlewares {
            mw.after(&request, &mut response, latency);
        }
        Ok(response)
    }

    fn run_action(
        &self,
        request: &RestRequest,
        state: &DispatchState,
    ) -> Result<RestResponse, RestError> {
        let mut response = RestResponse::new();
        if state.action == Action::Invalid {
            action::invalid(&mut response);
            return Ok(response);
        }

        info!(
            method = %state.method,
            path = %request.path,
            action = %state.action,
            "Request dispatched to action"
        );

        let start = Instant::now();
        let envelope = {
            let mut ctx = RestContext {
                request,
                state,
                response: &mut response,
            };
            match state.action {
                Action::Index => self.resource.index(&mut ctx),
                Action::Create => self.resource.create(&mut ctx),
                Action::Update => self.resource.update(&mut ctx),
                Action::Delete => self.resource.delete(&mut ctx),
                Action::Invalid => Err(RestError::ActionNotImplemented(Action::Invalid)),
            }
        };
        let envelope = match envelope {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(action = %state.action, error = %e, "Action failed");
                return Err(e);
            }
        };
        debug!(
            action = %state.action,
            code = envelope.code,
            elapsed_us = elapsed_us(start.elapsed()),
            "Action complete"
        );

        if let Err(e) = self
            .formatter
            .format_and_send(envelope, state, request, &mut response)
        {
            error!(
                path = %request.path,
                format = %state.output_format,
                error = %e,
                "Response formatting failed - request aborted"
            );
            return Err(e.into());
        }
        Ok(response)
    }

    /// Handle an `http` request, turning dispatch errors into bare status
    /// responses.
    ///
    /// # Errors
    ///
    /// Only when the `http` response cannot be built.
    pub fn handle_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> Result<http::Response<Vec<u8>>, http::Error> {
        match self.execute(RestRequest::from(request)) {
            Ok(response) => response.into_http(),
            Err(e) => {
                let mut response = RestResponse::new();
                response.status = e.status();
                response.into_http()
            }
        }
    }
}

fn elapsed_us(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct ReadOnly;

    impl Resource for ReadOnly {
        fn index(&self, ctx: &mut RestContext<'_>) -> Result<ResponseEnvelope, RestError> {
            Ok(ResponseEnvelope::ok(ctx.params().clone()))
        }
    }

    fn controller() -> RestController {
        RestController::new(Arc::new(ReadOnly), RestConfig::default())
    }

    #[test]
    fn test_before_defaults() {
        let mut req = RestRequest::new(Method::GET, "/pets?limit=5");
        let state = controller().before(&mut req);
        assert_eq!(state.method, Method::GET);
        assert_eq!(state.action, Action::Index);
        assert_eq!(state.params.get("limit"), Some(&json!("5")));
        assert_eq!(state.output_format, "json");
        assert!(!state.suppress_response_codes);
    }

    #[test]
    fn test_before_route_format_wins_over_default() {
        let mut req = RestRequest::new(Method::GET, "/pets.xml");
        let state = controller().before(&mut req);
        assert_eq!(state.output_format, "xml");
    }

    #[test]
    fn test_suppress_flag_requires_literal_true() {
        let c = controller();
        let mut req = RestRequest::new(Method::GET, "/pets?suppressResponseCodes=true");
        assert!(c.before(&mut req).suppress_response_codes);
        let mut req = RestRequest::new(Method::GET, "/pets?suppressResponseCodes=1");
        assert!(!c.before(&mut req).suppress_response_codes);
        let mut req = RestRequest::new(Method::GET, "/pets?suppressResponseCodes=TRUE");
        assert!(!c.before(&mut req).suppress_response_codes);
    }

    #[test]
    fn test_after_sets_no_cache_for_mutations_only() {
        let c = controller();
        for method in [Method::PUT, Method::POST, Method::DELETE] {
            let req = RestRequest::new(method, "/pets");
            let mut res = RestResponse::new();
            c.after(&req, &mut res);
            assert_eq!(res.get_header("cache-control"), Some(NO_CACHE));
        }
        let req = RestRequest::new(Method::GET, "/pets");
        let mut res = RestResponse::new();
        c.after(&req, &mut res);
        assert_eq!(res.get_header("cache-control"), None);
    }

    #[test]
    fn test_unimplemented_action() {
        let err = controller()
            .execute(RestRequest::new(Method::DELETE, "/pets/1"))
            .unwrap_err();
        assert!(matches!(err, RestError::ActionNotImplemented(Action::Delete)));
        assert_eq!(err.status(), 404);
    }

    #[test]
    fn test_handle_http_maps_errors_to_status() {
        let http_req = http::Request::builder()
            .method(Method::GET)
            .uri("/pets.csv?x=1")
            .body(Vec::new())
            .unwrap();
        let resp = controller().handle_http(http_req).unwrap();
        assert_eq!(resp.status(), 500);
        assert!(resp.body().is_empty());
    }
}
