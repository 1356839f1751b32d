//! # Dispatch Controller
//!
//! [`RestController`] drives a single request through the pipeline:
//!
//! 1. [`before`](RestController::before): resolve the effective method, map it
//!    to an action, aggregate parameters, pick the output format and read the
//!    `suppressResponseCodes` flag into a [`DispatchState`];
//! 2. middleware `before` hooks (an early response skips the action);
//! 3. the [`Resource`] action, or the 405 `invalid` action;
//! 4. response formatting;
//! 5. [`after`](RestController::after): no-cache headers for mutating methods;
//! 6. middleware `after` hooks.
//!
//! ```rust
//! use std::sync::Arc;
//! use http::Method;
//! use restdispatch::dispatcher::{Resource, RestContext, RestController};
//! use restdispatch::error::RestError;
//! use restdispatch::format::ResponseEnvelope;
//! use restdispatch::runtime_config::RestConfig;
//! use restdispatch::server::RestRequest;
//! use serde_json::json;
//!
//! struct Pets;
//!
//! impl Resource for Pets {
//!     fn index(&self, _ctx: &mut RestContext<'_>) -> Result<ResponseEnvelope, RestError> {
//!         Ok(ResponseEnvelope::from_value(200, json!({"name": "rex"})))
//!     }
//! }
//!
//! let controller = RestController::new(Arc::new(Pets), RestConfig::default());
//! let res = controller.execute(RestRequest::new(Method::GET, "/pets.json")).unwrap();
//! assert_eq!(res.body_str(), r#"{"name":"rex"}"#);
//! ```

mod core;

pub use core::{
    DispatchState, Resource, RestContext, RestController, NO_CACHE, SUPPRESS_PARAM,
};
