//! # restdispatch
//!
//! **restdispatch** is a method-driven REST dispatch layer. The effective HTTP
//! method alone picks a CRUD action, request parameters from every source are
//! merged into one canonical map, and the action's output is rendered as JSON,
//! XML or HTML according to a hint carried by the request.
//!
//! ## Architecture
//!
//! - **[`params`]** - Parameter aggregation (query string, posted form, JSON or form body)
//! - **[`method`]** - Effective method resolution (`?method=` and `X-HTTP-Method-Override`)
//! - **[`action`]** - Verb-to-action mapping and the 405 fallback
//! - **[`format`]** - Response formatting, suppress-response-codes mode, attachments
//! - **[`dispatcher`]** - [`RestController`](dispatcher::RestController) tying the above together
//! - **[`server`]** - Request/response object model, convertible from/to `http` types
//! - **[`views`]** - HTML views (minijinja templates plus a built-in error page)
//! - **[`middleware`]** - Hooks around each request
//! - **[`runtime_config`]** / **[`logging`]** - Configuration and structured logging
//! - **[`cli`]** - Command-line bridge used by the `restdispatch` binary
//!
//! ## Request Flow
//!
//! ```text
//! RestRequest
//!   -> resolve_method      GET ?method=DELETE, X-HTTP-Method-Override
//!   -> resolve_action      GET=index PUT=update POST=create DELETE=delete, else 405
//!   -> aggregate           body < posted form < query
//!   -> Resource action     ResponseEnvelope { code, data }
//!   -> format_and_send     json | xml | html, content-type/-length/-disposition
//!   -> after               cache-control for PUT/POST/DELETE
//! RestResponse
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use http::Method;
//! use restdispatch::dispatcher::{Resource, RestContext, RestController};
//! use restdispatch::error::RestError;
//! use restdispatch::format::ResponseEnvelope;
//! use restdispatch::runtime_config::RestConfig;
//! use restdispatch::server::RestRequest;
//!
//! struct Orders;
//!
//! impl Resource for Orders {
//!     fn create(&self, ctx: &mut RestContext<'_>) -> Result<ResponseEnvelope, RestError> {
//!         match ctx.param("item") {
//!             Some(_) => Ok(ResponseEnvelope::ok(ctx.params().clone())),
//!             None => Ok(ResponseEnvelope::error(400, "Missing item").with_field("item")),
//!         }
//!     }
//! }
//!
//! let controller = RestController::new(Arc::new(Orders), RestConfig::default());
//!
//! // A GET link forging a POST, answered in XML.
//! let req = RestRequest::new(Method::GET, "/shop/orders.xml?method=post&item=tea");
//! let res = controller.execute(req).unwrap();
//! assert_eq!(res.status, 200);
//! assert_eq!(res.get_header("content-type"), Some("text/xml"));
//! assert_eq!(res.get_header("cache-control"), Some("no-cache, no-store, max-age=0, must-revalidate"));
//! ```
//!
//! ## Features
//!
//! - `xml` (default): XML output through `quick-xml`. Without it the `xml`
//!   format fails with [`FormatError::XmlUnavailable`](error::FormatError::XmlUnavailable).

pub mod action;
pub mod cli;
pub mod dispatcher;
pub mod echo;
pub mod error;
pub mod format;
pub mod logging;
pub mod method;
pub mod middleware;
pub mod params;
pub mod runtime_config;
pub mod server;
pub mod views;

pub use action::{resolve_action, Action};
pub use dispatcher::{DispatchState, Resource, RestContext, RestController};
pub use error::{FormatError, RestError};
pub use format::{ResponseEnvelope, ResponseFormatter};
pub use method::resolve_method;
pub use params::{aggregate, ParamMap};
pub use server::{RestRequest, RestResponse};
