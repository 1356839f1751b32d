use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use super::html::HtmlRenderer;
use super::json::JsonRenderer;
use super::mime::mime_by_ext;
use super::xml::XmlRenderer;
use crate::action::Action;
use crate::dispatcher::DispatchState;
use crate::error::FormatError;
use crate::params::ParamMap;
use crate::server::{RestRequest, RestResponse, RouteParams};
use crate::views::ViewEngine;

/// Response data handed to the formatter.
pub type DataMap = ParamMap;

/// Message used when an action answers 200 with no data.
pub const NO_RECORDS_MESSAGE: &str = "No records found";

/// Allowed `attachment` file names: letters, digits, `_`, `,`, `-` and space.
static ATTACHMENT_NAME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[-\p{L}\p{N}_, ]+$").ok());

/// What an action wants sent: the intended status code and a data mapping.
///
/// Consumed by value by [`ResponseFormatter::format_and_send`].
#[derive(Debug, PartialEq)]
pub struct ResponseEnvelope {
    pub code: u16,
    pub data: DataMap,
}

impl ResponseEnvelope {
    pub fn new(code: u16, data: DataMap) -> Self {
        Self { code, data }
    }

    /// `200` with the given data.
    pub fn ok(data: DataMap) -> Self {
        Self::new(200, data)
    }

    /// Build from any JSON value; non-object values are wrapped under `data`.
    pub fn from_value(code: u16, value: Value) -> Self {
        match value {
            Value::Object(map) => Self::new(code, map),
            Value::Null => Self::new(code, DataMap::new()),
            other => {
                let mut map = DataMap::new();
                map.insert("data".to_string(), other);
                Self::new(code, map)
            }
        }
    }

    /// Error envelope `{"code": code, "error": message}`.
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        let mut map = DataMap::new();
        map.insert("code".to_string(), json!(code));
        map.insert("error".to_string(), Value::String(message.into()));
        Self::new(code, map)
    }

    /// Name the request field an error refers to (usually with `400`).
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.data
            .insert("field".to_string(), Value::String(field.into()));
        self
    }
}

/// Request details a renderer may need besides the data.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Transport status already set on the response
    pub status: u16,
    /// Intended status code, which differs from `status` when codes are suppressed
    pub code: u16,
    pub route: &'a RouteParams,
    pub action: Action,
}

/// Turns a data mapping into a response body for one output format.
pub trait Renderer: Send + Sync {
    fn render(&self, data: &DataMap, ctx: &RenderContext<'_>) -> Result<String, FormatError>;
}

/// Renders response envelopes in the format chosen by the request.
///
/// Formats are looked up in an explicit registry; a format with no renderer is
/// a fatal [`FormatError::UnknownFormat`].
#[derive(Clone)]
pub struct ResponseFormatter {
    renderers: HashMap<String, Arc<dyn Renderer>>,
}

impl std::fmt::Debug for ResponseFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseFormatter")
            .field("formats", &self.formats())
            .finish()
    }
}

impl Default for ResponseFormatter {
    fn default() -> Self {
        Self::with_defaults(None)
    }
}

impl ResponseFormatter {
    /// A formatter with no renderers registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    /// A formatter with `json`, `xml` and `html` registered.
    ///
    /// Without a view engine every HTML response has an empty body.
    #[must_use]
    pub fn with_defaults(views: Option<Arc<dyn ViewEngine>>) -> Self {
        let mut formatter = Self::empty();
        formatter.register("json", Arc::new(JsonRenderer));
        formatter.register("xml", Arc::new(XmlRenderer));
        formatter.register("html", Arc::new(HtmlRenderer::new(views)));
        formatter
    }

    /// Register (or replace) the renderer for a format identifier.
    pub fn register(&mut self, format: &str, renderer: Arc<dyn Renderer>) {
        self.renderers.insert(format.to_string(), renderer);
    }

    /// Registered format identifiers, sorted.
    #[must_use]
    pub fn formats(&self) -> Vec<&str> {
        let mut formats: Vec<&str> = self.renderers.keys().map(String::as_str).collect();
        formats.sort_unstable();
        formats
    }

    /// Render `envelope` into `res` in the request's output format.
    ///
    /// 1. An empty `200` becomes a `404` "No records found" error.
    /// 2. In suppress-response-codes mode the transport status is `200` and
    ///    the intended code travels in the body as `responseCode`.
    /// 3. The body is rendered, `content-type`/`content-length` are set, and an
    ///    optional `content-disposition` is added for a valid `attachment`
    ///    parameter.
    ///
    /// # Errors
    ///
    /// Unknown format or unavailable/failed serialization; the status is set
    /// to `500` before returning.
    pub fn format_and_send(
        &self,
        envelope: ResponseEnvelope,
        state: &DispatchState,
        req: &RestRequest,
        res: &mut RestResponse,
    ) -> Result<(), FormatError> {
        let ResponseEnvelope { mut code, mut data } = envelope;

        if data.is_empty() && code == 200 {
            debug!("Empty 200 response rewritten to 404");
            data = ResponseEnvelope::error(404, NO_RECORDS_MESSAGE).data;
            code = 404;
        }

        if state.suppress_response_codes {
            res.status = 200;
            data.insert("responseCode".to_string(), json!(code));
        } else {
            res.status = code;
        }

        let format = state.output_format.as_str();
        let Some(renderer) = self.renderers.get(format) else {
            res.status = 500;
            error!(
                format = %format,
                available_formats = ?self.formats(),
                "Unknown output format requested"
            );
            return Err(FormatError::UnknownFormat(format.to_string()));
        };

        let ctx = RenderContext {
            status: res.status,
            code,
            route: &req.route,
            action: state.action,
        };
        let body = match renderer.render(&data, &ctx) {
            Ok(body) => body,
            Err(e) => {
                res.status = 500;
                error!(format = %format, error = %e, "Response rendering failed");
                return Err(e);
            }
        };

        res.set_header("content-type", mime_by_ext(format));
        res.set_header("content-length", body.len().to_string());

        if let Some(name) = state.params.get("attachment") {
            match name.as_str().filter(|n| is_valid_attachment_name(n)) {
                Some(name) => {
                    res.set_header(
                        "content-disposition",
                        format!("attachment; filename={name}.{format}"),
                    );
                }
                None => debug!(attachment = %name, "Attachment name rejected - header skipped"),
            }
        }

        info!(
            format = %format,
            status = res.status,
            intended_status = code,
            suppressed = state.suppress_response_codes,
            body_size_bytes = body.len(),
            "Response formatted"
        );
        res.set_body(body);
        Ok(())
    }
}

/// Whether `name` may be used as an attachment file name.
#[must_use]
pub fn is_valid_attachment_name(name: &str) -> bool {
    ATTACHMENT_NAME
        .as_ref()
        .is_some_and(|re| re.is_match(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_names() {
        assert!(is_valid_attachment_name("report 1"));
        assert!(is_valid_attachment_name("Q3_sales, final"));
        assert!(is_valid_attachment_name("año-2024"));
        assert!(!is_valid_attachment_name("../etc"));
        assert!(!is_valid_attachment_name("a/b"));
        assert!(!is_valid_attachment_name("name.txt"));
        assert!(!is_valid_attachment_name(""));
        assert!(!is_valid_attachment_name("line\nbreak"));
    }

    #[test]
    fn test_envelope_from_value() {
        let env = ResponseEnvelope::from_value(201, json!({"id": 1}));
        assert_eq!(env.code, 201);
        assert_eq!(env.data["id"], json!(1));

        let wrapped = ResponseEnvelope::from_value(200, json!([1, 2]));
        assert_eq!(wrapped.data["data"], json!([1, 2]));

        assert!(ResponseEnvelope::from_value(200, Value::Null).data.is_empty());
    }

    #[test]
    fn test_error_envelope_with_field() {
        let env = ResponseEnvelope::error(400, "Invalid name").with_field("name");
        assert_eq!(
            Value::Object(env.data),
            json!({"code": 400, "error": "Invalid name", "field": "name"})
        );
    }

    #[test]
    fn test_default_formats() {
        let f = ResponseFormatter::default();
        assert_eq!(f.formats(), vec!["html", "json", "xml"]);
    }
}
