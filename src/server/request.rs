use std::collections::HashMap;

use http::Method;
use tracing::debug;

use crate::params::{parse_form, parse_query_params, ParamMap};

/// Route-derived extras of a request.
///
/// Route matching happens upstream; these are the pieces the dispatch layer
/// reads from it: the output format hint and the directory/controller used to
/// locate HTML views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    /// Output format hint (file extension of the resource, e.g. `json`)
    pub format: Option<String>,
    /// Directory (namespace) segments joined with `/`, may be empty
    pub directory: String,
    /// Controller name (last path segment without extension)
    pub controller: String,
}

impl RouteParams {
    /// Derive route extras from a resource path.
    ///
    /// `/api/v1/users.xml?x=1` yields directory `api/v1`, controller `users` and
    /// format `xml`. A last segment without an extension carries no format hint.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.split('?').next().unwrap_or("");
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let last = segments.pop().unwrap_or("");

        let (controller, format) = match last.rsplit_once('.') {
            Some((name, ext)) if !name.is_empty() && !ext.is_empty() => {
                (name.to_string(), Some(ext.to_string()))
            }
            _ => (last.to_string(), None),
        };

        RouteParams {
            format,
            directory: segments.join("/"),
            controller,
        }
    }
}

/// Request as seen by the dispatch layer.
///
/// The method is mutable: method overrides replace it for every downstream
/// consumer. Header names are stored lower-case.
#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    /// HTTP method (transport method until overridden)
    pub method: Method,
    /// Request path without query string
    pub path: String,
    /// HTTP headers (lowercase keys)
    pub headers: HashMap<String, String>,
    /// Parsed query string parameters
    pub query: ParamMap,
    /// Posted form values
    pub post: ParamMap,
    /// Raw request body
    pub body: Vec<u8>,
    /// Route-derived extras
    pub route: RouteParams,
}

impl RestRequest {
    /// Build a request from a method and a path that may carry a query string.
    ///
    /// Query parameters and route extras are parsed from `path`.
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.split('?').next().unwrap_or("/").to_string(),
            headers: HashMap::new(),
            query: parse_query_params(path),
            post: ParamMap::new(),
            body: Vec::new(),
            route: RouteParams::from_path(path),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn with_post(mut self, post: ParamMap) -> Self {
        self.post = post;
        self
    }

    /// Replace the query parameters with a URL-encoded string (no leading `?`).
    #[must_use]
    pub fn with_query_string(mut self, query: &str) -> Self {
        self.query = parse_form(query);
        self
    }

    #[must_use]
    pub fn with_route(mut self, route: RouteParams) -> Self {
        self.route = route;
        self
    }

    /// Get a header by name (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Get a query parameter as a string; nested values yield `None`.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query.get(name).and_then(|v| v.as_str())
    }
}

impl From<http::Request<Vec<u8>>> for RestRequest {
    /// Convert an `http` request. Posted form values are parsed from the body
    /// when the content type is `application/x-www-form-urlencoded`.
    fn from(req: http::Request<Vec<u8>>) -> Self {
        let (parts, body) = req.into_parts();
        let path_and_query = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string());

        let headers: HashMap<String, String> = parts
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_ascii_lowercase(),
                    String::from_utf8_lossy(value.as_bytes()).to_string(),
                )
            })
            .collect();

        let mut request = RestRequest::new(parts.method, &path_and_query);
        request.headers = headers;

        let is_form = request
            .content_type()
            .is_some_and(|ct| ct.contains("application/x-www-form-urlencoded"));
        if is_form {
            request.post = parse_form(&body);
        }
        request.body = body;

        debug!(
            method = %request.method,
            path = %request.path,
            headers_count = request.headers.len(),
            query_count = request.query.len(),
            post_count = request.post.len(),
            body_size_bytes = request.body.len(),
            "HTTP request converted"
        );
        request
    }
}
