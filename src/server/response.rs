use std::sync::Arc;

use smallvec::SmallVec;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 8;

/// Stack-allocated response header storage.
///
/// Header names use `Arc<str>`; most of them are static strings set by the
/// formatter and dispatcher.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

pub(crate) fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

/// Response under construction.
///
/// Starts as `200` with no headers and an empty body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers in insertion order
    pub headers: HeaderVec,
    /// Response body
    pub body: Vec<u8>,
}

impl Default for RestResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl RestResponse {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: HeaderVec::new(),
            body: Vec::new(),
        }
    }

    /// Get a header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value.into()));
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// Body as UTF-8 text (lossy)
    #[must_use]
    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    #[must_use]
    pub fn reason(&self) -> &'static str {
        status_reason(self.status)
    }

    /// Convert into an `http` response.
    ///
    /// Fails if the status code or a header is not valid HTTP.
    pub fn into_http(self) -> Result<http::Response<Vec<u8>>, http::Error> {
        let mut builder = http::Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_ref(), value.as_str());
        }
        builder.body(self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(404), "Not Found");
        assert_eq!(status_reason(405), "Method Not Allowed");
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut res = RestResponse::new();
        res.set_header("Content-Type", "text/html");
        res.set_header("content-type", "application/json");
        assert_eq!(res.headers.len(), 1);
        assert_eq!(res.get_header("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn test_into_http() {
        let mut res = RestResponse::new();
        res.status = 404;
        res.set_header("content-type", "application/json");
        res.set_body(r#"{"error":"x"}"#);
        let http_res = res.into_http().unwrap();
        assert_eq!(http_res.status(), http::StatusCode::NOT_FOUND);
        assert_eq!(http_res.headers()["content-type"], "application/json");
        assert_eq!(http_res.body(), br#"{"error":"x"}"#);
    }
}
