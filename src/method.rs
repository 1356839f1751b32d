//! Effective method resolution.
//!
//! Clients that cannot issue every verb may override the transport method:
//!
//! - `GET ...?method=DELETE`: only `POST`, `PUT` and `DELETE` are accepted this
//!   way (case-insensitive). Other values are ignored.
//! - `X-HTTP-Method-Override: <verb>`: consulted only when the query override
//!   is not in play. No verb whitelist applies on this path; the header value
//!   is taken verbatim.
//!
//! The resolved method replaces [`RestRequest::method`].

use http::Method;
use tracing::{debug, info};

use crate::server::RestRequest;

/// Default header consulted for method overrides.
pub const DEFAULT_OVERRIDE_HEADER: &str = "x-http-method-override";

/// Query parameter consulted for method overrides on `GET`.
pub const METHOD_QUERY_PARAM: &str = "method";

/// Resolve the effective method and store it on the request.
///
/// Never fails; unusable override values leave the transport method in place.
pub fn resolve_method(req: &mut RestRequest, override_header: &str) -> Method {
    let transport = req.method.clone();

    let query_override = if transport == Method::GET {
        req.query_value(METHOD_QUERY_PARAM)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    } else {
        None
    };

    let effective = match query_override {
        Some(requested) => match requested.to_ascii_uppercase().as_str() {
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            _ => {
                debug!(
                    requested = %requested,
                    "Query method override ignored - only POST, PUT and DELETE are accepted"
                );
                transport.clone()
            }
        },
        None => header_override(req, override_header).unwrap_or_else(|| transport.clone()),
    };

    if effective != transport {
        info!(
            transport_method = %transport,
            effective_method = %effective,
            "Method override applied"
        );
    }
    req.method = effective.clone();
    effective
}

fn header_override(req: &RestRequest, header: &str) -> Option<Method> {
    let raw = req.header(header)?.trim();
    if raw.is_empty() {
        return None;
    }
    match Method::from_bytes(raw.as_bytes()) {
        Ok(method) => Some(method),
        Err(_) => {
            debug!(header = %header, value = %raw, "Override header is not a method token - ignored");
            None
        }
    }
}
