//! # Parameter Aggregation
//!
//! Builds the canonical parameter set of a request from three sources:
//!
//! 1. the parsed request body (JSON object or URL-encoded form) (weakest)
//! 2. posted form values
//! 3. query-string parameters (strongest)
//!
//! `GET` requests only see the query string. `POST`, `PUT` and `DELETE` merge
//! all three, in the order above, so query parameters act as universal
//! overrides regardless of verb. Any other method gets an empty map.
//!
//! Body parsing is tolerant: a body that does not parse under its declared
//! content type contributes nothing and the request proceeds.

mod form;

pub use form::{parse_form, parse_query_params, MAX_NESTING_DEPTH};

use http::Method;
use serde_json::Value;
use tracing::debug;

use crate::server::RestRequest;

/// Ordered parameter map. Keys are unique; merges overwrite values in place.
pub type ParamMap = serde_json::Map<String, Value>;

/// Aggregate the request's parameters according to its (effective) method.
#[must_use]
pub fn aggregate(req: &RestRequest) -> ParamMap {
    let mut params = ParamMap::new();

    if req.method == Method::GET {
        merge(&mut params, &req.query);
    } else if req.method == Method::POST || req.method == Method::PUT || req.method == Method::DELETE
    {
        params = parse_body(req);
        merge(&mut params, &req.post);
        merge(&mut params, &req.query);
    }

    debug!(
        method = %req.method,
        param_count = params.len(),
        param_names = ?params.keys().collect::<Vec<_>>(),
        "Parameters aggregated"
    );
    params
}

/// Copy every entry of `overlay` into `base`; `overlay` wins on collision.
pub fn merge(base: &mut ParamMap, overlay: &ParamMap) {
    for (key, value) in overlay {
        base.insert(key.clone(), value.clone());
    }
}

/// Parse the raw body under the request's content type.
fn parse_body(req: &RestRequest) -> ParamMap {
    if req.body.is_empty() {
        return ParamMap::new();
    }

    let content_type = req.content_type().unwrap_or("");
    if content_type.contains("application/json") {
        match serde_json::from_slice::<Value>(&req.body) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                debug!(
                    body_kind = json_kind(&other),
                    "JSON body is not an object - ignoring body"
                );
                ParamMap::new()
            }
            Err(e) => {
                debug!(error = %e, body_size_bytes = req.body.len(), "Malformed JSON body - ignoring body");
                ParamMap::new()
            }
        }
    } else {
        parse_form(&req.body)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
