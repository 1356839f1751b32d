//! Tests for HTML output with template views on disk
//!
//! # Test Coverage
//!
//! - Controller view `<dir>/<controller>.html`
//! - Action view fallback `<dir>/<controller>/<action>.html`
//! - Error view: file override and built-in page
//! - Empty body when no view matches

use std::fs;
use std::path::Path;
use std::sync::Arc;

use http::Method;
use restdispatch::dispatcher::{Resource, RestContext, RestController};
use restdispatch::error::RestError;
use restdispatch::format::ResponseEnvelope;
use restdispatch::runtime_config::RestConfig;
use restdispatch::server::RestRequest;
use serde_json::json;
use tempfile::TempDir;

struct Shop;

impl Resource for Shop {
    fn index(&self, _ctx: &mut RestContext<'_>) -> Result<ResponseEnvelope, RestError> {
        Ok(ResponseEnvelope::from_value(
            200,
            json!({"orders": [{"id": 1}, {"id": 2}]}),
        ))
    }

    fn create(&self, ctx: &mut RestContext<'_>) -> Result<ResponseEnvelope, RestError> {
        match ctx.param("item") {
            Some(item) => Ok(ResponseEnvelope::from_value(201, json!({ "item": item }))),
            None => Ok(ResponseEnvelope::error(400, "Missing item").with_field("item")),
        }
    }
}

fn write(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn controller(views: &TempDir) -> RestController {
    let config = RestConfig {
        views_dir: Some(views.path().to_path_buf()),
        ..RestConfig::default()
    };
    RestController::new(Arc::new(Shop), config)
}

#[test]
fn test_controller_view() {
    let views = tempfile::tempdir().unwrap();
    write(
        views.path(),
        "shop/orders.html",
        "{% for o in data.orders %}#{{ o.id }}{% endfor %}",
    );
    let res = controller(&views)
        .execute(RestRequest::new(Method::GET, "/Shop/Orders.html"))
        .unwrap();
    assert_eq!(res.status, 200);
    assert_eq!(res.get_header("content-type"), Some("text/html"));
    assert_eq!(res.body_str(), "#1#2");
}

#[test]
fn test_action_view_fallback() {
    let views = tempfile::tempdir().unwrap();
    write(views.path(), "orders/create.html", "created {{ data.item }}");
    let res = controller(&views)
        .execute(RestRequest::new(Method::POST, "/orders.html?item=tea"))
        .unwrap();
    assert_eq!(res.status, 201);
    assert_eq!(res.body_str(), "created tea");
}

#[test]
fn test_error_view_file() {
    let views = tempfile::tempdir().unwrap();
    write(
        views.path(),
        "error.html",
        "{{ data.responseCode }}|{{ data.field }}|{{ data.error }}",
    );
    let res = controller(&views)
        .execute(RestRequest::new(Method::POST, "/orders.html"))
        .unwrap();
    assert_eq!(res.status, 400);
    assert_eq!(res.body_str(), "400|item|Missing item");
}

#[test]
fn test_builtin_error_view() {
    let views = tempfile::tempdir().unwrap();
    let res = controller(&views)
        .execute(RestRequest::new(Method::POST, "/orders.html"))
        .unwrap();
    assert_eq!(res.status, 400);
    let body = res.body_str();
    assert!(body.contains("<title>Error</title>"));
    assert!(body.contains("(400) Missing item"));
}

#[test]
fn test_suppressed_error_view_reports_intended_code() {
    let views = tempfile::tempdir().unwrap();
    write(
        views.path(),
        "error.html",
        "{{ data.code }}/{{ data.responseCode }}",
    );
    let res = controller(&views)
        .execute(RestRequest::new(
            Method::POST,
            "/orders.html?suppressResponseCodes=true",
        ))
        .unwrap();
    assert_eq!(res.status, 200);
    assert_eq!(res.body_str(), "400/400");
}

#[test]
fn test_suppressed_error_view_response_code_on_get() {
    let views = tempfile::tempdir().unwrap();
    write(views.path(), "error.html", "{{ data.responseCode }}");
    let res = controller(&views)
        .execute(RestRequest::new(
            Method::GET,
            "/orders.html?suppressResponseCodes=true&method=post",
        ))
        .unwrap();
    assert_eq!(res.status, 200);
    assert_eq!(res.body_str(), "400");
}

#[test]
fn test_missing_view_gives_empty_body() {
    let views = tempfile::tempdir().unwrap();
    let res = controller(&views)
        .execute(RestRequest::new(Method::GET, "/orders.html"))
        .unwrap();
    assert_eq!(res.status, 200);
    assert!(res.body.is_empty());
    assert_eq!(res.get_header("content-length"), Some("0"));
}
