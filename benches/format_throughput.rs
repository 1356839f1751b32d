use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use restdispatch::dispatcher::{Resource, RestContext, RestController};
use restdispatch::error::RestError;
use restdispatch::format::ResponseEnvelope;
use restdispatch::runtime_config::RestConfig;
use restdispatch::server::RestRequest;
use serde_json::{json, Value};

struct Catalog {
    page: Value,
}

impl Catalog {
    fn new() -> Self {
        let items: Vec<Value> = (0..50)
            .map(|i| json!({"id": i, "name": format!("item {i}"), "price": i * 3, "active": i % 2 == 0}))
            .collect();
        Self {
            page: json!({"total": 50, "items": items}),
        }
    }
}

impl Resource for Catalog {
    fn index(&self, _ctx: &mut RestContext<'_>) -> Result<ResponseEnvelope, RestError> {
        Ok(ResponseEnvelope::from_value(200, self.page.clone()))
    }

    fn create(&self, ctx: &mut RestContext<'_>) -> Result<ResponseEnvelope, RestError> {
        Ok(ResponseEnvelope::from_value(201, Value::Object(ctx.params().clone())))
    }
}

fn bench_formats(c: &mut Criterion) {
    let controller = RestController::new(Arc::new(Catalog::new()), RestConfig::default());

    c.bench_function("index_json", |b| {
        b.iter(|| {
            let req = RestRequest::new(Method::GET, "/shop/catalog.json?page=1");
            black_box(controller.execute(req))
        })
    });

    c.bench_function("index_xml", |b| {
        b.iter(|| {
            let req = RestRequest::new(Method::GET, "/shop/catalog.xml?page=1");
            black_box(controller.execute(req))
        })
    });

    c.bench_function("create_json_body_override", |b| {
        b.iter(|| {
            let req = RestRequest::new(Method::GET, "/shop/catalog.json?method=post&qty=2")
                .with_header("content-type", "application/json")
                .with_body(r#"{"sku":"a-1","qty":1,"note":"gift"}"#);
            black_box(controller.execute(req))
        })
    });
}

criterion_group!(benches, bench_formats);
criterion_main!(benches);
