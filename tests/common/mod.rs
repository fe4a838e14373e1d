#![allow(dead_code)]

use sento::http::{Method, Request};
use sento::{App, Response};

/// Routes log output through the test harness; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

pub fn req(path: &str) -> Request<&'static str> {
    Request::get(path).body("").unwrap()
}

pub fn req_with(method: Method, path: &str) -> Request<&'static str> {
    Request::builder().method(method).uri(path).body("").unwrap()
}

pub async fn text(app: &App, path: &str) -> String {
    send(app, path).await.text_body().into_owned()
}

pub async fn send(app: &App, path: &str) -> Response {
    init_tracing();
    app.handle(req(path)).await.unwrap()
}
