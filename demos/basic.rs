//! Minimal sento example: scoped pre-handlers, a plugin, and header merging.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/
//!   curl http://localhost:3000/name/Fubuki
//!   curl http://localhost:3000/name/Watame
//!   curl -i http://localhost:3000/admin/stats
//!   curl -i -H 'authorization: letmein' http://localhost:3000/admin/stats
//!   curl http://localhost:3000/healthz

use sento::http::StatusCode;
use sento::http::header::{HeaderName, HeaderValue};
use sento::{Context, Error, Json, Response, Router, Server, health};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        // Registered first, so the auth gate below never applies to probes.
        .plugin(health::probes)
        .pre_handler(powered_by)
        .get("/", teapot)
        .pre_handler(cat_for_fubuki)
        .get("/name/:name", name)
        .group("/admin", |r| r.pre_handler(require_auth).get("/stats", stats));

    Server::bind("0.0.0.0:3000")?.serve(app).await
}

// Every route registered after this one gets the header.
async fn powered_by(ctx: Context) -> Result<(), Error> {
    ctx.append_header("x-powered-by", "sento")
}

async fn cat_for_fubuki(ctx: Context) -> Option<&'static str> {
    (ctx.param("name") == Some("Fubuki")).then_some("Cat")
}

async fn require_auth(ctx: Context) -> Option<(StatusCode, &'static str)> {
    match ctx.header("authorization") {
        Some("letmein") => None,
        _ => Some((StatusCode::UNAUTHORIZED, "who are you?")),
    }
}

// The handler's own `duck` header wins; `x-powered-by` is merged in.
async fn teapot(_ctx: Context) -> Response {
    Response::builder()
        .status(StatusCode::IM_A_TEAPOT)
        .header(HeaderName::from_static("duck"), HeaderValue::from_static("shuba duck"))
        .text("Shuba Shuba")
}

async fn name(ctx: Context) -> String {
    ctx.param("name").unwrap_or_default().to_owned()
}

async fn stats(_ctx: Context) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "requests": 42 }))
}
