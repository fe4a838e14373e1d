//! # sento
//!
//! A minimal HTTP request-dispatch engine: match a route, run its chain of
//! short-circuitable pre-handlers, run the handler, produce a response.
//!
//! ## The contract
//!
//! The host platform owns requests and responses (the [`http`] crate types).
//! sento owns three things only:
//!
//! - **Routing**: radix-tree lookup via [`matchit`], `:name` parameters,
//!   literal segments beat parameter segments.
//! - **Pre-handler ordering**: global, group-scoped, plugin-injected and
//!   route-local pre-handlers combine into one chain per route, frozen at
//!   the moment the route is registered.
//! - **Response coercion**: strings, numbers, JSON, status codes and full
//!   responses all become a [`Response`] through [`IntoResponse`].
//!
//! ## Registration order matters
//!
//! A pre-handler affects only routes registered *after* it, and only inside
//! the scope (group) it was added to:
//!
//! ```rust
//! use sento::{Context, Router, RouteOptions};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let app = Router::new()
//!     // runs for every route below
//!     .pre_handler(|ctx: Context| async move {
//!         (ctx.param("name") == Some("Fubuki")).then_some("Cat")
//!     })
//!     .get_with(
//!         "/name/:name",
//!         |ctx: Context| async move { ctx.param("name").unwrap_or_default().to_owned() },
//!         // runs last, for this route only
//!         RouteOptions::new().pre_handler(|ctx: Context| async move {
//!             (ctx.param("name") == Some("Korone")).then_some("Dog")
//!         }),
//!     )
//!     .build();
//!
//! let res = app.handle(sento::http::Request::get("/name/Fubuki").body("").unwrap()).await.unwrap();
//! assert_eq!(res.text_body(), "Cat");
//! let res = app.handle(sento::http::Request::get("/name/Korone").body("").unwrap()).await.unwrap();
//! assert_eq!(res.text_body(), "Dog");
//! let res = app.handle(sento::http::Request::get("/name/Watame").body("").unwrap()).await.unwrap();
//! assert_eq!(res.text_body(), "Watame");
//! # }
//! ```
//!
//! ## Serving
//!
//! ```rust,no_run
//! use sento::{Context, Router, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new().get("/", |_: Context| async { "hello" });
//!     Server::bind("0.0.0.0:3000").unwrap().serve(app).await.unwrap();
//! }
//! ```

mod app;
mod context;
mod error;
mod handler;
mod pattern;
mod response;
mod route;
mod router;
mod scope;
mod server;

pub mod health;

pub use http;

pub use app::App;
pub use context::Context;
pub use error::{BoxError, Error, Result};
pub use handler::{Flow, Handler, IntoFlow, PreHandler, Responder};
pub use pattern::{Params, PathPattern};
pub use response::{ContentType, IntoResponse, Json, Response, ResponseBuilder};
pub use router::{Plugin, RouteOptions, Router};
pub use server::Server;
