//! Dispatch engine.
//!
//! Per request: match → fresh [`Context`] → run the route's frozen
//! pre-handler chain in order → main handler → coerce → merge the context's
//! outgoing headers → respond. Each step is awaited before the next one
//! starts. Dropping the future returned by [`App::handle`] stops the chain
//! where it is.

use bytes::Bytes;
use tracing::{debug, trace};

use crate::context::Context;
use crate::error::Error;
use crate::handler::Flow;
use crate::response::Response;
use crate::route::RouteTable;

/// A built application: immutable routes plus the dispatch entry point.
///
/// `App` is `Send + Sync`; share it behind an `Arc` and call
/// [`handle`](App::handle) from as many tasks as you like.
pub struct App {
    table: RouteTable,
}

impl App {
    pub(crate) fn new(table: RouteTable) -> Self {
        Self { table }
    }

    /// Number of registered routes across all methods.
    pub fn route_count(&self) -> usize {
        self.table.len()
    }

    /// Dispatches one request.
    ///
    /// An unmatched method + path yields `404 Not Found` with an empty body.
    /// A failing pre-handler or handler yields [`Error::Handler`] carrying the
    /// original error; it is never turned into a response here.
    pub async fn handle<B: Into<Bytes>>(&self, req: http::Request<B>) -> Result<Response, Error> {
        let (parts, body) = req.into_parts();

        let Some((route, params)) = self.table.lookup(&parts.method, parts.uri.path()) else {
            debug!(method = %parts.method, path = parts.uri.path(), "no route matched");
            return Ok(Response::not_found());
        };

        let ctx = Context::new(parts, body.into(), params);
        trace!(method = %route.method, route = %route.pattern, chain = route.chain.len(), "dispatching");

        for (i, pre) in route.chain.iter().enumerate() {
            if let Flow::ShortCircuit(res) = pre.call(ctx.clone()).await? {
                debug!(route = %route.pattern, step = i, "pre-handler short-circuited");
                return Ok(res.merge_headers(ctx.take_outgoing_headers()));
            }
            trace!(step = i, "pre-handler continued");
        }

        let res = route.handler.call(ctx.clone()).await?;
        Ok(res.merge_headers(ctx.take_outgoing_headers()))
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App").field("routes", &self.table.len()).finish()
    }
}
