//! Built-in health-check plugin.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! ```rust
//! use sento::{Router, health};
//!
//! let app = Router::new().plugin(health::probes).build();
//! # let _ = app;
//! ```
//!
//! The probes are registered where the plugin is applied, so pre-handlers
//! added before [`Router::plugin`] (authentication, say) run for them too.
//! Apply the plugin first to keep them out of the way. To gate readiness on
//! dependencies, skip this plugin and register your own `/readyz`.

use crate::{Context, Response, Router};

/// Registers `GET /healthz` and `GET /readyz`.
pub fn probes(router: Router) -> Router {
    router.get("/healthz", liveness).get("/readyz", readiness)
}

/// Always `200 OK` with body `"ok"`.
pub async fn liveness(_ctx: Context) -> Response {
    Response::text("ok")
}

/// `200 OK` with body `"ready"`.
pub async fn readiness(_ctx: Context) -> Response {
    Response::text("ready")
}
