//! Registration surface.
//!
//! A [`Router`] is the application while it is being built. Registration is
//! order-sensitive: a route captures the pre-handlers registered *before* it
//! in its own scope and every enclosing scope, and nothing registered after.
//!
//! ```rust
//! use sento::{Context, Router};
//!
//! let app = Router::new()
//!     .pre_handler(|ctx: Context| async move {
//!         (ctx.param("name") == Some("Fubuki")).then_some("Cat")
//!     })
//!     .get("/name/:name", |ctx: Context| async move {
//!         ctx.param("name").unwrap_or_default().to_owned()
//!     })
//!     .build();
//! # let _ = app;
//! ```
//!
//! Once [`Router::build`] runs the scope stack is gone: the resulting
//! [`App`] holds only frozen routes.

use http::Method;
use tracing::debug;

use crate::app::App;
use crate::error::{Error, Result};
use crate::handler::{BoxedPreHandler, Handler, PreHandler};
use crate::pattern::{self, PathPattern};
use crate::route::{Route, RouteTable};
use crate::scope::ScopeStack;

// ── RouteOptions ──────────────────────────────────────────────────────────────

/// Per-route registration options.
#[derive(Default)]
pub struct RouteOptions {
    pre_handler: Option<BoxedPreHandler>,
}

impl RouteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route-local pre-handler. Runs last in the route's chain, after every
    /// inherited one, with the same short-circuit rules.
    pub fn pre_handler(mut self, pre: impl PreHandler) -> Self {
        self.pre_handler = Some(pre.into_boxed_pre_handler());
        self
    }
}

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Extends a [`Router`] in place.
///
/// Any `FnOnce(Router) -> Router` is a plugin. A plugin is flat composition:
/// whatever it registers behaves exactly as if written inline where
/// [`Router::plugin`] is called. Wrap its body in [`Router::group`] to give it
/// a boundary.
pub trait Plugin {
    fn apply(self, router: Router) -> Router;
}

impl<F> Plugin for F
where
    F: FnOnce(Router) -> Router,
{
    fn apply(self, router: Router) -> Router {
        self(router)
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

/// The application under construction.
///
/// Every builder method returns `self` so registrations chain naturally.
pub struct Router {
    table: RouteTable,
    scopes: ScopeStack,
}

macro_rules! method_shortcuts {
    ($($name:ident, $name_with:ident => $method:ident;)*) => {
        $(
            #[doc = concat!("Registers a `", stringify!($method), "` route. See [`Router::on`].")]
            pub fn $name(self, pattern: &str, handler: impl Handler) -> Self {
                self.on(Method::$method, pattern, handler)
            }

            #[doc = concat!("Registers a `", stringify!($method), "` route with options. See [`Router::on_with`].")]
            pub fn $name_with(self, pattern: &str, handler: impl Handler, options: RouteOptions) -> Self {
                self.on_with(Method::$method, pattern, handler, options)
            }
        )*
    };
}

impl Router {
    pub fn new() -> Self {
        Self { table: RouteTable::default(), scopes: ScopeStack::new() }
    }

    /// Registers a handler for a method + pattern pair.
    ///
    /// Path parameters use `:name` syntax; `ctx.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if the pattern is malformed or conflicts with an existing
    /// route. Use [`Router::try_route`] to handle that as an error.
    pub fn on(self, method: Method, pattern: &str, handler: impl Handler) -> Self {
        self.on_with(method, pattern, handler, RouteOptions::default())
    }

    /// [`Router::on`] with [`RouteOptions`].
    pub fn on_with(
        mut self,
        method: Method,
        pattern: &str,
        handler: impl Handler,
        options: RouteOptions,
    ) -> Self {
        if let Err(e) = self.try_route(method, pattern, handler, options) {
            panic!("invalid route `{pattern}`: {e}");
        }
        self
    }

    method_shortcuts! {
        get, get_with => GET;
        post, post_with => POST;
        put, put_with => PUT;
        patch, patch_with => PATCH;
        delete, delete_with => DELETE;
        head, head_with => HEAD;
        options, options_with => OPTIONS;
    }

    /// Registers a route, reporting a malformed or conflicting pattern as an
    /// error instead of panicking. Nothing is registered on error.
    pub fn try_route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: impl Handler,
        options: RouteOptions,
    ) -> Result<()> {
        if !pattern.starts_with('/') {
            return Err(Error::malformed(pattern, "pattern must start with `/`"));
        }
        let full = PathPattern::parse(&pattern::join(self.scopes.prefix(), pattern))?;
        let chain = self.scopes.snapshot(options.pre_handler);
        let chain_len = chain.len();

        self.table.insert(Route {
            method: method.clone(),
            pattern: full.clone(),
            chain,
            handler: handler.into_boxed_handler(),
        })?;

        debug!(%method, path = %full, chain = chain_len, "route registered");
        Ok(())
    }

    /// Adds a pre-handler to the current scope. It runs for routes registered
    /// after this call, in this scope or any group nested in it.
    pub fn pre_handler(mut self, pre: impl PreHandler) -> Self {
        self.scopes.add_pre_handler(pre.into_boxed_pre_handler());
        debug!(depth = self.scopes.depth(), "pre-handler added");
        self
    }

    /// Registers routes under `prefix` in a new scope.
    ///
    /// Pre-handlers added inside `build` apply only to routes registered
    /// inside it, and are gone once it returns.
    ///
    /// ```rust
    /// use sento::{Context, Router};
    ///
    /// let app = Router::new()
    ///     .group("/type", |r| {
    ///         r.pre_handler(|_: Context| async { Some("scoped") })
    ///             .get("/name", |_: Context| async { "never reached" })
    ///     })
    ///     .get("/name", |_: Context| async { "unscoped" })
    ///     .build();
    /// # let _ = app;
    /// ```
    pub fn group(mut self, prefix: &str, build: impl FnOnce(Router) -> Router) -> Self {
        self.scopes.push(prefix);
        debug!(prefix = self.scopes.prefix(), "group entered");
        let mut router = build(self);
        debug!(prefix = router.scopes.prefix(), "group exited");
        router.scopes.pop();
        router
    }

    /// Applies a [`Plugin`] to this router.
    pub fn plugin(self, plugin: impl Plugin) -> Self {
        debug!(plugin = std::any::type_name_of_val(&plugin), "applying plugin");
        plugin.apply(self)
    }

    /// Ends registration and freezes the routes into an [`App`].
    pub fn build(self) -> App {
        debug!(routes = self.table.len(), "router built");
        App::new(self.table)
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl From<Router> for App {
    fn from(router: Router) -> Self {
        router.build()
    }
}
