//! Route table.
//!
//! One radix tree per HTTP method, O(path-length) lookup. Each entry is an
//! immutable [`Route`]: its compiled pattern, the pre-handler chain frozen at
//! registration time, and the main handler.
//!
//! # Precedence
//!
//! At any position a literal segment beats a parameter segment, whatever the
//! registration order: with both `/name/:name` and `/name/me` registered,
//! `/name/me` always reaches the literal route. Two routes the tree cannot
//! tell apart are rejected when the second one is registered.
//!
//! Lookup runs on the raw, still-encoded path. Only parameter values are
//! decoded, so a literal must be written in its encoded form.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;
use percent_encoding::percent_decode_str;

use crate::error::{Error, Result};
use crate::handler::{BoxedHandler, BoxedPreHandler};
use crate::pattern::{Params, PathPattern};

pub(crate) struct Route {
    pub(crate) method: Method,
    pub(crate) pattern: PathPattern,
    pub(crate) chain: Arc<[BoxedPreHandler]>,
    pub(crate) handler: BoxedHandler,
}

#[derive(Default)]
pub(crate) struct RouteTable {
    trees: HashMap<Method, MatchitRouter<Arc<Route>>>,
    len: usize,
}

impl RouteTable {
    pub(crate) fn insert(&mut self, route: Route) -> Result<()> {
        let path = route.pattern.tree_path();
        let method = route.method.clone();
        let pattern = route.pattern.as_str().to_owned();
        self.trees
            .entry(method.clone())
            .or_default()
            .insert(path, Arc::new(route))
            .map_err(|source| Error::RouteConflict { method, pattern, source })?;
        self.len += 1;
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Finds the route for `method` + `path` and binds its parameters.
    ///
    /// Empty parameter values never match.
    pub(crate) fn lookup(&self, method: &Method, path: &str) -> Option<(Arc<Route>, Params)> {
        let tree = self.trees.get(method)?;
        let matched = tree.at(path).ok()?;

        let mut params = Params::default();
        for (name, raw) in matched.params.iter() {
            if raw.is_empty() {
                return None;
            }
            let value = percent_decode_str(raw).decode_utf8_lossy().into_owned();
            params.push(name.to_owned(), value);
        }
        Some((Arc::clone(matched.value), params))
    }
}
