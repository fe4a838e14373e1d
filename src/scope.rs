//! Registration-time scope stack.
//!
//! Each [`Router::group`](crate::Router::group) call pushes a frame carrying
//! the group's full path prefix and its own, initially empty, pre-handler
//! list. Pre-handlers always land on the top frame. A route registered while
//! a frame is on top captures the pre-handlers of every frame from the root
//! to the top, in that order, *at that moment*. Frames are never consulted
//! again for that route, so a pre-handler added later, or in a sibling group,
//! cannot reach it.

use std::sync::Arc;

use crate::handler::BoxedPreHandler;
use crate::pattern;

struct ScopeFrame {
    prefix: String,
    pre_handlers: Vec<BoxedPreHandler>,
}

pub(crate) struct ScopeStack {
    // frames[0] is the root and is never popped.
    frames: Vec<ScopeFrame>,
}

impl ScopeStack {
    pub(crate) fn new() -> Self {
        Self { frames: vec![ScopeFrame { prefix: String::new(), pre_handlers: Vec::new() }] }
    }

    pub(crate) fn push(&mut self, prefix: &str) {
        let joined = pattern::join(self.prefix(), prefix);
        let prefix = joined.trim_end_matches('/').to_owned();
        self.frames.push(ScopeFrame { prefix, pre_handlers: Vec::new() });
    }

    pub(crate) fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Full prefix of the active frame.
    pub(crate) fn prefix(&self) -> &str {
        self.top().prefix.as_str()
    }

    pub(crate) fn add_pre_handler(&mut self, pre: BoxedPreHandler) {
        self.top_mut().pre_handlers.push(pre);
    }

    /// The chain a route registered right now captures: root-to-top frame
    /// pre-handlers, then the route-local one.
    pub(crate) fn snapshot(&self, local: Option<BoxedPreHandler>) -> Arc<[BoxedPreHandler]> {
        self.frames
            .iter()
            .flat_map(|frame| frame.pre_handlers.iter().cloned())
            .chain(local)
            .collect()
    }

    fn top(&self) -> &ScopeFrame {
        // `frames` always holds the root.
        &self.frames[self.frames.len() - 1]
    }

    fn top_mut(&mut self) -> &mut ScopeFrame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }
}
