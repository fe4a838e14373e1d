//! Route path patterns.
//!
//! A pattern is a `/`-separated list of segments. A segment starting with `:`
//! is a named parameter that binds exactly one non-empty path segment; every
//! other segment is a literal that must match byte for byte:
//!
//! ```text
//! /users/:id/posts/:post
//!  ^^^^^ ^^^ ^^^^^ ^^^^^
//!  lit   par lit   par
//! ```
//!
//! Literals are compared against the raw request path, so they must be
//! visible ASCII. Write `/caf%C3%A9`, not `/café`.
//!
//! Patterns are compiled once at registration time. A pattern the tree cannot
//! represent faithfully is rejected there, never at request time.

use std::fmt;

use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled route pattern such as `/name/:name`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compiles `raw`, rejecting anything that is not a plain
    /// literal/parameter path.
    pub fn parse(raw: &str) -> Result<Self> {
        let Some(rest) = raw.strip_prefix('/') else {
            return Err(Error::malformed(raw, "pattern must start with `/`"));
        };

        let mut segments = Vec::new();
        for seg in rest.split('/') {
            if let Some(name) = seg.strip_prefix(':') {
                if name.is_empty() {
                    return Err(Error::malformed(raw, "parameter name is empty"));
                }
                if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(Error::malformed(
                        raw,
                        format!("parameter name `{name}` must be ASCII alphanumeric or `_`"),
                    ));
                }
                let duplicate = segments
                    .iter()
                    .any(|s| matches!(s, Segment::Param(existing) if existing == name));
                if duplicate {
                    return Err(Error::malformed(raw, format!("duplicate parameter `{name}`")));
                }
                segments.push(Segment::Param(name.to_owned()));
            } else {
                if seg.contains(['{', '}', '*']) {
                    return Err(Error::malformed(
                        raw,
                        format!("literal segment `{seg}` contains a reserved character"),
                    ));
                }
                // Requests are matched on the raw path, which is never
                // anything but visible ASCII.
                if !seg.bytes().all(|b| b.is_ascii_graphic()) {
                    return Err(Error::malformed(
                        raw,
                        format!("literal segment `{seg}` must be visible ASCII; percent-encode it"),
                    ));
                }
                segments.push(Segment::Literal(seg.to_owned()));
            }
        }

        Ok(Self { raw: raw.to_owned(), segments })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parameter names in pattern order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    #[cfg(test)]
    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The same pattern in `matchit` syntax (`{name}` parameters).
    pub(crate) fn tree_path(&self) -> String {
        let mut out = String::with_capacity(self.raw.len() + 2);
        for seg in &self.segments {
            out.push('/');
            match seg {
                Segment::Literal(lit) => out.push_str(lit),
                Segment::Param(name) => {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
            }
        }
        out
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Joins a group prefix and a route pattern: `/type` + `/name` → `/type/name`.
///
/// A trailing `/` on the prefix is dropped, and a bare `/` route inside a
/// group resolves to the group path itself.
pub(crate) fn join(prefix: &str, pattern: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return pattern.to_owned();
    }
    if pattern == "/" {
        return prefix.to_owned();
    }
    format!("{prefix}{pattern}")
}

// ── Params ────────────────────────────────────────────────────────────────────

/// Path parameters bound by a match, decoded, in pattern order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub(crate) fn push(&mut self, name: String, value: String) {
        self.0.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
