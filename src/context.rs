//! Per-request context.
//!
//! A [`Context`] is built fresh for every dispatched request and handed to
//! each pre-handler and then the main handler. It is a cheap handle: clones
//! share the same request data, the same outgoing headers and the same typed
//! state, so a header set by a pre-handler is still there when the response
//! is assembled. It never outlives its request.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::request::Parts;
use http::{Extensions, HeaderMap, Method, Uri};

use crate::error::Error;
use crate::pattern::Params;

#[derive(Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

struct Inner {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    params: Params,
    query: Vec<(String, String)>,
    response_headers: Mutex<HeaderMap>,
    state: Mutex<Extensions>,
}

impl Context {
    pub(crate) fn new(parts: Parts, body: Bytes, params: Params) -> Self {
        let query = parts
            .uri
            .query()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        Self {
            inner: Arc::new(Inner {
                method: parts.method,
                uri: parts.uri,
                headers: parts.headers,
                body,
                params,
                query,
                response_headers: Mutex::new(HeaderMap::new()),
                state: Mutex::new(parts.extensions),
            }),
        }
    }

    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    pub fn uri(&self) -> &Uri {
        &self.inner.uri
    }

    pub fn path(&self) -> &str {
        self.inner.uri.path()
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.headers
    }

    /// Case-insensitive request header lookup. Non-UTF-8 values read as `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.inner.body
    }

    /// Returns a named path parameter, percent-decoded.
    ///
    /// For a route `/name/:name`, `ctx.param("name")` on `/name/Fubuki`
    /// returns `Some("Fubuki")`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.inner.params.get(name)
    }

    pub fn params(&self) -> &Params {
        &self.inner.params
    }

    /// First query-string value for `key`, form-decoded.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.inner.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    // ── Outgoing headers ──────────────────────────────────────────────────────

    /// Appends an outgoing header. It is merged into whatever response the
    /// request ends with, unless that response sets the same name itself.
    pub fn append_header<K, V>(&self, name: K, value: V) -> Result<(), Error>
    where
        K: TryInto<HeaderName>,
        K::Error: Into<http::Error>,
        V: TryInto<HeaderValue>,
        V::Error: Into<http::Error>,
    {
        let (name, value) = header_pair(name, value)?;
        self.response_headers().append(name, value);
        Ok(())
    }

    /// Sets an outgoing header, replacing any value appended before.
    pub fn set_header<K, V>(&self, name: K, value: V) -> Result<(), Error>
    where
        K: TryInto<HeaderName>,
        K::Error: Into<http::Error>,
        V: TryInto<HeaderValue>,
        V::Error: Into<http::Error>,
    {
        let (name, value) = header_pair(name, value)?;
        self.response_headers().insert(name, value);
        Ok(())
    }

    /// A copy of the outgoing headers accumulated so far.
    pub fn outgoing_headers(&self) -> HeaderMap {
        self.response_headers().clone()
    }

    pub(crate) fn take_outgoing_headers(&self) -> HeaderMap {
        std::mem::take(&mut *self.response_headers())
    }

    fn response_headers(&self) -> MutexGuard<'_, HeaderMap> {
        self.inner.response_headers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Typed state ───────────────────────────────────────────────────────────

    /// Stores a value for later handlers in the same request, replacing a
    /// previous value of the same type.
    pub fn insert<T: Clone + Send + Sync + 'static>(&self, value: T) -> Option<T> {
        self.state().insert(value)
    }

    /// Returns a clone of the stored value of type `T`, if any.
    pub fn get<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
        self.state().get::<T>().cloned()
    }

    fn state(&self) -> MutexGuard<'_, Extensions> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("method", &self.inner.method)
            .field("uri", &self.inner.uri)
            .field("params", &self.inner.params)
            .finish_non_exhaustive()
    }
}

fn header_pair<K, V>(name: K, value: V) -> Result<(HeaderName, HeaderValue), Error>
where
    K: TryInto<HeaderName>,
    K::Error: Into<http::Error>,
    V: TryInto<HeaderValue>,
    V::Error: Into<http::Error>,
{
    let name = name.try_into().map_err(|e| Error::InvalidHeader(e.into()))?;
    let value = value.try_into().map_err(|e| Error::InvalidHeader(e.into()))?;
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(uri: &str) -> Context {
        let (parts, body) = http::Request::builder()
            .uri(uri)
            .header("X-Client", "test")
            .body(Bytes::from_static(b"payload"))
            .unwrap()
            .into_parts();
        let mut params = Params::default();
        params.push("name".into(), "Fubuki".into());
        Context::new(parts, body, params)
    }

    #[test]
    fn exposes_request_fields() {
        let ctx = ctx("/name/Fubuki?lang=ja&tag=a+b&tag=c");
        assert_eq!(ctx.method(), Method::GET);
        assert_eq!(ctx.path(), "/name/Fubuki");
        assert_eq!(ctx.param("name"), Some("Fubuki"));
        assert_eq!(ctx.query("lang"), Some("ja"));
        assert_eq!(ctx.query("tag"), Some("a b"));
        assert_eq!(ctx.query("missing"), None);
        assert_eq!(ctx.header("x-client"), Some("test"));
        assert_eq!(&ctx.body()[..], b"payload");
    }

    #[test]
    fn clones_share_outgoing_headers() {
        let ctx = ctx("/");
        let other = ctx.clone();
        other.append_header("X-Powered-By", "sento").unwrap();
        other.append_header("set-cookie", "a=1").unwrap();
        ctx.append_header("set-cookie", "b=2").unwrap();

        let headers = ctx.outgoing_headers();
        assert_eq!(headers["x-powered-by"], "sento");
        assert_eq!(headers.get_all("set-cookie").iter().count(), 2);

        ctx.set_header("set-cookie", "c=3").unwrap();
        assert_eq!(ctx.take_outgoing_headers().get_all("set-cookie").iter().count(), 1);
        assert!(ctx.outgoing_headers().is_empty());
    }

    #[test]
    fn rejects_invalid_header_names() {
        let ctx = ctx("/");
        assert!(matches!(
            ctx.append_header("bad header", "x"),
            Err(Error::InvalidHeader(_))
        ));
    }

    #[test]
    fn typed_state_round_trips_between_clones() {
        #[derive(Clone, Debug, PartialEq)]
        struct User(&'static str);

        let ctx = ctx("/");
        assert_eq!(ctx.get::<User>(), None);
        ctx.clone().insert(User("Korone"));
        assert_eq!(ctx.get::<User>(), Some(User("Korone")));
    }
}
