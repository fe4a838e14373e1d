//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Handlers and pre-handlers return whatever is convenient. Everything they
//! may return funnels through [`IntoResponse`], so every value maps to exactly
//! one response and the same value always maps to the same response shape.

use std::borrow::Cow;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;
use serde::Serialize;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseBuilder::bytes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentType {
    Csv,          // text/csv
    Html,         // text/html; charset=utf-8
    Json,         // application/json
    OctetStream,  // application/octet-stream
    Text,         // text/plain; charset=utf-8
    Xml,          // application/xml
}

impl ContentType {
    fn header_value(self) -> HeaderValue {
        HeaderValue::from_static(match self {
            Self::Csv         => "text/csv",
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        })
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK)
///
/// ```rust
/// use sento::{Response, http::StatusCode};
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// Response::status(StatusCode::NO_CONTENT);
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use sento::{ContentType, Response};
/// use sento::http::{StatusCode, header::{HeaderValue, LOCATION}};
///
/// Response::builder()
///     .status(StatusCode::CREATED)
///     .header(LOCATION, HeaderValue::from_static("/users/42"))
///     .json(br#"{"id":42}"#.to_vec());
///
/// Response::builder()
///     .bytes(ContentType::Xml, b"<ok/>".to_vec());
/// ```
#[derive(Clone, Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// `200 OK` — `application/json`.
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::builder().bytes(ContentType::Json, body)
    }

    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: StatusCode) -> Self {
        Self { status: code, headers: HeaderMap::new(), body: Bytes::new() }
    }

    /// `404 Not Found`, empty body. What [`App::handle`](crate::App::handle)
    /// answers when no route matches.
    pub fn not_found() -> Self {
        Self::status(StatusCode::NOT_FOUND)
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: HeaderMap::new(), status: StatusCode::OK }
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body as UTF-8 text, lossily decoded.
    pub fn text_body(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Merges headers accumulated elsewhere (the request [`Context`]) into
    /// this response.
    ///
    /// Every header *name* the response does not already carry is copied with
    /// all of its values. Names the response sets itself win.
    ///
    /// [`Context`]: crate::Context
    pub fn merge_headers(mut self, extra: HeaderMap) -> Self {
        let mut current: Option<HeaderName> = None;
        let mut skip = false;
        for (name, value) in extra {
            // `HeaderMap::into_iter` yields the name only on the first value
            // of each run.
            if let Some(name) = name {
                skip = self.headers.contains_key(&name);
                current = Some(name);
            }
            if skip {
                continue;
            }
            if let Some(name) = &current {
                self.headers.append(name.clone(), value);
            }
        }
        self
    }

    /// Converts into the `http` response type hyper serves.
    pub fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

impl From<http::Response<Bytes>> for Response {
    fn from(res: http::Response<Bytes>) -> Self {
        let (parts, body) = res.into_parts();
        Self { status: parts.status, headers: parts.headers, body }
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`.
/// Terminated by a typed body method.
#[derive(Debug)]
pub struct ResponseBuilder {
    headers: HeaderMap,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    /// Appends a header; repeated names keep every value.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: impl Into<Bytes>) -> Response {
        self.bytes(ContentType::Json, body)
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        let body: String = body.into();
        self.bytes(ContentType::Text, body)
    }

    /// Terminate with a typed body.
    pub fn bytes(mut self, content_type: ContentType, body: impl Into<Bytes>) -> Response {
        if !self.headers.contains_key(CONTENT_TYPE) {
            self.headers.insert(CONTENT_TYPE, content_type.header_value());
        }
        Response { body: body.into(), headers: self.headers, status: self.status }
    }

    /// Terminate with no body.
    pub fn no_body(self) -> Response {
        Response { body: Bytes::new(), headers: self.headers, status: self.status }
    }
}

// ── Json ──────────────────────────────────────────────────────────────────────

/// Serialises `T` with serde_json as an `application/json` body.
///
/// ```rust
/// use sento::{Context, Json};
///
/// async fn get_user(ctx: Context) -> Json<Vec<String>> {
///     Json(vec![ctx.param("id").unwrap_or_default().to_owned()])
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Json<T>(pub T);

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers and
/// pre-handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for http::Response<Bytes> {
    fn into_response(self) -> Response { self.into() }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for Cow<'static, str> {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a status directly from a handler: `return StatusCode::NOT_FOUND`.
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response { Response::status(self) }
}

/// Overrides the status of whatever `T` produces.
impl<T: IntoResponse> IntoResponse for (StatusCode, T) {
    fn into_response(self) -> Response {
        let mut res = self.1.into_response();
        res.status = self.0;
        res
    }
}

impl IntoResponse for Bytes {
    fn into_response(self) -> Response {
        Response::builder().bytes(ContentType::OctetStream, self)
    }
}

impl IntoResponse for Vec<u8> {
    fn into_response(self) -> Response {
        Response::builder().bytes(ContentType::OctetStream, self)
    }
}

impl IntoResponse for serde_json::Value {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(bytes) => Response::json(bytes),
            Err(_) => Response::status(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

macro_rules! display_as_text {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoResponse for $ty {
                fn into_response(self) -> Response { Response::text(self.to_string()) }
            }
        )*
    };
}

display_as_text!(bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::LOCATION;

    fn content_type(res: &Response) -> &str {
        res.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or("")
    }

    #[test]
    fn strings_become_plain_text() {
        let res = "Cat".into_response();
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.text_body(), "Cat");
        assert_eq!(content_type(&res), "text/plain; charset=utf-8");

        let res = String::from("Dog").into_response();
        assert_eq!(res.text_body(), "Dog");
    }

    #[test]
    fn numbers_and_bools_render_as_text() {
        assert_eq!(42_u32.into_response().text_body(), "42");
        assert_eq!(true.into_response().text_body(), "true");
        assert_eq!(1.5_f64.into_response().text_body(), "1.5");
    }

    #[test]
    fn structured_values_become_json() {
        let res = serde_json::json!({ "name": "Fubuki" }).into_response();
        assert_eq!(content_type(&res), "application/json");
        assert_eq!(res.text_body(), r#"{"name":"Fubuki"}"#);

        let res = Json(vec![1, 2, 3]).into_response();
        assert_eq!(res.text_body(), "[1,2,3]");
    }

    #[test]
    fn status_tuple_overrides_status() {
        let res = (StatusCode::IM_A_TEAPOT, "Shuba Shuba").into_response();
        assert_eq!(res.status_code(), StatusCode::IM_A_TEAPOT);
        assert_eq!(res.text_body(), "Shuba Shuba");
    }

    #[test]
    fn bare_status_has_empty_body() {
        let res = StatusCode::NO_CONTENT.into_response();
        assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
        assert!(res.body().is_empty());
    }

    #[test]
    fn http_response_passes_through() {
        let res = http::Response::builder()
            .status(StatusCode::CREATED)
            .header("duck", "shuba duck")
            .body(Bytes::from_static(b"made"))
            .unwrap()
            .into_response();
        assert_eq!(res.status_code(), StatusCode::CREATED);
        assert_eq!(res.headers()["duck"], "shuba duck");
        assert_eq!(res.text_body(), "made");
    }

    #[test]
    fn merge_keeps_response_headers_and_adds_missing_ones() {
        let mut extra = HeaderMap::new();
        extra.append("x-powered-by", HeaderValue::from_static("sento"));
        extra.append("set-cookie", HeaderValue::from_static("a=1"));
        extra.append("set-cookie", HeaderValue::from_static("b=2"));
        extra.append("duck", HeaderValue::from_static("from context"));

        let res = Response::builder()
            .header(HeaderName::from_static("duck"), HeaderValue::from_static("shuba duck"))
            .header(LOCATION, HeaderValue::from_static("/"))
            .text("ok")
            .merge_headers(extra);

        assert_eq!(res.headers()["x-powered-by"], "sento");
        assert_eq!(res.headers().get_all("set-cookie").iter().count(), 2);
        let ducks: Vec<_> = res.headers().get_all("duck").iter().collect();
        assert_eq!(ducks, [&HeaderValue::from_static("shuba duck")]);
        assert_eq!(res.headers()[LOCATION], "/");
    }

    #[test]
    fn builder_respects_explicit_content_type() {
        let res = Response::builder()
            .header(CONTENT_TYPE, HeaderValue::from_static("text/markdown"))
            .text("# hi");
        assert_eq!(content_type(&res), "text/markdown");
    }

    #[test]
    fn into_inner_keeps_status_and_headers() {
        let res = Response::builder()
            .status(StatusCode::ACCEPTED)
            .text("queued")
            .into_inner();
        assert_eq!(res.status(), StatusCode::ACCEPTED);
        assert_eq!(res.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
    }
}
