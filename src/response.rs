//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Build a [`Response`] in your handler and return it, or return anything
//! that converts into one: strings (sent as HTML), [`Html`], [`Json`], a
//! status code, a `(StatusCode, body)` pair, or a `Result` of those.

use bytes::Bytes;
use cookie::Cookie;
use http::StatusCode;
use serde::Serialize;
use tracing::warn;

use crate::error::{Error, HttpError};
use crate::markup::escape;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseBuilder::bytes`].
pub enum ContentType {
    Css,          // text/css
    Html,         // text/html; charset=utf-8
    Json,         // application/json
    OctetStream,  // application/octet-stream
    Text,         // text/plain; charset=utf-8
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Css         => "text/css",
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use flagon::{Response, StatusCode};
///
/// Response::html("<p>hello</p>");
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::status(StatusCode::NO_CONTENT);
///
/// Response::builder()
///     .status(StatusCode::BAD_REQUEST)
///     .header("x-something", "A Value")
///     .html("<h1>Bad Request</h1>");
/// ```
pub struct Response {
    pub(crate) body: Bytes,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: StatusCode,
    pub(crate) abort: Option<HttpError>,
}

impl Response {
    /// `200 OK`, `text/html; charset=utf-8`.
    pub fn html(body: impl Into<String>) -> Self {
        Self::builder().html(body)
    }

    /// `200 OK`, `application/json`.
    pub fn json(body: Vec<u8>) -> Self {
        Self::builder().json(body)
    }

    /// `200 OK`, `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: StatusCode) -> Self {
        Self::builder().status(code).no_body()
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: StatusCode::OK }
    }

    /// The stock error page for `err`, marked so error handlers can replace it.
    pub(crate) fn aborted(err: HttpError) -> Self {
        let page = format!(
            "<!doctype html>\n<html lang=en>\n<title>{code} {name}</title>\n<h1>{name}</h1>\n<p>{description}</p>\n",
            code = err.status().as_u16(),
            name = err.name(),
            description = escape(err.description()),
        );
        let mut response = Self::builder().status(err.status()).html(page);
        response.abort = Some(err);
        response
    }

    pub fn code(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Case-insensitive header lookup; first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// True while the response is an unhandled error page.
    pub fn is_aborted(&self) -> bool {
        self.abort.is_some()
    }

    /// Replaces every header named `name` with a single value.
    pub fn insert_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_owned(), value.into()));
    }

    /// Adds a `Set-Cookie` header.
    pub fn set_cookie(&mut self, cookie: impl Into<Cookie<'static>>) {
        self.headers.push(("set-cookie".to_owned(), cookie.into().to_string()));
    }

    pub(crate) fn set_code(&mut self, code: StatusCode) {
        self.status = code;
    }

    pub(crate) fn into_http(self) -> http::Response<Bytes> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        let headers = response.headers_mut();
        for (name, value) in self.headers {
            match (
                http::HeaderName::from_bytes(name.as_bytes()),
                http::HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => warn!(header = %name, "dropping header that is not valid on the wire"),
            }
        }
        response
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`. Terminated by a
/// typed body method.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with an HTML body (`text/html; charset=utf-8`).
    pub fn html(self, body: impl Into<String>) -> Response {
        self.finish(ContentType::Html.as_str(), body.into().into_bytes())
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: Vec<u8>) -> Response {
        self.finish(ContentType::Json.as_str(), body)
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(ContentType::Text.as_str(), body.into().into_bytes())
    }

    /// Terminate with a typed body.
    pub fn bytes(self, content_type: ContentType, body: Vec<u8>) -> Response {
        self.finish(content_type.as_str(), body)
    }

    /// Terminate with a body and a content type given verbatim.
    pub fn raw(self, content_type: &str, body: Vec<u8>) -> Response {
        self.finish(content_type, body)
    }

    /// Terminate with no body.
    pub fn no_body(self) -> Response {
        Response { body: Bytes::new(), headers: self.headers, status: self.status, abort: None }
    }

    fn finish(self, content_type: &str, body: Vec<u8>) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.to_owned())];
        headers.extend(self.headers);
        Response { body: Bytes::from(body), headers, status: self.status, abort: None }
    }
}

// ── Redirects ─────────────────────────────────────────────────────────────────

/// `302 Found` pointing at `location`.
pub fn redirect(location: &str) -> Response {
    redirect_with(StatusCode::FOUND, location)
}

/// A redirect with an explicit 3xx status.
pub fn redirect_with(code: StatusCode, location: &str) -> Response {
    let target = escape(location);
    let page = format!(
        "<!doctype html>\n<html lang=en>\n<title>Redirecting...</title>\n<h1>Redirecting...</h1>\n\
         <p>You should be redirected automatically to the target URL: \
         <a href=\"{target}\">{target}</a>. If not, click the link.\n"
    );
    Response::builder()
        .status(code)
        .header("location", location)
        .html(page)
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::html(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::html(self) }
}

/// Return a status directly from a handler: `return StatusCode::NO_CONTENT`
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response { Response::status(self) }
}

/// `(StatusCode::NOT_FOUND, page)` overrides the status of `page`.
impl<R: IntoResponse> IntoResponse for (StatusCode, R) {
    fn into_response(self) -> Response {
        let mut response = self.1.into_response();
        response.set_code(self.0);
        response
    }
}

impl<T: IntoResponse, E: IntoResponse> IntoResponse for Result<T, E> {
    fn into_response(self) -> Response {
        match self {
            Ok(value) => value.into_response(),
            Err(err) => err.into_response(),
        }
    }
}

/// An HTML body.
pub struct Html<T>(pub T);

impl<T: Into<String>> IntoResponse for Html<T> {
    fn into_response(self) -> Response { Response::html(self.0) }
}

/// A JSON body serialised with serde.
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(bytes) => Response::json(bytes),
            Err(err) => Error::from(err).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_html() {
        let response = "<p>Hello, World!</p>".into_response();
        assert_eq!(response.code(), StatusCode::OK);
        assert_eq!(response.header("Content-Type"), Some("text/html; charset=utf-8"));
        assert_eq!(response.body(), b"<p>Hello, World!</p>");
    }

    #[test]
    fn status_pair_overrides_code() {
        let response = (StatusCode::NOT_FOUND, Html("gone")).into_response();
        assert_eq!(response.code(), StatusCode::NOT_FOUND);
        assert!(!response.is_aborted());
    }

    #[test]
    fn redirect_sets_location() {
        let response = redirect("/redirect_to");
        assert_eq!(response.code(), StatusCode::FOUND);
        assert_eq!(response.header("location"), Some("/redirect_to"));
    }

    #[test]
    fn insert_header_replaces() {
        let mut response = Response::html("x");
        response.insert_header("X-Something", "A");
        response.insert_header("x-something", "A Value");
        assert_eq!(response.header("X-Something"), Some("A Value"));
        assert_eq!(response.headers().len(), 2);
    }

    #[test]
    fn set_cookie_serialises() {
        let mut response = Response::html("x");
        response.set_cookie(Cookie::build(("username", "midori")).path("/"));
        assert_eq!(response.header("set-cookie"), Some("username=midori; Path=/"));
    }

    #[test]
    fn text_and_typed_bodies() {
        let response = Response::text("plain");
        assert_eq!(response.header("content-type"), Some("text/plain; charset=utf-8"));
        assert_eq!(response.body(), b"plain");

        let response = Response::builder()
            .status(StatusCode::CREATED)
            .bytes(ContentType::OctetStream, vec![0, 1, 2]);
        assert_eq!(response.code(), StatusCode::CREATED);
        assert_eq!(response.header("content-type"), Some("application/octet-stream"));
        assert_eq!(response.body(), &[0, 1, 2]);
    }

    #[test]
    fn json_wrapper_serialises() {
        let response = Json(vec!["a", "b"]).into_response();
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.body(), br#"["a","b"]"#);
    }
}
