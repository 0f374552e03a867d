//! Incoming HTTP request type.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use cookie::Cookie;
use http::{HeaderMap, Uri, header};
use serde::Serialize;

use crate::app::Context;
use crate::config::AppConfig;
use crate::error::Error;
use crate::form::Form;
use crate::method::Method;
use crate::response::Html;
use crate::session::Session;

/// An incoming HTTP request with its body fully read.
///
/// Besides the raw parts it carries the route parameters, the client's
/// session and a handle on the application, so handlers can build URLs and
/// render templates.
#[derive(Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    params: HashMap<String, String>,
    session: Session,
    ctx: Arc<Context>,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
        session: Session,
        ctx: Arc<Context>,
    ) -> Self {
        Self { method, uri, headers, body, params: HashMap::new(), session, ctx }
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    pub fn method(&self) -> Method { self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn query(&self) -> Option<&str> { self.uri.query() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named route parameter, already percent-decoded.
    ///
    /// For a rule `/user/<username>`, `req.param("username")` on
    /// `/user/mido` returns `Some("mido")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns a route parameter parsed as `T`, e.g. the value of an
    /// `<int:post_id>` placeholder as `u64`.
    pub fn param_as<T: FromStr>(&self, key: &str) -> Option<T> {
        self.param(key)?.parse().ok()
    }

    /// Query-string arguments in order.
    pub fn args(&self) -> Vec<(String, String)> {
        form_urlencoded::parse(self.query().unwrap_or_default().as_bytes())
            .into_owned()
            .collect()
    }

    /// The first query-string argument named `name`.
    pub fn arg(&self, name: &str) -> Option<String> {
        form_urlencoded::parse(self.query().unwrap_or_default().as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Parses the body as a submitted form.
    ///
    /// Handles `application/x-www-form-urlencoded` and
    /// `multipart/form-data`; any other body yields an empty form.
    pub async fn form(&self) -> Result<Form, Error> {
        let content_type = self.header(header::CONTENT_TYPE.as_str()).unwrap_or_default();
        if content_type.starts_with("application/x-www-form-urlencoded") {
            Ok(Form::from_urlencoded(&self.body))
        } else if content_type.starts_with("multipart/form-data") {
            let boundary = multer::parse_boundary(content_type)?;
            Form::from_multipart(self.body.clone(), boundary).await
        } else {
            Ok(Form::default())
        }
    }

    /// The value of the cookie named `name`.
    pub fn cookie(&self, name: &str) -> Option<String> {
        parse_cookies(&self.headers)
            .into_iter()
            .find(|cookie| cookie.name() == name)
            .map(|cookie| cookie.value().to_owned())
    }

    /// Every cookie the client sent.
    pub fn cookies(&self) -> Vec<Cookie<'static>> {
        parse_cookies(&self.headers)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Builds the URL for `endpoint`; see [`UrlMap::build`](crate::UrlMap::build).
    pub fn url_for(&self, endpoint: &str, values: &[(&str, &str)]) -> Result<String, Error> {
        self.ctx.urls.build(endpoint, values)
    }

    /// Renders a template from the application's template folder.
    pub fn render_template<S: Serialize>(&self, name: &str, ctx: S) -> Result<Html<String>, Error> {
        self.ctx.templates.render(name, ctx).map(Html)
    }

    /// Application settings.
    pub fn config(&self) -> &AppConfig {
        &self.ctx.config
    }
}

/// Every cookie in the request's `Cookie` headers. Malformed pairs are skipped.
pub(crate) fn parse_cookies(headers: &HeaderMap) -> Vec<Cookie<'static>> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| {
            Cookie::split_parse(value)
                .filter_map(Result::ok)
                .map(Cookie::into_owned)
                .collect::<Vec<_>>()
        })
        .collect()
}
