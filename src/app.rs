//! The application: router, error handlers, templates and session key
//! behind one cheap-to-clone handle.
//!
//! [`App::handle`] is the whole request lifecycle. The server and the test
//! client both call it, so tests exercise exactly what production runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use cookie::Key;
use http::StatusCode;
use tracing::info;

use crate::config::AppConfig;
use crate::error::{Error, HttpError};
use crate::handler::{BoxedErrorHandler, ErrorHandler};
use crate::method::Method;
use crate::request::Request;
use crate::response::{IntoResponse, Response, redirect_with};
use crate::router::{Lookup, Router, UrlMap};
use crate::session::{MIN_SECRET_LEN, Session};
use crate::static_files;
use crate::template::Templates;

/// What a request can reach besides its own data.
pub(crate) struct Context {
    pub(crate) urls: Arc<UrlMap>,
    pub(crate) templates: Templates,
    pub(crate) config: AppConfig,
}

struct Inner {
    router: Router,
    error_handlers: HashMap<StatusCode, BoxedErrorHandler>,
    key: Key,
    ctx: Arc<Context>,
}

/// A built application.
#[derive(Clone)]
pub struct App {
    inner: Arc<Inner>,
}

/// Assembles an [`App`].
///
/// ```rust,no_run
/// use flagon::{App, HttpError, Request, Router, StatusCode, config::AppConfig};
///
/// # async fn hello(_: Request) -> &'static str { "" }
/// # async fn not_found(_: Request, _: HttpError) -> &'static str { "" }
/// let app = App::builder(AppConfig::default())
///     .secret_key(b"0123456789abcdef0123456789abcdef")
///     .router(Router::new().get("/", "hello", hello))
///     .on_error(StatusCode::NOT_FOUND, not_found)
///     .build()
///     .unwrap();
/// ```
pub struct AppBuilder {
    config: AppConfig,
    router: Router,
    error_handlers: HashMap<StatusCode, BoxedErrorHandler>,
    secret_key: Option<Vec<u8>>,
}

impl App {
    pub fn builder(config: AppConfig) -> AppBuilder {
        AppBuilder {
            config,
            router: Router::new(),
            error_handlers: HashMap::new(),
            secret_key: None,
        }
    }

    /// Builds a URL outside of any request.
    pub fn url_for(&self, endpoint: &str, values: &[(&str, &str)]) -> Result<String, Error> {
        self.inner.ctx.urls.build(endpoint, values)
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.ctx.config
    }

    /// Runs one request through routing, the handler, error handlers and
    /// session persistence.
    pub async fn handle(&self, req: http::Request<Bytes>) -> http::Response<Bytes> {
        let started = Instant::now();
        let (parts, body) = req.into_parts();
        let path = parts.uri.path().to_owned();

        let method = match Method::try_from(&parts.method) {
            Ok(method) => method,
            Err(err) => {
                info!(path, status = 405, "{err}");
                return HttpError::new(StatusCode::METHOD_NOT_ALLOWED).into_response().into_http();
            }
        };

        let session = Session::load(&parts.headers, &self.inner.key);
        let mut request = Request::new(
            method,
            parts.uri,
            parts.headers,
            body,
            session.clone(),
            Arc::clone(&self.inner.ctx),
        );

        let response = match self.inner.router.lookup(method, &path) {
            Lookup::Found { handler, params } => {
                request.set_params(params);
                handler.call(request.clone()).await
            }
            Lookup::Redirect(mut location) => {
                if let Some(query) = request.query() {
                    location.push('?');
                    location.push_str(query);
                }
                redirect_with(StatusCode::PERMANENT_REDIRECT, &location)
            }
            Lookup::Options(allowed) => {
                Response::builder().header("allow", &Method::allow_header(&allowed)).no_body()
            }
            Lookup::MethodNotAllowed(allowed) => {
                let mut response = HttpError::new(StatusCode::METHOD_NOT_ALLOWED).into_response();
                response.insert_header("allow", Method::allow_header(&allowed));
                response
            }
            Lookup::NotFound => HttpError::new(StatusCode::NOT_FOUND).into_response(),
        };

        let mut response = self.recover(request, response).await;
        session.save(&self.inner.key, &mut response);
        if method == Method::Head {
            response.body = Bytes::new();
        }

        info!(
            method = %method,
            path,
            status = response.code().as_u16(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "request"
        );
        response.into_http()
    }

    /// Hands an aborted response to the error handler registered for its
    /// status, if any.
    async fn recover(&self, request: Request, mut response: Response) -> Response {
        let Some(err) = response.abort.take() else {
            return response;
        };
        match self.inner.error_handlers.get(&err.status()) {
            Some(handler) => handler.call((request, err)).await,
            None => response,
        }
    }
}

impl AppBuilder {
    /// Replaces the routes.
    pub fn router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    /// The key used to sign session cookies. At least 32 bytes.
    pub fn secret_key(mut self, secret: &[u8]) -> Self {
        self.secret_key = Some(secret.to_vec());
        self
    }

    /// Renders `status` errors with `handler` instead of the stock page.
    pub fn on_error(mut self, status: StatusCode, handler: impl ErrorHandler) -> Self {
        self.error_handlers.insert(status, handler.into_boxed_error_handler());
        self
    }

    pub fn build(self) -> Result<App, Error> {
        let secret = self
            .config
            .secret_key
            .as_ref()
            .map(|s| s.as_bytes().to_vec())
            .or(self.secret_key)
            .ok_or_else(|| Error::Config("a secret key is required for sessions".to_owned()))?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(Error::Config(format!(
                "secret key must be at least {MIN_SECRET_LEN} bytes, got {}",
                secret.len()
            )));
        }

        let mut router = self.router;
        if self.config.static_folder.is_some() {
            let rule = format!("{}/<path:filename>", self.config.static_url_path.trim_end_matches('/'));
            router = router.get(&rule, static_files::ENDPOINT, static_files::serve);
        }

        let urls = Arc::new(router.urls().clone());
        let templates = Templates::new(&self.config.template_folder, Arc::clone(&urls));
        let ctx = Arc::new(Context { urls, templates, config: self.config });

        Ok(App {
            inner: Arc::new(Inner {
                router,
                error_handlers: self.error_handlers,
                key: Key::derive_from(&secret),
                ctx,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    async fn hello(_req: Request) -> &'static str {
        "hi"
    }

    #[test]
    fn rejects_short_secrets() {
        let result = App::builder(AppConfig::default()).secret_key(b"short").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn requires_a_secret() {
        assert!(matches!(App::builder(AppConfig::default()).build(), Err(Error::Config(_))));
    }

    #[test]
    fn registers_static_endpoint() {
        let app = App::builder(AppConfig::default())
            .secret_key(SECRET)
            .router(Router::new().get("/", "hello", hello))
            .build()
            .unwrap();
        assert_eq!(app.url_for("static", &[("filename", "style.css")]).unwrap(), "/static/style.css");
    }

    #[test]
    fn static_endpoint_can_be_disabled() {
        let config = AppConfig { static_folder: None, ..AppConfig::default() };
        let app = App::builder(config).secret_key(SECRET).build().unwrap();
        assert!(app.url_for("static", &[("filename", "style.css")]).is_err());
    }
}
