//! # flagon
//!
//! A small web micro-framework on hyper, and a guided tour of it.
//!
//! The framework does the framework things and leaves the hard parts to
//! crates that already do them well:
//!
//! - Routing: `matchit` radix tree, Flask-style rules
//!   (`/post/<int:post_id>`, `/path/<path:subpath>`), trailing-slash
//!   redirects, automatic `HEAD`/`OPTIONS`, `405` with `Allow`
//! - URL building: [`App::url_for`] / [`Request::url_for`] by endpoint name
//! - Templates: `minijinja`, auto-escaped, with `url_for` available inside
//! - Forms and uploads: urlencoded and multipart (`multer`)
//! - Cookies and signed-cookie sessions: `cookie`
//! - Error handlers: [`abort`] a handler, render the error your way
//! - Async I/O: tokio + hyper, graceful shutdown on SIGTERM / Ctrl-C
//!
//! The [`quickstart`] module walks through all of it; the `flagon` binary
//! serves it.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use flagon::{App, Error, Request, Router, Server, abort, config::Config};
//! use flagon::StatusCode;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let config = Config::load()?;
//!     let router = Router::new()
//!         .get("/post/<int:post_id>", "show_post", show_post)
//!         .get("/not_found", "not_found", not_found);
//!     let app = App::builder(config.app.clone())
//!         .secret_key(b"a secret that is at least 32 bytes!")
//!         .router(router)
//!         .build()?;
//!
//!     Server::bind(config.socket_addr()?).serve(app).await
//! }
//!
//! async fn show_post(req: Request) -> String {
//!     format!("Post {}", req.param("post_id").unwrap_or_default())
//! }
//!
//! async fn not_found(_req: Request) -> Result<String, Error> {
//!     Err(abort(StatusCode::NOT_FOUND))
//! }
//! ```

mod app;
mod error;
mod form;
mod handler;
mod markup;
mod method;
mod request;
mod response;
mod router;
mod rule;
mod server;
mod session;
mod static_files;
mod template;

pub mod config;
pub mod logging;
pub mod quickstart;
pub mod testing;

pub use app::{App, AppBuilder};
pub use error::{Error, HttpError, abort};
pub use form::{FileStorage, Form, secure_filename};
pub use handler::{ErrorHandler, Handler};
pub use markup::escape;
pub use method::{Method, UnknownMethod};
pub use request::Request;
pub use response::{ContentType, Html, IntoResponse, Json, Response, ResponseBuilder, redirect, redirect_with};
pub use router::{Router, UrlMap};
pub use rule::{Converter, Rule, RuleError};
pub use server::Server;
pub use session::Session;
pub use template::Templates;

pub use cookie::Cookie;
pub use http::StatusCode;
pub use minijinja::context;
