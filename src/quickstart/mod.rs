//! A guided tour of the framework, one small handler per feature.
//!
//! | Section | Module |
//! |---|---|
//! | Routes and variable rules, trailing slashes | [`routing`] |
//! | URL building | [`urls`] |
//! | HTTP methods | [`methods`] |
//! | Static files | [`assets`] |
//! | Templates | [`rendering`] |
//! | Form data and uploads | [`forms`] |
//! | Cookies | [`cookies`] |
//! | Redirects, aborts, error handlers | [`errors`] |
//! | JSON responses | [`json`] |
//! | Sessions | [`login`] |
//! | Logging | [`logger`] |
//!
//! [`app`] wires everything together; the `flagon` binary serves it.

pub mod assets;
pub mod cookies;
pub mod errors;
pub mod forms;
pub mod json;
pub mod logger;
pub mod login;
pub mod methods;
pub mod rendering;
pub mod routing;
pub mod urls;

use crate::config::AppConfig;
use crate::{App, Error, Method, Router, StatusCode};

/// Signs the session cookie unless the configuration supplies its own.
pub const SECRET_KEY: &[u8] = b"_5#y2L\"F4Q8z\n\xec]/k9&Tq2@vLr#0Wz!e";

const GET_POST: &[Method] = &[Method::Get, Method::Post];

/// Every route of the tour.
///
/// `/` and `/user/<username>` are registered twice on purpose: the first
/// endpoint serves requests, the second (`index`, `profile`) is still a valid
/// name for URL building.
pub fn router() -> Router {
    Router::new()
        .get("/", "hello_world", routing::hello_world)
        .get("/<name>", "hello", routing::hello)
        .get("/user/<username>", "show_user_profile", routing::show_user_profile)
        .get("/post/<int:post_id>", "show_post", routing::show_post)
        .get("/path/<path:subpath>", "show_subpath", routing::show_subpath)
        .get("/projects/", "projects", routing::projects)
        .get("/about", "about", routing::about)
        .get("/", "index", urls::index)
        .get("/login", "login", urls::login)
        .get("/user/<username>", "profile", urls::profile)
        .on(GET_POST, "/signin", "signin", methods::signin)
        .get("/load_static_file", "load_static_file", assets::load_static_file)
        .get("/sample_tpl/", "sample_tpl", rendering::sample_tpl)
        .get("/sample_tpl/<name>", "sample_tpl", rendering::sample_tpl)
        .on(GET_POST, "/login_1", "login_1", forms::login_1)
        .on(GET_POST, "/upload_file", "upload_file", forms::upload_file)
        .get("/cookie", "cookie", cookies::cookie)
        .get("/redirect_from", "redirect_from", errors::redirect_from)
        .get("/redirect_to", "redirect_to", errors::redirect_to)
        .get("/not_found", "not_found", errors::not_found)
        .get("/bad_request", "bad_request", errors::bad_request)
        .get("/me1", "me_api_1", json::me_api_1)
        .get("/me2", "me_api_2", json::me_api_2)
        .get("/top", "top", login::top)
        .on(GET_POST, "/login1", "login1", login::login1)
        .get("/logout1", "logout1", login::logout1)
        .get("/logger", "logger", logger::logger)
}

/// The tour application with its error pages.
pub fn app(config: &AppConfig) -> Result<App, Error> {
    App::builder(config.clone())
        .secret_key(SECRET_KEY)
        .router(router())
        .on_error(StatusCode::NOT_FOUND, errors::page_not_found)
        .on_error(StatusCode::BAD_REQUEST, errors::page_bad_request)
        .build()
}

pub use urls::url_examples;
