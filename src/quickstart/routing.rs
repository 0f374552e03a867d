//! Routes, variable rules and the trailing-slash convention.
//!
//! - `<name>` (string) takes any text without a slash
//! - `<int:post_id>` takes a non-negative integer
//! - `<path:subpath>` takes anything, slashes included
//!
//! `/projects/` ends in a slash, so `/projects` redirects to it.
//! `/about` does not, so `/about/` is a 404.

use crate::{Request, escape};

pub async fn hello_world(_req: Request) -> &'static str {
    "<p>Hello, World!</p>"
}

pub async fn hello(req: Request) -> String {
    format!("Hello, {}!", escape(req.param("name").unwrap_or_default()))
}

pub async fn show_user_profile(req: Request) -> String {
    format!("User {}", escape(req.param("username").unwrap_or_default()))
}

/// The `int` converter has already checked the digits; the number is echoed
/// as written, minus leading zeros, however large it is.
pub async fn show_post(req: Request) -> String {
    let digits = req.param("post_id").unwrap_or_default().trim_start_matches('0');
    format!("Post {}", if digits.is_empty() { "0" } else { digits })
}

pub async fn show_subpath(req: Request) -> String {
    format!("Subpath {}", escape(req.param("subpath").unwrap_or_default()))
}

pub async fn projects(_req: Request) -> &'static str {
    "The project page"
}

pub async fn about(_req: Request) -> &'static str {
    "The about page"
}
