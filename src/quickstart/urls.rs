//! Building URLs from endpoint names instead of hard-coding paths.

use crate::{App, Error, Request, escape};

pub async fn index(_req: Request) -> &'static str {
    "index"
}

pub async fn login(_req: Request) -> &'static str {
    "login"
}

pub async fn profile(req: Request) -> String {
    format!("{}'s profile", escape(req.param("username").unwrap_or_default()))
}

/// The URLs the binary prints at startup:
///
/// ```text
/// /
/// /login
/// /login?next=%2Ftop
/// /user/mido
/// /user/mido?foo=bar
/// ```
pub fn url_examples(app: &App) -> Result<Vec<String>, Error> {
    Ok(vec![
        app.url_for("index", &[])?,
        app.url_for("login", &[])?,
        app.url_for("login", &[("next", "/top")])?,
        app.url_for("profile", &[("username", "mido")])?,
        app.url_for("profile", &[("username", "mido"), ("foo", "bar")])?,
    ])
}
