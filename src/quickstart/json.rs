//! JSON responses from serde types.

use serde::Serialize;

use crate::{Error, Json, Request};

#[derive(Serialize)]
pub struct Me {
    pub username: &'static str,
    pub theme: &'static str,
    pub image: String,
}

#[derive(Serialize)]
pub struct User {
    pub username: &'static str,
}

/// An object.
pub async fn me_api_1(req: Request) -> Result<Json<Me>, Error> {
    let image = req.url_for("bad_request", &[("filename", "image.png")])?;
    Ok(Json(Me { username: "ktamido", theme: "title", image }))
}

/// A top-level array.
pub async fn me_api_2(_req: Request) -> Json<Vec<User>> {
    Json(vec![
        User { username: "mido" },
        User { username: "taku" },
        User { username: "mako" },
    ])
}
