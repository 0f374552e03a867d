//! Reading and setting a cookie.

use crate::{Cookie, Error, IntoResponse, Request, Response, context};

/// Shows the `username` cookie from the previous visit, then sets it.
pub async fn cookie(req: Request) -> Result<Response, Error> {
    let username = req.cookie("username");
    let mut response = req.render_template("cookie.html", context! { username })?.into_response();
    response.set_cookie(Cookie::build(("username", "midori")).path("/"));
    Ok(response)
}
