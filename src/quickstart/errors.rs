//! Redirects, aborting a handler, and custom error pages.

use crate::{Error, HttpError, IntoResponse, Request, Response, StatusCode, abort, context, redirect};

pub async fn redirect_from(req: Request) -> Result<Response, Error> {
    Ok(redirect(&req.url_for("redirect_to", &[])?))
}

pub async fn redirect_to(_req: Request) -> &'static str {
    "redirect!!!"
}

pub async fn not_found(_req: Request) -> Result<Response, Error> {
    Err(abort(StatusCode::NOT_FOUND))
}

pub async fn bad_request(_req: Request) -> Result<Response, Error> {
    Err(abort(StatusCode::BAD_REQUEST))
}

/// Every 404, whether from routing or from [`abort`].
pub async fn page_not_found(req: Request, _err: HttpError) -> Result<Response, Error> {
    let page = req.render_template("page_not_found.html", context! {})?;
    Ok((StatusCode::NOT_FOUND, page).into_response())
}

/// Every 400, with an extra header to show responses can be adjusted.
pub async fn page_bad_request(req: Request, err: HttpError) -> Result<Response, Error> {
    let page = req.render_template("bad_request.html", context! { description => err.description() })?;
    let mut response = (StatusCode::BAD_REQUEST, page).into_response();
    response.insert_header("X-Something", "A Value");
    Ok(response)
}
