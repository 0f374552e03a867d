//! One endpoint, two methods.

use crate::{Error, Method, Request};

/// GET shows a form that POSTs back to the same endpoint.
pub async fn signin(req: Request) -> Result<String, Error> {
    if req.method() == Method::Post {
        return Ok("do the signin".to_owned());
    }
    let action = req.url_for("signin", &[])?;
    Ok(format!(
        r#"<form action="{action}" method="POST" ><input type="submit" value="signin"></form>"#
    ))
}
