//! Remembering a user between requests with the session.

use crate::{Error, Method, Request, Response, escape, redirect};

const USERNAME: &str = "username";

pub async fn top(req: Request) -> Result<String, Error> {
    match req.session().get::<String>(USERNAME) {
        Some(username) => {
            let logout = req.url_for("logout1", &[])?;
            Ok(format!(
                r#"
        <p>Logged in as {}</p>
        <p><a href="{logout}">logout</a></p>
        "#,
                escape(&username)
            ))
        }
        None => {
            let login = req.url_for("login1", &[])?;
            Ok(format!(
                r#"
        <p>You are not logged in</p>
        <p><a href="{login}">login</a></p>
        "#
            ))
        }
    }
}

/// POST stores the submitted name in the session and goes back to `top`.
pub async fn login1(req: Request) -> Result<Response, Error> {
    if req.method() == Method::Post {
        let form = req.form().await?;
        req.session().insert(USERNAME, form.require(USERNAME)?)?;
        return Ok(redirect(&req.url_for("top", &[])?));
    }
    Ok(Response::html(
        r#"
        <form method="POST" >
            <input type="text" name="username">
            <input type="submit" value="login">
        </form>
        "#,
    ))
}

pub async fn logout1(req: Request) -> Result<Response, Error> {
    req.session().remove(USERNAME);
    Ok(redirect(&req.url_for("top", &[])?))
}
