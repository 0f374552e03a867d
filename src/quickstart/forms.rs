//! Reading submitted forms and uploaded files.

use tracing::info;

use crate::{Error, Html, IntoResponse, Method, Request, Response, context, escape, secure_filename};

/// Accepts any password, as long as the user is `mido`.
pub fn valid_login(username: &str, _password: &str) -> bool {
    username == "mido"
}

/// POST with good credentials echoes them back. Anything else shows the
/// login form, with an error after a failed attempt. Missing fields are a
/// `400 Bad Request`.
pub async fn login_1(req: Request) -> Result<Response, Error> {
    let mut error = None;
    if req.method() == Method::Post {
        let form = req.form().await?;
        let username = form.require("username")?;
        let password = form.require("password")?;
        if valid_login(username, password) {
            return Ok(Html(format!(
                "<p>username: {}</p><p>password: {}</p>",
                escape(username),
                escape(password)
            ))
            .into_response());
        }
        error = Some("Invalid username/password");
    }
    Ok(req.render_template("login.html", context! { error })?.into_response())
}

/// POST stores the file from the `the_file` input at the configured upload
/// path.
pub async fn upload_file(req: Request) -> Result<String, Error> {
    if req.method() == Method::Post {
        let form = req.form().await?;
        let file = form.require_file("the_file")?;
        let destination = &req.config().upload_path;
        file.save(destination).await?;

        let filename = secure_filename(file.filename().unwrap_or_default());
        info!(filename = %filename, destination = %destination.display(), size = file.data().len(), "upload saved");
        return Ok(format!("{filename} upload success !!"));
    }

    let action = req.url_for("upload_file", &[])?;
    Ok(format!(
        r#"
<form method="POST" enctype="multipart/form-data" action="{action}">
    <input type="file" name="the_file">
    <input type="submit" value="upload">
</form>
"#
    ))
}
