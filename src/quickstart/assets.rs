//! Linking static files through the `static` endpoint.

use crate::{Error, Request};

pub async fn load_static_file(req: Request) -> Result<String, Error> {
    let stylesheet = req.url_for("static", &[("filename", "style.css")])?;
    Ok(format!(
        r#"
<html><body>
  <link rel="stylesheet" href="{stylesheet}">
  <p>hello</p>
</body></html>
"#
    ))
}
