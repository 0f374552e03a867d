//! Rendering templates from the template folder.

use crate::{Error, Html, Request, context};

/// Served at both `/sample_tpl/` and `/sample_tpl/<name>`.
pub async fn sample_tpl(req: Request) -> Result<Html<String>, Error> {
    let name = req.param("name");
    req.render_template("sample_tpl.html", context! { name })
}
