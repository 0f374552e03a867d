//! Jinja-style templates loaded from the template folder.

use std::path::Path;
use std::sync::Arc;

use minijinja::value::{Kwargs, Value, ValueKind};
use minijinja::{AutoEscape, Environment, ErrorKind, Output, State, escape_formatter, path_loader};
use serde::Serialize;

use crate::error::Error;
use crate::markup::escape;
use crate::router::UrlMap;

/// A template environment. `.html` templates are auto-escaped, and every
/// template can call `url_for(endpoint, **values)`.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new(folder: impl AsRef<Path>, urls: Arc<UrlMap>) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(folder.as_ref().to_path_buf()));

        // Strings are escaped like hand-built markup: slashes stay readable.
        env.set_formatter(|out: &mut Output<'_>, state: &State<'_, '_>, value: &Value| {
            if matches!(state.auto_escape(), AutoEscape::Html)
                && value.kind() == ValueKind::String
                && !value.is_safe()
            {
                if let Some(text) = value.as_str() {
                    out.write_str(&escape(text))?;
                    return Ok(());
                }
            }
            escape_formatter(out, state, value)
        });

        env.add_function("url_for", move |endpoint: String, kwargs: Kwargs| {
            let mut values = Vec::new();
            for key in kwargs.args() {
                let value: Value = kwargs.get(key)?;
                values.push((key, value.to_string()));
            }
            let pairs: Vec<(&str, &str)> =
                values.iter().map(|(key, value)| (*key, value.as_str())).collect();
            urls.build(&endpoint, &pairs)
                .map_err(|err| minijinja::Error::new(ErrorKind::InvalidOperation, err.to_string()))
        });

        Self { env }
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, Error> {
        let template = self.env.get_template(name)?;
        Ok(template.render(ctx)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Router;
    use crate::request::Request;

    async fn ok(_req: Request) -> &'static str {
        "ok"
    }

    fn templates() -> Templates {
        let urls = Router::new().get("/user/<username>", "profile", ok).urls().clone();
        let mut templates = Templates::new("templates", Arc::new(urls));
        templates
            .env
            .add_template(
                "greet.html",
                "<a href=\"{{ url_for('profile', username=name, tab='a&b') }}\">{{ name }}</a>",
            )
            .unwrap();
        templates
    }

    #[test]
    fn renders_with_escaping_and_url_for() {
        let html = templates().render("greet.html", minijinja::context! { name => "<mido>" }).unwrap();
        assert_eq!(html, "<a href=\"/user/%3Cmido%3E?tab=a%26b\">&lt;mido&gt;</a>");
    }

    #[test]
    fn slashes_survive_escaping() {
        let mut templates = templates();
        templates.env.add_template("error.html", "{{ error }}").unwrap();
        let html = templates
            .render("error.html", minijinja::context! { error => "Invalid username/password" })
            .unwrap();
        assert_eq!(html, "Invalid username/password");
    }

    #[test]
    fn missing_template_is_an_error() {
        let result = templates().render("nope.html", minijinja::context! {});
        assert!(matches!(result, Err(Error::Template(_))));
    }
}
