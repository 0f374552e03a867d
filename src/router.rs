//! Radix-tree request router and the endpoint map used to build URLs.
//!
//! One `matchit` tree of rule patterns. Each tree slot holds every route
//! whose rule produced that pattern, tried in registration order: converters
//! decide whether a route matches, methods decide whether it serves.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::rule::Rule;

struct Route {
    rule: Rule,
    methods: Vec<Method>,
    handler: BoxedHandler,
}

impl Route {
    fn accepts(&self, method: Method) -> bool {
        self.methods.contains(&method)
            || (method == Method::Head && self.methods.contains(&Method::Get))
    }
}

/// What the router decided for one request.
pub(crate) enum Lookup {
    Found {
        handler: BoxedHandler,
        params: HashMap<String, String>,
    },
    /// The rule only exists with a trailing slash; the location carries it.
    Redirect(String),
    /// Automatic `OPTIONS` answer.
    Options(Vec<Method>),
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

/// The application router.
///
/// Every registration names an *endpoint*; [`UrlMap::build`] turns an
/// endpoint name and values back into a URL. Registration panics on a
/// malformed rule, since routes are fixed at startup.
pub struct Router {
    tree: MatchitRouter<usize>,
    slots: Vec<Vec<Route>>,
    patterns: HashMap<String, usize>,
    urls: UrlMap,
}

impl Router {
    pub fn new() -> Self {
        Self {
            tree: MatchitRouter::new(),
            slots: Vec::new(),
            patterns: HashMap::new(),
            urls: UrlMap::default(),
        }
    }

    /// Register a handler for a rule and a set of methods.
    ///
    /// ```rust,no_run
    /// # use flagon::{Method, Request, Router};
    /// # async fn signin(_: Request) -> &'static str { "" }
    /// # async fn show_post(_: Request) -> &'static str { "" }
    /// Router::new()
    ///     .on(&[Method::Get, Method::Post], "/signin", "signin", signin)
    ///     .get("/post/<int:post_id>", "show_post", show_post);
    /// ```
    pub fn on(self, methods: &[Method], rule: &str, endpoint: &str, handler: impl Handler) -> Self {
        self.add(methods, rule, endpoint, handler.into_boxed_handler())
    }

    pub fn get(self, rule: &str, endpoint: &str, handler: impl Handler) -> Self {
        self.on(&[Method::Get], rule, endpoint, handler)
    }

    pub fn post(self, rule: &str, endpoint: &str, handler: impl Handler) -> Self {
        self.on(&[Method::Post], rule, endpoint, handler)
    }

    fn add(mut self, methods: &[Method], rule: &str, endpoint: &str, handler: BoxedHandler) -> Self {
        let parsed = Rule::parse(rule).unwrap_or_else(|e| panic!("invalid route `{rule}`: {e}"));
        let pattern = parsed.pattern();

        let slot = match self.patterns.get(&pattern) {
            Some(&slot) => slot,
            None => {
                let slot = self.slots.len();
                self.tree
                    .insert(pattern.clone(), slot)
                    .unwrap_or_else(|e| panic!("invalid route `{rule}`: {e}"));
                self.patterns.insert(pattern, slot);
                self.slots.push(Vec::new());
                slot
            }
        };

        let shadowed = self.slots[slot].iter().any(|route| {
            route.rule.source() == rule && methods.iter().any(|m| route.methods.contains(m))
        });
        if shadowed {
            debug!(rule, endpoint, "rule already served by an earlier endpoint");
        }

        self.urls.insert(endpoint, parsed.clone());
        self.slots[slot].push(Route { rule: parsed, methods: methods.to_vec(), handler });
        self
    }

    /// Endpoint names and their rules.
    pub fn urls(&self) -> &UrlMap {
        &self.urls
    }

    pub(crate) fn lookup(&self, method: Method, path: &str) -> Lookup {
        let direct = self.candidates(path);

        if !path.ends_with('/') {
            let slashed = format!("{path}/");
            let best = self
                .candidates(&slashed)
                .iter()
                .filter(|(route, _)| route.rule.has_trailing_slash())
                .map(|(route, _)| route.rule.static_weight())
                .max();
            if let Some(weight) = best {
                let kept = direct
                    .iter()
                    .any(|(route, _)| route.rule.is_static() || route.rule.static_weight() >= weight);
                if !kept {
                    return Lookup::Redirect(slashed);
                }
            }
        }

        if direct.is_empty() {
            return Lookup::NotFound;
        }

        if let Some((route, params)) = direct.iter().find(|(route, _)| route.accepts(method)) {
            return Lookup::Found { handler: Arc::clone(&route.handler), params: params.clone() };
        }

        let mut allowed: Vec<Method> =
            direct.iter().flat_map(|(route, _)| route.methods.iter().copied()).collect();
        if allowed.contains(&Method::Get) {
            allowed.push(Method::Head);
        }
        allowed.push(Method::Options);
        allowed.sort();
        allowed.dedup();

        if method == Method::Options {
            Lookup::Options(allowed)
        } else {
            Lookup::MethodNotAllowed(allowed)
        }
    }

    fn candidates(&self, path: &str) -> Vec<(&Route, HashMap<String, String>)> {
        let Ok(matched) = self.tree.at(path) else {
            return Vec::new();
        };
        let Some(slot) = self.slots.get(*matched.value) else {
            return Vec::new();
        };
        slot.iter()
            .filter_map(|route| route.rule.bind(&matched.params).map(|params| (route, params)))
            .collect()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Endpoint name → rules, for building URLs.
#[derive(Clone, Debug, Default)]
pub struct UrlMap {
    rules: HashMap<String, Vec<Rule>>,
}

impl UrlMap {
    fn insert(&mut self, endpoint: &str, rule: Rule) {
        self.rules.entry(endpoint.to_owned()).or_default().push(rule);
    }

    pub fn contains(&self, endpoint: &str) -> bool {
        self.rules.contains_key(endpoint)
    }

    /// Builds the URL for `endpoint`.
    ///
    /// When an endpoint has several rules, the one with the most placeholders
    /// that can be filled from `values` wins; leftover values become the
    /// query string.
    pub fn build(&self, endpoint: &str, values: &[(&str, &str)]) -> Result<String, Error> {
        let rules = self.rules.get(endpoint).ok_or_else(|| Error::Build {
            endpoint: endpoint.to_owned(),
            reason: "no such endpoint".to_owned(),
        })?;

        let mut candidates: Vec<&Rule> = rules.iter().collect();
        candidates.sort_by_key(|rule| Reverse(rule.arity()));

        let rule = candidates
            .iter()
            .copied()
            .find(|rule| rule.can_build(values))
            .or_else(|| candidates.last().copied())
            .ok_or_else(|| Error::Build {
                endpoint: endpoint.to_owned(),
                reason: "no rules".to_owned(),
            })?;
        rule.build(endpoint, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;

    async fn ok(_req: Request) -> &'static str {
        "ok"
    }

    fn router() -> Router {
        Router::new()
            .get("/", "hello_world", ok)
            .get("/<name>", "hello", ok)
            .get("/post/<int:post_id>", "show_post", ok)
            .get("/projects/", "projects", ok)
            .get("/about", "about", ok)
            .get("/", "index", ok)
            .on(&[Method::Get, Method::Post], "/signin", "signin", ok)
            .get("/sample_tpl/", "sample_tpl", ok)
            .get("/sample_tpl/<name>", "sample_tpl", ok)
    }

    fn is_found(lookup: &Lookup) -> bool {
        matches!(lookup, Lookup::Found { .. })
    }

    #[test]
    fn static_routes_win_over_variables() {
        let router = router();
        match router.lookup(Method::Get, "/about") {
            Lookup::Found { params, .. } => assert!(params.is_empty()),
            _ => panic!("expected /about to match"),
        }
        match router.lookup(Method::Get, "/mido") {
            Lookup::Found { params, .. } => assert_eq!(params["name"], "mido"),
            _ => panic!("expected /mido to match"),
        }
    }

    #[test]
    fn trailing_slash_conventions() {
        let router = router();
        assert!(matches!(router.lookup(Method::Get, "/projects"), Lookup::Redirect(l) if l == "/projects/"));
        assert!(is_found(&router.lookup(Method::Get, "/projects/")));
        assert!(matches!(router.lookup(Method::Get, "/about/"), Lookup::NotFound));
    }

    #[test]
    fn converters_reject_bad_values() {
        let router = router();
        match router.lookup(Method::Get, "/post/42") {
            Lookup::Found { params, .. } => assert_eq!(params["post_id"], "42"),
            _ => panic!("expected /post/42 to match"),
        }
        assert!(matches!(router.lookup(Method::Get, "/post/abc"), Lookup::NotFound));
    }

    #[test]
    fn method_dispatch() {
        let router = router();
        assert!(is_found(&router.lookup(Method::Post, "/signin")));
        assert!(is_found(&router.lookup(Method::Head, "/about")));
        match router.lookup(Method::Delete, "/about") {
            Lookup::MethodNotAllowed(allowed) => {
                assert_eq!(allowed, vec![Method::Get, Method::Head, Method::Options]);
            }
            _ => panic!("expected 405"),
        }
        assert!(matches!(router.lookup(Method::Options, "/signin"), Lookup::Options(_)));
    }

    #[test]
    fn builds_urls_for_every_endpoint_name() {
        let router = router();
        let urls = router.urls();
        assert_eq!(urls.build("index", &[]).unwrap(), "/");
        assert_eq!(urls.build("hello_world", &[]).unwrap(), "/");
        assert_eq!(urls.build("show_post", &[("post_id", "7")]).unwrap(), "/post/7");
        assert_eq!(urls.build("sample_tpl", &[]).unwrap(), "/sample_tpl/");
        assert_eq!(urls.build("sample_tpl", &[("name", "mido")]).unwrap(), "/sample_tpl/mido");
        assert!(matches!(urls.build("nope", &[]), Err(Error::Build { .. })));
    }

    #[test]
    fn post_only_routes() {
        let router = Router::new().post("/login1", "login1", ok);
        assert!(is_found(&router.lookup(Method::Post, "/login1")));
        match router.lookup(Method::Get, "/login1") {
            Lookup::MethodNotAllowed(allowed) => {
                assert_eq!(allowed, vec![Method::Options, Method::Post]);
            }
            _ => panic!("expected 405"),
        }
    }

    #[test]
    fn url_map_knows_registered_endpoints() {
        let router = router();
        assert!(router.urls().contains("index"));
        assert!(router.urls().contains("sample_tpl"));
        assert!(!router.urls().contains("logout1"));
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn malformed_rule_panics() {
        let _ = Router::new().get("no-slash", "broken", ok);
    }
}
