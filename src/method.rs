//! Request methods a route can be registered for.
//!
//! Anything outside RFC 9110 is refused by [`App::handle`](crate::App::handle)
//! with `405 Method Not Allowed` before routing.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A routable HTTP method. Ordered alphabetically, which is the order used in
/// `Allow` headers.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Method {
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
}

#[derive(Debug, Error, Eq, PartialEq)]
#[error("unsupported method `{0}`")]
pub struct UnknownMethod(pub String);

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Delete  => "DELETE",
            Self::Get     => "GET",
            Self::Head    => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch   => "PATCH",
            Self::Post    => "POST",
            Self::Put     => "PUT",
            Self::Trace   => "TRACE",
        }
    }

    /// Value of an `Allow` header listing `methods`, sorted and deduplicated.
    pub(crate) fn allow_header(methods: &[Method]) -> String {
        let mut methods = methods.to_vec();
        methods.sort();
        methods.dedup();
        methods.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ")
    }
}

/// Method names are case-sensitive (RFC 9110 §9.1): `"get"` is not `GET`.
impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "CONNECT" => Self::Connect,
            "DELETE"  => Self::Delete,
            "GET"     => Self::Get,
            "HEAD"    => Self::Head,
            "OPTIONS" => Self::Options,
            "PATCH"   => Self::Patch,
            "POST"    => Self::Post,
            "PUT"     => Self::Put,
            "TRACE"   => Self::Trace,
            other     => return Err(UnknownMethod(other.to_owned())),
        })
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = UnknownMethod;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_names() {
        assert_eq!("GET".parse::<Method>(), Ok(Method::Get));
        assert_eq!("POST".parse::<Method>(), Ok(Method::Post));
        assert_eq!("get".parse::<Method>(), Err(UnknownMethod("get".into())));
        assert!("PURGE".parse::<Method>().is_err());
    }

    #[test]
    fn converts_from_http_method() {
        assert_eq!(Method::try_from(&http::Method::OPTIONS), Ok(Method::Options));
        assert_eq!(Method::Head.to_string(), "HEAD");
    }

    #[test]
    fn allow_header_is_sorted_and_unique() {
        let header = Method::allow_header(&[Method::Post, Method::Get, Method::Options, Method::Get]);
        assert_eq!(header, "GET, OPTIONS, POST");
    }
}
