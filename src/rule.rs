//! URL rules.
//!
//! A rule is a path with typed placeholders: `/post/<int:post_id>`,
//! `/path/<path:subpath>`, `/user/<username>`. Matching is `matchit`'s job;
//! a rule only knows how to turn itself into a `matchit` pattern, how to
//! validate the raw values `matchit` captured, and how to build a URL back
//! from values.

use std::collections::HashMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use thiserror::Error;

use crate::error::Error;

/// Characters left alone when a value is written into a path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'@');

/// How a placeholder's text is accepted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Converter {
    /// Any non-empty text without a slash. The default.
    String,
    /// A non-negative integer written with ASCII digits.
    Int,
    /// Any non-empty text, slashes included. Must end the rule.
    Path,
}

impl Converter {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" | "default" => Some(Self::String),
            "int" => Some(Self::Int),
            "path" => Some(Self::Path),
            _ => None,
        }
    }

    fn accepts(self, value: &str) -> bool {
        match self {
            Self::String => !value.is_empty() && !value.contains('/'),
            Self::Int => !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()),
            Self::Path => !value.is_empty(),
        }
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum RuleError {
    #[error("rule must start with `/`")]
    Relative,
    #[error("unterminated placeholder")]
    Unterminated,
    #[error("placeholder without a name")]
    EmptyName,
    #[error("unknown converter `{0}`")]
    UnknownConverter(String),
    #[error("placeholder `{0}` must span a whole path segment")]
    PartialSegment(String),
    #[error("path placeholder `{0}` must end the rule")]
    PathNotLast(String),
    #[error("placeholder `{0}` appears twice")]
    Duplicate(String),
}

#[derive(Clone, Debug)]
enum Part {
    Literal(String),
    Variable { name: String, converter: Converter },
}

/// A parsed URL rule.
#[derive(Clone, Debug)]
pub struct Rule {
    source: String,
    parts: Vec<Part>,
}

impl Rule {
    pub fn parse(source: &str) -> Result<Self, RuleError> {
        if !source.starts_with('/') {
            return Err(RuleError::Relative);
        }

        let mut parts = Vec::new();
        let mut seen: Vec<&str> = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find('<') {
            let (literal, tail) = rest.split_at(start);
            let end = tail.find('>').ok_or(RuleError::Unterminated)?;
            let spec = &tail[1..end];

            let (converter, name) = match spec.split_once(':') {
                Some((converter, name)) => {
                    let converter = converter.trim();
                    let converter = Converter::from_name(converter)
                        .ok_or_else(|| RuleError::UnknownConverter(converter.to_owned()))?;
                    (converter, name.trim())
                }
                None => (Converter::String, spec.trim()),
            };
            if name.is_empty() {
                return Err(RuleError::EmptyName);
            }

            rest = &tail[end + 1..];
            if !literal.ends_with('/') || !(rest.is_empty() || rest.starts_with('/')) {
                return Err(RuleError::PartialSegment(name.to_owned()));
            }
            if converter == Converter::Path && !rest.is_empty() {
                return Err(RuleError::PathNotLast(name.to_owned()));
            }
            if seen.contains(&name) {
                return Err(RuleError::Duplicate(name.to_owned()));
            }
            seen.push(name);

            parts.push(Part::Literal(literal.to_owned()));
            parts.push(Part::Variable { name: name.to_owned(), converter });
        }
        if !rest.is_empty() {
            parts.push(Part::Literal(rest.to_owned()));
        }

        Ok(Self { source: source.to_owned(), parts })
    }

    /// The rule as it was written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Placeholder names and converters, in order.
    pub fn variables(&self) -> impl Iterator<Item = (&str, Converter)> {
        self.parts.iter().filter_map(|part| match part {
            Part::Variable { name, converter } => Some((name.as_str(), *converter)),
            Part::Literal(_) => None,
        })
    }

    pub fn arity(&self) -> usize {
        self.variables().count()
    }

    pub fn is_static(&self) -> bool {
        self.arity() == 0
    }

    pub fn has_trailing_slash(&self) -> bool {
        self.source.ends_with('/')
    }

    /// Number of literal characters; more literal rules are more specific.
    pub fn static_weight(&self) -> usize {
        self.parts
            .iter()
            .map(|part| match part {
                Part::Literal(text) => text.len(),
                Part::Variable { .. } => 0,
            })
            .sum()
    }

    /// The `matchit` pattern. Placeholders are named by position (`p0`,
    /// `p1`, ...) so rules that differ only in names share a tree slot.
    pub(crate) fn pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.source.len());
        let mut index = 0;
        for part in &self.parts {
            match part {
                Part::Literal(text) => {
                    for ch in text.chars() {
                        match ch {
                            '{' => pattern.push_str("{{"),
                            '}' => pattern.push_str("}}"),
                            ch => pattern.push(ch),
                        }
                    }
                }
                Part::Variable { converter: Converter::Path, .. } => {
                    pattern.push_str(&format!("{{*p{index}}}"));
                    index += 1;
                }
                Part::Variable { .. } => {
                    pattern.push_str(&format!("{{p{index}}}"));
                    index += 1;
                }
            }
        }
        pattern
    }

    /// Decodes and validates the values captured for this rule's pattern.
    /// `None` means the converters reject the path.
    pub(crate) fn bind(&self, raw: &matchit::Params<'_, '_>) -> Option<HashMap<String, String>> {
        let mut params = HashMap::new();
        for (index, (name, converter)) in self.variables().enumerate() {
            let captured = raw.get(format!("p{index}"))?;
            let value = percent_decode_str(captured).decode_utf8_lossy().into_owned();
            if !converter.accepts(&value) {
                return None;
            }
            params.insert(name.to_owned(), value);
        }
        Some(params)
    }

    /// True when every placeholder has a value.
    pub fn can_build(&self, values: &[(&str, &str)]) -> bool {
        self.variables().all(|(name, _)| values.iter().any(|(key, _)| *key == name))
    }

    /// Builds a URL. Values without a placeholder become the query string.
    pub fn build(&self, endpoint: &str, values: &[(&str, &str)]) -> Result<String, Error> {
        let build_error = |reason: String| Error::Build { endpoint: endpoint.to_owned(), reason };

        let mut url = String::new();
        let mut used = vec![false; values.len()];

        for part in &self.parts {
            match part {
                Part::Literal(text) => url.push_str(text),
                Part::Variable { name, converter } => {
                    let index = values
                        .iter()
                        .position(|(key, _)| key == name)
                        .ok_or_else(|| build_error(format!("missing value for `{name}`")))?;
                    used[index] = true;

                    let value = values[index].1;
                    if !converter.accepts(value) {
                        return Err(build_error(format!("`{value}` is not a valid `{name}`")));
                    }
                    match converter {
                        Converter::Path => {
                            let segments: Vec<String> = value
                                .split('/')
                                .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
                                .collect();
                            url.push_str(&segments.join("/"));
                        }
                        _ => url.extend(utf8_percent_encode(value, SEGMENT)),
                    }
                }
            }
        }

        let extra: Vec<(&str, &str)> = values
            .iter()
            .zip(&used)
            .filter(|(_, used)| !**used)
            .map(|(pair, _)| *pair)
            .collect();
        if !extra.is_empty() {
            url.push('?');
            url.push_str(&form_urlencoded::Serializer::new(String::new()).extend_pairs(extra).finish());
        }

        Ok(url)
    }
}
