//! HTML escaping for text interpolated into hand-built markup.

/// Escapes `&`, `<`, `>`, `"` and `'` so `text` is safe inside HTML.
///
/// ```rust
/// assert_eq!(flagon::escape("<b>mido</b>"), "&lt;b&gt;mido&lt;/b&gt;");
/// ```
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            ch => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape;

    #[test]
    fn leaves_plain_text_and_slashes() {
        assert_eq!(escape("a/b c"), "a/b c");
    }

    #[test]
    fn escapes_quotes() {
        assert_eq!(escape(r#"'x' & "y""#), "&#39;x&#39; &amp; &#34;y&#34;");
    }
}
