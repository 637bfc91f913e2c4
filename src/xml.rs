use std::borrow::Cow;

/// XML 1.0 permits 0x09, 0x0A, 0x0D, 0x20..=0xD7FF, 0xE000..=0xFFFD and
/// 0x10000..=0x10FFFF; anything else is dropped from embedded text.
fn is_valid_xml_char(c: char) -> bool {
    matches!(
        c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    )
}

fn needs_escape(c: char) -> bool {
    matches!(c, '&' | '<' | '>' | '"' | '\'') || !is_valid_xml_char(c)
}

/// Escape text for use in element content or attribute values.
///
/// Borrows the input untouched when nothing needs replacing.
pub fn escape_xml(text: &str) -> Cow<'_, str> {
    if !text.chars().any(needs_escape) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c if is_valid_xml_char(c) => escaped.push(c),
            _ => {}
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::escape_xml;
    use std::borrow::Cow;

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(escape_xml("octocat"), Cow::Borrowed("octocat")));
    }

    #[test]
    fn escapes_all_reserved_characters() {
        assert_eq!(
            escape_xml(r#"<a href="x&y">'z'</a>"#),
            "&lt;a href=&quot;x&amp;y&quot;&gt;&apos;z&apos;&lt;/a&gt;"
        );
    }

    #[test]
    fn drops_control_characters_but_keeps_newlines() {
        assert_eq!(escape_xml("a\u{0007}b\nc"), "ab\nc");
    }

    #[test]
    fn escaping_twice_never_reintroduces_markup() {
        let once = escape_xml("a&<b");
        let twice = escape_xml(&once);
        assert!(!twice.contains('<'));
        assert_eq!(twice, "a&amp;amp;&amp;lt;b");
    }
}
