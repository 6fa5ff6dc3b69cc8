//! Runner template rendering.
//!
//! A runner template is a JavaScript file with substitution markers. Each
//! marker is replaced at its first occurrence only, and markers absent from a
//! template are simply not applied.

use std::fmt::Write as _;

/// Raw program source.
pub const SOURCE_MARKER: &str = "#{source}";

/// Source with non-ASCII code points written as `\uXXXX` escapes.
pub const ENCODED_SOURCE_MARKER: &str = "#{encoded_source}";

/// Encoded source wrapped in an IIFE, as a JSON string literal.
pub const ESCAPED_SOURCE_MARKER: &str = "#{escaped_source}";

/// Bundled JSON polyfill for engines without a global `JSON`.
pub const JSON2_MARKER: &str = "#{json2_source}";

/// JSON encode/decode polyfill.
pub const JSON2_SOURCE: &str = include_str!("../support/json2.js");

/// A runner template ready to be filled in.
#[derive(Debug, Clone, Copy)]
pub struct Template<'a> {
    text: &'a str,
}

/// Output of [`Template::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    /// Script text to hand to the interpreter.
    pub script: String,
    /// Number of template lines that precede the first line of the program,
    /// used to map interpreter line numbers back to the submitted source.
    pub line_offset: usize,
}

impl<'a> Template<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Whether the template contains `marker`.
    #[must_use]
    pub fn has_marker(&self, marker: &str) -> bool {
        self.text.contains(marker)
    }

    /// Substitute `source` into the template.
    ///
    /// Markers are located in the template before any substitution, so marker
    /// text that happens to appear inside `source` is left alone.
    #[must_use]
    pub fn render(&self, source: &str) -> Assembled {
        let mut found: Vec<(usize, &'static str)> = [
            SOURCE_MARKER,
            ENCODED_SOURCE_MARKER,
            ESCAPED_SOURCE_MARKER,
            JSON2_MARKER,
        ]
        .into_iter()
        .filter_map(|marker| self.text.find(marker).map(|pos| (pos, marker)))
        .collect();
        found.sort_by_key(|(pos, _)| *pos);

        let mut line_offset = None;
        let mut script = String::with_capacity(self.text.len() + source.len() * 2);
        let mut cursor = 0;
        for (pos, marker) in found {
            script.push_str(&self.text[cursor..pos]);
            if line_offset.is_none()
                && (marker == SOURCE_MARKER || marker == ENCODED_SOURCE_MARKER)
            {
                line_offset = Some(script.matches('\n').count());
            }
            match marker {
                SOURCE_MARKER => script.push_str(source),
                ENCODED_SOURCE_MARKER => script.push_str(&encode_unicode_codepoints(source)),
                ESCAPED_SOURCE_MARKER => script.push_str(&escaped_source(source)),
                _ => script.push_str(JSON2_SOURCE),
            }
            cursor = pos + marker.len();
        }
        script.push_str(&self.text[cursor..]);

        Assembled {
            script,
            line_offset: line_offset.unwrap_or(0),
        }
    }
}

/// Replace every code point above ASCII with a JavaScript `\uXXXX` escape.
///
/// Code points outside the Basic Multilingual Plane become a surrogate pair.
#[must_use]
pub fn encode_unicode_codepoints(source: &str) -> String {
    if source.is_ascii() {
        return source.to_string();
    }

    let mut out = String::with_capacity(source.len() + 16);
    for ch in source.chars() {
        if ch.is_ascii() {
            out.push(ch);
        } else {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                let _ = write!(out, "\\u{unit:04x}");
            }
        }
    }
    out
}

/// Wrap the encoded source in an IIFE and quote it as a JSON string.
#[must_use]
pub fn escaped_source(source: &str) -> String {
    let encoded = encode_unicode_codepoints(source);
    execjs_proto::quote(&format!("(function(){{ {encoded} }})()"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_unicode_codepoints() {
        assert_eq!(encode_unicode_codepoints("plain"), "plain");
        assert_eq!(encode_unicode_codepoints("café"), "caf\\u00e9");
        assert_eq!(encode_unicode_codepoints("☃"), "\\u2603");
        assert_eq!(encode_unicode_codepoints("😀"), "\\ud83d\\ude00");
    }

    #[test]
    fn test_escaped_source() {
        assert_eq!(
            escaped_source("return \"é\""),
            r#""(function(){ return \"\\u00e9\" })()""#
        );
    }

    #[test]
    fn test_render_raw_source_and_offset() {
        let template = Template::new("(function() {\n#{source}\n})();");
        let out = template.render("return 1;");
        assert_eq!(out.script, "(function() {\nreturn 1;\n})();");
        assert_eq!(out.line_offset, 1);
    }

    #[test]
    fn test_render_only_present_markers() {
        let template = Template::new("eval(#{escaped_source});");
        assert!(!template.has_marker(SOURCE_MARKER));
        let out = template.render("1");
        assert_eq!(out.script, r#"eval("(function(){ 1 })()");"#);
        assert_eq!(out.line_offset, 0);
    }

    #[test]
    fn test_render_all_markers() {
        let template =
            Template::new("#{json2_source}\n//#{encoded_source}\n#{source}\nx(#{escaped_source})");
        let out = template.render("'ü'");
        assert!(out.script.starts_with(JSON2_SOURCE));
        assert!(out.script.contains("//'\\u00fc'\n'ü'\n"));
        assert!(out.script.ends_with(r#"x("(function(){ '\\u00fc' })()")"#));
        assert_eq!(out.line_offset, JSON2_SOURCE.matches('\n').count() + 1);
    }

    #[test]
    fn test_render_first_occurrence_only() {
        let template = Template::new("#{source}|#{source}");
        assert_eq!(template.render("a").script, "a|#{source}");
    }

    #[test]
    fn test_render_ignores_markers_inside_source() {
        let template = Template::new("#{source};#{encoded_source}");
        let out = template.render("'#{encoded_source}'");
        assert_eq!(out.script, "'#{encoded_source}';'#{encoded_source}'");
    }

    #[test]
    fn test_json2_polyfill_defines_json() {
        assert!(JSON2_SOURCE.contains("JSON.stringify"));
        assert!(JSON2_SOURCE.contains("JSON.parse"));
    }
}
