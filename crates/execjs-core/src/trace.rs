//! Rendering of normalized stack frames.

use serde::Serialize;
use std::fmt;

/// File label used for frames that point into submitted source.
pub const DEFAULT_LABEL: &str = "<eval>";

/// One normalized stack entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Trimmed text of the source line the frame points at.
    pub code: String,
    pub file: String,
    /// 1-based line as reported (0 when unknown).
    pub line: usize,
    /// 1-based column as reported (0 when unknown).
    pub column: usize,
}

impl Frame {
    #[must_use]
    pub fn new(code: impl Into<String>, file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            code: code.into(),
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "at {} ({}:{}:{})",
            self.code, self.file, self.line, self.column
        )
    }
}

/// Build a frame for `line`/`column` of `source`.
///
/// Out-of-range or zero lines select the first source line; the reported
/// position is kept as given.
#[must_use]
pub fn trace_line(source: &str, line: usize, column: usize, label: &str) -> Frame {
    let lines: Vec<&str> = source.lines().collect();
    let code = if line > 0 && line <= lines.len() {
        lines[line - 1]
    } else {
        lines.first().copied().unwrap_or("")
    }
    .trim();

    Frame::new(code, label, line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "var a = 1;\n  throw new Error('x');  \nvar b;";

    #[test]
    fn test_trace_line_selects_and_trims() {
        let frame = trace_line(SOURCE, 2, 3, DEFAULT_LABEL);
        assert_eq!(frame.code, "throw new Error('x');");
        assert_eq!(frame.to_string(), "at throw new Error('x'); (<eval>:2:3)");
    }

    #[test]
    fn test_trace_line_clamps_to_first_line() {
        assert_eq!(trace_line(SOURCE, 0, 0, DEFAULT_LABEL).code, "var a = 1;");
        assert_eq!(trace_line(SOURCE, 99, 1, DEFAULT_LABEL).code, "var a = 1;");
        assert_eq!(trace_line(SOURCE, 99, 1, DEFAULT_LABEL).line, 99);
    }

    #[test]
    fn test_trace_line_empty_source() {
        let frame = trace_line("", 1, 1, "x.js");
        assert_eq!(frame.to_string(), "at  (x.js:1:1)");
    }
}
