//! Per-engine error heuristics.
//!
//! Every engine reports failures in its own shape. An [`EngineFamily`] is the
//! data describing one shape; [`crate::normalize`] is the single algorithm that
//! consumes it. Patterns use named groups: `line` and optional `column` for
//! frame lines, plus `message` for crash reports.
//!
//! The header/footer counts are empirical. They were measured against the
//! engine versions the bundled runners target and may need adjusting for
//! others, which is why they live here as data.

/// How to read an engine-native stack trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRule {
    /// Leading lines to discard (usually the `Name: message` line).
    pub header_lines: usize,
    /// Trailing lines to discard.
    pub footer_lines: usize,
    /// Pattern applied to each trimmed remaining line.
    pub frame_pattern: &'static str,
    /// Frames inside code run through `eval`, whose positions are relative
    /// to the evaluated string rather than the script. Tried before
    /// `frame_pattern`.
    pub eval_frame_pattern: Option<&'static str>,
    /// Keep only frames that mention the executed script.
    pub script_frames_only: bool,
    /// Report frames in reverse order.
    pub reverse: bool,
}

/// Message rewrite applied before classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cleanup {
    pub pattern: &'static str,
    pub replacement: &'static str,
}

/// Error-reporting quirks of one engine family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineFamily {
    pub name: &'static str,
    pub trace: Option<TraceRule>,
    /// Tried in order against raw interpreter output (or an embedded
    /// engine's message when it carries no position).
    pub crash_patterns: &'static [&'static str],
    /// A message matching this is a syntax failure.
    pub syntax_signature: &'static str,
    pub message_cleanup: Option<Cleanup>,
}

const V8_FRAME: &str = r"^at .*:(?P<line>\d+):(?P<column>\d+)\)?$";
const V8_EVAL_FRAME: &str = r"\(eval at .*, <anonymous>:(?P<line>\d+):(?P<column>\d+)\)?$";
const AT_SIGN_FRAME: &str = r"@.*?:(?P<line>\d+)(?::(?P<column>\d+))?$";

/// Node.js running a generated script file.
pub const NODE: EngineFamily = EngineFamily {
    name: "node",
    trace: Some(TraceRule {
        header_lines: 1,
        footer_lines: 0,
        frame_pattern: V8_FRAME,
        eval_frame_pattern: Some(V8_EVAL_FRAME),
        script_frames_only: true,
        reverse: false,
    }),
    crash_patterns: &[
        r"(?ms)^[^\n]*:(?P<line>\d+)\n.*?^(?P<message>[A-Za-z]*Error\b[^\n]*)$",
        r"(?m)^(?P<message>[A-Za-z]*Error: [^\n]*)$",
    ],
    syntax_signature: r"SyntaxError:",
    message_cleanup: None,
};

/// V8 embedded in-process.
pub const V8: EngineFamily = EngineFamily {
    name: "v8",
    trace: Some(TraceRule {
        header_lines: 1,
        footer_lines: 0,
        frame_pattern: V8_FRAME,
        eval_frame_pattern: Some(V8_EVAL_FRAME),
        script_frames_only: false,
        reverse: false,
    }),
    crash_patterns: &[],
    syntax_signature: r"^SyntaxError\b",
    message_cleanup: Some(Cleanup {
        pattern: r"^Uncaught ",
        replacement: "",
    }),
};

/// JavaScriptCore's `jsc` shell.
pub const JSC: EngineFamily = EngineFamily {
    name: "jsc",
    trace: Some(TraceRule {
        header_lines: 0,
        footer_lines: 0,
        frame_pattern: AT_SIGN_FRAME,
        eval_frame_pattern: None,
        script_frames_only: false,
        reverse: false,
    }),
    crash_patterns: &[r"(?m)^Exception: (?P<message>[^\n]*)$"],
    syntax_signature: r"SyntaxError:",
    message_cleanup: None,
};

/// SpiderMonkey's `js` shell.
pub const SPIDERMONKEY: EngineFamily = EngineFamily {
    name: "spidermonkey",
    trace: Some(TraceRule {
        header_lines: 0,
        footer_lines: 0,
        frame_pattern: AT_SIGN_FRAME,
        eval_frame_pattern: None,
        script_frames_only: false,
        reverse: false,
    }),
    crash_patterns: &[
        r"(?m)^[^\n]*?:(?P<line>\d+):(?:(?P<column>\d+):?)? ?(?P<message>[A-Za-z]*Error: [^\n]*)$",
    ],
    syntax_signature: r"SyntaxError:",
    message_cleanup: None,
};

/// Windows Script Host running JScript.
pub const JSCRIPT: EngineFamily = EngineFamily {
    name: "jscript",
    trace: None,
    crash_patterns: &[
        r"(?m)^.*\((?P<line>\d+), (?P<column>\d+)\).*Microsoft JScript(?: runtime error| compilation error)?: (?P<message>.*)$",
    ],
    syntax_signature: r"(?i)compilation error|syntax ?error",
    message_cleanup: None,
};

/// Rhino, first frame line discarded.
pub const RHINO: EngineFamily = EngineFamily {
    name: "rhino",
    trace: Some(TraceRule {
        header_lines: 1,
        footer_lines: 0,
        frame_pattern: r"at .*:(?P<line>\d+)",
        eval_frame_pattern: None,
        script_frames_only: false,
        reverse: false,
    }),
    crash_patterns: &[],
    syntax_signature: r"^syntax error",
    message_cleanup: Some(Cleanup {
        pattern: r"^Error: ",
        replacement: "",
    }),
};

/// Rhino builds that append a trailing summary line instead of a heading.
pub const RHINO_LEGACY: EngineFamily = EngineFamily {
    name: "rhino-legacy",
    trace: Some(TraceRule {
        header_lines: 0,
        footer_lines: 1,
        frame_pattern: r"at .*:(?P<line>\d+)",
        eval_frame_pattern: None,
        script_frames_only: false,
        reverse: false,
    }),
    ..RHINO
};

/// SpiderMonkey embedded through Johnson, which folds the position into the message.
pub const JOHNSON: EngineFamily = EngineFamily {
    name: "johnson",
    trace: None,
    crash_patterns: &[r"^(?P<message>.*) at .*:(?P<line>\d+)$"],
    syntax_signature: r"^syntax error\b",
    message_cleanup: None,
};

/// Every known family.
pub const ALL: &[&EngineFamily] = &[
    &NODE,
    &V8,
    &JSC,
    &SPIDERMONKEY,
    &JSCRIPT,
    &RHINO,
    &RHINO_LEGACY,
    &JOHNSON,
];

impl EngineFamily {
    /// Look a family up by name.
    #[must_use]
    pub fn by_name(name: &str) -> Option<&'static EngineFamily> {
        ALL.iter().copied().find(|family| family.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex_lite::Regex;

    #[test]
    fn test_all_patterns_compile() {
        for family in ALL {
            if let Some(trace) = family.trace {
                assert!(Regex::new(trace.frame_pattern).is_ok(), "{}", family.name);
                if let Some(pattern) = trace.eval_frame_pattern {
                    assert!(Regex::new(pattern).is_ok(), "{}", family.name);
                }
            }
            for pattern in family.crash_patterns {
                assert!(Regex::new(pattern).is_ok(), "{}: {pattern}", family.name);
            }
            assert!(Regex::new(family.syntax_signature).is_ok(), "{}", family.name);
            if let Some(cleanup) = family.message_cleanup {
                assert!(Regex::new(cleanup.pattern).is_ok(), "{}", family.name);
            }
        }
    }

    #[test]
    fn test_v8_eval_frame_pattern() {
        let eval = Regex::new(V8_EVAL_FRAME).unwrap();
        let caps = eval
            .captures("at eval (eval at <anonymous> (/tmp/execjs1.js:2:8), <anonymous>:3:1)")
            .unwrap();
        assert_eq!((&caps["line"], &caps["column"]), ("3", "1"));
        assert!(!eval.is_match("at f (/tmp/execjs1.js:4:9)"));
    }

    #[test]
    fn test_by_name() {
        assert_eq!(EngineFamily::by_name("node"), Some(&NODE));
        assert_eq!(
            EngineFamily::by_name("rhino-legacy").unwrap().syntax_signature,
            RHINO.syntax_signature
        );
        assert!(EngineFamily::by_name("chakra").is_none());
    }
}
