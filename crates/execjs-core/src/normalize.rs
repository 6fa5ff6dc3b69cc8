//! Turning engine failures into [`Error::Syntax`] / [`Error::Program`].
//!
//! There are three entry points, one per way a failure can reach us:
//! - [`structured`]: a runner caught the exception and printed an `err` envelope
//! - [`raw_output`]: the interpreter crashed or printed something that is not
//!   an envelope
//! - [`engine_error`]: an embedded engine raised a native exception
//!
//! All three map reported line numbers back onto the submitted source and
//! render frames with [`trace_line`].

use crate::embedded::EngineError;
use crate::error::Error;
use crate::family::{EngineFamily, TraceRule};
use crate::trace::{trace_line, Frame, DEFAULT_LABEL};
use execjs_proto::Trace;
use regex_lite::{Captures, Regex};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};

/// Where the failing code came from.
#[derive(Debug, Clone, Copy)]
pub struct Origin<'a> {
    /// Source as submitted by the caller (prelude included), not the runner
    /// script.
    pub source: &'a str,
    /// Lines that precede the source in the executed script.
    pub line_offset: usize,
    /// Expression the runner handed to `eval`, for frames positioned inside it.
    pub eval_source: Option<&'a str>,
    /// File name of the executed script, used to drop frames from other files.
    pub script: Option<&'a str>,
    pub label: &'a str,
}

impl<'a> Origin<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            line_offset: 0,
            eval_source: None,
            script: None,
            label: DEFAULT_LABEL,
        }
    }

    #[must_use]
    pub fn with_line_offset(mut self, line_offset: usize) -> Self {
        self.line_offset = line_offset;
        self
    }

    #[must_use]
    pub fn with_eval_source(mut self, eval_source: &'a str) -> Self {
        self.eval_source = Some(eval_source);
        self
    }

    #[must_use]
    pub fn with_script(mut self, script: &'a str) -> Self {
        self.script = Some(script);
        self
    }

    /// Frame for a reported position, clamped onto the source.
    fn frame(&self, line: usize, column: usize) -> Frame {
        let line = line.saturating_sub(self.line_offset);
        trace_line(self.source, line, column, self.label)
    }

    /// Frame for a stack line, or `None` when it points into the runner.
    fn script_frame(&self, line: usize, column: usize) -> Option<Frame> {
        let line = line.checked_sub(self.line_offset)?;
        within(self.source, line)?;
        Some(trace_line(self.source, line, column, self.label))
    }

    /// Frame for a position inside the evaluated `(<expression>\n)`.
    fn eval_frame(&self, line: usize, column: usize) -> Option<Frame> {
        let source = self.eval_source?;
        within(source, line)?;
        // the opening paren shifts the first line by one column
        let column = if line == 1 { column.saturating_sub(1) } else { column };
        Some(trace_line(source, line, column, self.label))
    }
}

fn within(source: &str, line: usize) -> Option<()> {
    (line >= 1 && line <= source.lines().count()).then_some(())
}

type RegexCache = Mutex<HashMap<&'static str, Option<Regex>>>;

fn regex_cache() -> &'static RegexCache {
    static CACHE: OnceLock<RegexCache> = OnceLock::new();
    CACHE.get_or_init(Mutex::default)
}

/// Compiled form of a family pattern, built once per process.
fn regex(pattern: &'static str) -> Option<Regex> {
    let mut cache = regex_cache().lock().unwrap_or_else(PoisonError::into_inner);
    cache
        .entry(pattern)
        .or_insert_with(|| Regex::new(pattern).ok())
        .clone()
}

fn position(caps: &Captures<'_>) -> Option<(usize, usize)> {
    let line = caps.name("line")?.as_str().parse().ok()?;
    let column = caps
        .name("column")
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    Some((line, column))
}

/// Normalize an `err` envelope.
#[must_use]
pub fn structured(
    family: &EngineFamily,
    message: &str,
    trace: Option<&Trace>,
    origin: Origin<'_>,
) -> Error {
    let frames = match (trace, family.trace) {
        (Some(trace), Some(rule)) => frames_from_stack(&rule, &trace.lines(), origin),
        _ => Vec::new(),
    };
    classify(family, &cleanup(family, message), frames)
}

/// Normalize output that did not decode as an envelope.
///
/// The first crash pattern that matches supplies the message and position.
/// Without a match the whole output is the message.
#[must_use]
pub fn raw_output(family: &EngineFamily, output: &str, origin: Origin<'_>) -> Error {
    let output = output.trim_end();
    if let Some((message, frames)) = match_crash(family, output, origin) {
        return classify(family, &cleanup(family, &message), frames);
    }
    classify(family, &cleanup(family, output), Vec::new())
}

/// Normalize an exception raised by an embedded engine.
#[must_use]
pub fn engine_error(family: &EngineFamily, err: &EngineError, origin: Origin<'_>) -> Error {
    let mut message = err.message.clone();
    let mut frames = match (&err.stack, family.trace) {
        (Some(stack), Some(rule)) => {
            let lines: Vec<&str> = stack.lines().collect();
            frames_from_stack(&rule, &lines, origin)
        }
        _ => Vec::new(),
    };

    if frames.is_empty() {
        if let Some(line) = err.line {
            frames.push(origin.frame(line, err.column.unwrap_or(0)));
        } else if let Some((matched, found)) = match_crash(family, &message, origin) {
            message = matched;
            frames = found;
        }
    }

    let message = cleanup(family, &message);
    if err.name.as_deref() == Some("SyntaxError") {
        return Error::syntax(message, frames);
    }
    classify(family, &message, frames)
}

/// Frames of an engine-native stack. Lines that map into the runner rather
/// than the submitted source are dropped.
fn frames_from_stack(rule: &TraceRule, lines: &[&str], origin: Origin<'_>) -> Vec<Frame> {
    let Some(pattern) = regex(rule.frame_pattern) else {
        return Vec::new();
    };
    let eval_pattern = rule.eval_frame_pattern.and_then(regex);

    let end = lines.len().saturating_sub(rule.footer_lines);
    let start = rule.header_lines.min(end);

    let mut frames: Vec<Frame> = lines[start..end]
        .iter()
        .map(|line| line.trim())
        .filter(|line| match (rule.script_frames_only, origin.script) {
            (true, Some(script)) => line.contains(script),
            _ => true,
        })
        .filter_map(|line| {
            if let Some(caps) = eval_pattern.as_ref().and_then(|re| re.captures(line)) {
                let (line, column) = position(&caps)?;
                return origin.eval_frame(line, column);
            }
            let (line, column) = position(&pattern.captures(line)?)?;
            origin.script_frame(line, column)
        })
        .collect();

    if rule.reverse {
        frames.reverse();
    }
    frames
}

fn match_crash(
    family: &EngineFamily,
    text: &str,
    origin: Origin<'_>,
) -> Option<(String, Vec<Frame>)> {
    family.crash_patterns.iter().find_map(|&pattern| {
        let caps = regex(pattern)?.captures(text)?;
        let message = caps
            .name("message")
            .map_or_else(|| text.to_string(), |m| m.as_str().trim().to_string());
        let frames = position(&caps)
            .map(|(line, column)| vec![origin.frame(line, column)])
            .unwrap_or_default();
        Some((message, frames))
    })
}

fn cleanup(family: &EngineFamily, message: &str) -> String {
    family
        .message_cleanup
        .and_then(|cleanup| {
            regex(cleanup.pattern)
                .map(|re| re.replace(message, cleanup.replacement).into_owned())
        })
        .unwrap_or_else(|| message.to_string())
}

fn is_syntax(family: &EngineFamily, message: &str) -> bool {
    regex(family.syntax_signature).is_some_and(|re| re.is_match(message))
}

fn classify(family: &EngineFamily, message: &str, frames: Vec<Frame>) -> Error {
    if is_syntax(family, message) {
        Error::syntax(message, frames)
    } else {
        Error::program(message, frames)
    }
}
