#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Wire format shared by the runner scripts and the host.
//!
//! A runner prints exactly one JSON value on stdout:
//! - `["ok"]` when the program produced `undefined`
//! - `["ok", <value>]` or `["ok", <value>, null]` on success
//! - `["err", "<message>", <trace>]` on failure, where `<trace>` is `null`,
//!   an engine-native stack string, or an array of raw frame strings
//!
//! Empty output is read as `["ok"]`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Error codes for envelope decoding.
pub mod codes {
    pub const ENVELOPE_NOT_JSON: &str = "ENVELOPE_NOT_JSON";
    pub const ENVELOPE_SHAPE_INVALID: &str = "ENVELOPE_SHAPE_INVALID";
    pub const ENVELOPE_STATUS_INVALID: &str = "ENVELOPE_STATUS_INVALID";
}

/// Outcome tag of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Err,
}

impl Status {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Err => "err",
        }
    }
}

/// Raw stack information reported by a runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trace {
    /// Engine-native stack text (`err.stack`), one frame per line.
    Text(String),
    /// Pre-split frame strings.
    Lines(Vec<String>),
}

impl Trace {
    /// Physical lines of the trace, in reported order.
    #[must_use]
    pub fn lines(&self) -> Vec<&str> {
        match self {
            Self::Text(text) => text.lines().collect(),
            Self::Lines(lines) => lines.iter().map(String::as_str).collect(),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Lines(lines) => Value::Array(lines.iter().cloned().map(Value::String).collect()),
        }
    }
}

/// Decoded `[status, value, trace?]` envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub status: Status,
    /// Return value on success, message on failure.
    pub value: Value,
    pub trace: Option<Trace>,
}

impl Envelope {
    /// Successful envelope carrying `value`.
    #[must_use]
    pub fn ok(value: Value) -> Self {
        Self {
            status: Status::Ok,
            value,
            trace: None,
        }
    }

    /// Failed envelope carrying `message`.
    #[must_use]
    pub fn err(message: impl Into<String>, trace: Option<Trace>) -> Self {
        Self {
            status: Status::Err,
            value: Value::String(message.into()),
            trace,
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Failure message. Non-string values are rendered as JSON.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Serialize in the same shape a runner prints.
    #[must_use]
    pub fn to_json(&self) -> String {
        let trace = self.trace.as_ref().map_or(Value::Null, Trace::to_value);
        Value::Array(vec![
            Value::String(self.status.as_str().to_string()),
            self.value.clone(),
            trace,
        ])
        .to_string()
    }
}

/// Envelope decoding failure.
///
/// Callers treat this as "the engine printed raw diagnostics", not as a
/// protocol error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    code: &'static str,
    message: String,
}

impl DecodeError {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for DecodeError {}

/// Decode runner output into an envelope.
///
/// # Errors
/// Returns a [`DecodeError`] when the output is not JSON or not a
/// `[status, value, trace?]` array.
pub fn decode(output: &str) -> Result<Envelope, DecodeError> {
    if output.trim().is_empty() {
        return Ok(Envelope::ok(Value::Null));
    }

    let parsed: Value = serde_json::from_str(output)
        .map_err(|e| DecodeError::new(codes::ENVELOPE_NOT_JSON, e.to_string()))?;

    let Value::Array(mut items) = parsed else {
        return Err(DecodeError::new(
            codes::ENVELOPE_SHAPE_INVALID,
            "expected a JSON array",
        ));
    };

    if items.is_empty() || items.len() > 3 {
        return Err(DecodeError::new(
            codes::ENVELOPE_SHAPE_INVALID,
            format!("expected 1 to 3 elements, got {}", items.len()),
        ));
    }

    let trace = if items.len() == 3 {
        items.pop().and_then(decode_trace)
    } else {
        None
    };
    let value = if items.len() == 2 {
        items.pop().unwrap_or(Value::Null)
    } else {
        Value::Null
    };

    let status = match items.pop() {
        Some(Value::String(s)) if s == "ok" => Status::Ok,
        Some(Value::String(s)) if s == "err" => Status::Err,
        other => {
            return Err(DecodeError::new(
                codes::ENVELOPE_STATUS_INVALID,
                format!("unknown status {}", other.unwrap_or(Value::Null)),
            ))
        }
    };

    Ok(Envelope {
        status,
        value,
        trace,
    })
}

fn decode_trace(value: Value) -> Option<Trace> {
    match value {
        Value::String(text) => Some(Trace::Text(text)),
        Value::Array(items) => Some(Trace::Lines(
            items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
        )),
        _ => None,
    }
}

/// Serialize a positional argument list as a JSON array literal.
#[must_use]
pub fn encode_args(args: &[Value]) -> String {
    Value::Array(args.to_vec()).to_string()
}

/// Serialize a string as a JSON string literal.
#[must_use]
pub fn quote(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}
