use crate::trace::Frame;
use execjs_util::TextDecodeError;
use std::path::PathBuf;
use thiserror::Error;

/// Stable error codes.
pub mod codes {
    pub const JS_SYNTAX_ERROR: &str = "JS_SYNTAX_ERROR";
    pub const JS_PROGRAM_ERROR: &str = "JS_PROGRAM_ERROR";
    pub const RUNTIME_UNAVAILABLE: &str = "RUNTIME_UNAVAILABLE";
    pub const RUNTIME_NOT_SELECTED: &str = "RUNTIME_NOT_SELECTED";
    pub const RUNNER_READ_FAILED: &str = "RUNNER_READ_FAILED";
    pub const OUTPUT_DECODE_FAILED: &str = "OUTPUT_DECODE_FAILED";
    pub const IO_ERROR: &str = "IO_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Result alias for execjs operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The engine could not parse the source.
    Syntax,
    /// The source parsed but threw while running.
    Program,
    /// No usable engine for the requested runtime.
    Unavailable,
    Io,
    Decode,
    Other,
}

/// Core error type for execjs operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{message}")]
    Syntax { message: String, frames: Vec<Frame> },

    #[error("{message}")]
    Program { message: String, frames: Vec<Frame> },

    #[error("{name} is unavailable on this system")]
    Unavailable { name: String },

    #[error("No JavaScript runtime has been selected")]
    NotSelected,

    #[error("Failed to read runner template at {path}: {source}")]
    Runner {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    OutputDecode(#[from] TextDecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn syntax(message: impl Into<String>, frames: Vec<Frame>) -> Self {
        Self::Syntax {
            message: message.into(),
            frames,
        }
    }

    #[must_use]
    pub fn program(message: impl Into<String>, frames: Vec<Frame>) -> Self {
        Self::Program {
            message: message.into(),
            frames,
        }
    }

    #[must_use]
    pub fn unavailable(name: impl Into<String>) -> Self {
        Self::Unavailable { name: name.into() }
    }

    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Syntax { .. } => ErrorKind::Syntax,
            Self::Program { .. } => ErrorKind::Program,
            Self::Unavailable { .. } | Self::NotSelected => ErrorKind::Unavailable,
            Self::Runner { .. } | Self::Io(_) => ErrorKind::Io,
            Self::OutputDecode(_) => ErrorKind::Decode,
            Self::Other(_) => ErrorKind::Other,
        }
    }

    /// Stable code string for machine-readable output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => codes::JS_SYNTAX_ERROR,
            Self::Program { .. } => codes::JS_PROGRAM_ERROR,
            Self::Unavailable { .. } => codes::RUNTIME_UNAVAILABLE,
            Self::NotSelected => codes::RUNTIME_NOT_SELECTED,
            Self::Runner { .. } => codes::RUNNER_READ_FAILED,
            Self::OutputDecode(_) => codes::OUTPUT_DECODE_FAILED,
            Self::Io(_) => codes::IO_ERROR,
            Self::Other(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Normalized JavaScript frames, innermost first where the engine reports them that way.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        match self {
            Self::Syntax { frames, .. } | Self::Program { frames, .. } => frames,
            _ => &[],
        }
    }
}
