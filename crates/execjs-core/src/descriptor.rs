//! Runtime descriptors for external interpreters.

use crate::error::{Error, Result};
use crate::family::{EngineFamily, NODE};
use execjs_util::TextEncoding;
use std::borrow::Cow;
use std::path::PathBuf;

/// Where a runner template comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Runner {
    /// Compiled into the binary.
    Bundled(&'static str),
    /// Read from disk on first use.
    File(PathBuf),
}

impl Runner {
    /// Template text.
    pub fn load(&self) -> Result<Cow<'static, str>> {
        match self {
            Self::Bundled(text) => Ok(Cow::Borrowed(text)),
            Self::File(path) => std::fs::read_to_string(path)
                .map(Cow::Owned)
                .map_err(|source| Error::Runner {
                    path: path.clone(),
                    source,
                }),
        }
    }
}

/// Signature check run against each candidate binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub args: Vec<String>,
    /// Regular expression the merged output must match. A pattern that does
    /// not compile is matched as a plain substring.
    pub pattern: String,
}

/// Immutable description of one external interpreter.
#[derive(Debug, Clone)]
pub struct RuntimeSpec {
    pub name: String,
    /// Candidate commands, tried in order. A candidate may carry inline
    /// arguments (`cscript //E:jscript //Nologo`).
    pub commands: Vec<String>,
    pub runner: Runner,
    pub probe: Option<Probe>,
    /// Encoding of the interpreter's output.
    pub encoding: TextEncoding,
    pub family: &'static EngineFamily,
    pub deprecated: bool,
}

impl RuntimeSpec {
    /// A descriptor with no candidates, UTF-8 output and Node-style errors.
    pub fn new(name: impl Into<String>, runner: Runner) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
            runner,
            probe: None,
            encoding: TextEncoding::default(),
            family: &NODE,
            deprecated: false,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    pub fn with_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands.extend(commands.into_iter().map(Into::into));
        self
    }

    pub fn with_probe<I, S>(mut self, args: I, pattern: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.probe = Some(Probe {
            args: args.into_iter().map(Into::into).collect(),
            pattern: pattern.into(),
        });
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_family(mut self, family: &'static EngineFamily) -> Self {
        self.family = family;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}
