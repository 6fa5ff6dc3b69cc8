//! Runtimes that drive an interpreter binary.
//!
//! Each call renders the runner template around the source, writes it to a
//! temporary file, runs `<binary> <file>` through the shell and reads one
//! envelope from the merged output. Output that is not an envelope, or any
//! non-zero exit, goes through the raw crash-report path instead.

use crate::assemble::Template;
use crate::config::Config;
use crate::descriptor::RuntimeSpec;
use crate::error::{Error, Result};
use crate::locate::{self, ResolvedBinary};
use crate::normalize::{self, Origin};
use crate::runtime::{is_blank, Context, Runtime};
use crate::shell::{self, ShellFamily};
use execjs_util::ScriptFile;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// Handle to an external interpreter. Clones share the probe result.
#[derive(Clone)]
pub struct ExternalRuntime {
    inner: Arc<Inner>,
}

struct Inner {
    spec: RuntimeSpec,
    config: Config,
    resolved: OnceLock<Option<ResolvedBinary>>,
    template: OnceLock<Cow<'static, str>>,
}

impl fmt::Debug for ExternalRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalRuntime")
            .field("name", &self.inner.spec.name)
            .field("resolved", &self.inner.resolved.get())
            .finish_non_exhaustive()
    }
}

impl ExternalRuntime {
    pub fn new(spec: RuntimeSpec) -> Self {
        Self::with_config(spec, Config::default())
    }

    pub fn with_config(spec: RuntimeSpec, config: Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                spec,
                config,
                resolved: OnceLock::new(),
                template: OnceLock::new(),
            }),
        }
    }

    #[must_use]
    pub fn spec(&self) -> &RuntimeSpec {
        &self.inner.spec
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// The binary chosen by the first (and only) probe.
    #[must_use]
    pub fn resolved(&self) -> Option<&ResolvedBinary> {
        self.inner
            .resolved
            .get_or_init(|| {
                let found = locate::locate(&self.inner.spec, &self.inner.config);
                tracing::debug!(
                    runtime = %self.inner.spec.name,
                    available = found.is_some(),
                    "availability probed"
                );
                found
            })
            .as_ref()
    }

    fn template(&self) -> Result<&str> {
        if let Some(text) = self.inner.template.get() {
            return Ok(text);
        }
        let text = self.inner.spec.runner.load()?;
        Ok(self.inner.template.get_or_init(|| text))
    }

    /// Run `script` through the runner and decode the result.
    ///
    /// Frames are rendered against `source`, a prefix of `script` (all of it
    /// for `exec`, the prelude for `eval`), and against `eval_source` for
    /// positions inside the evaluated expression.
    fn execute(&self, script: &str, source: &str, eval_source: Option<&str>) -> Result<Value> {
        let spec = &self.inner.spec;
        let binary = self
            .resolved()
            .ok_or_else(|| Error::unavailable(&spec.name))?;

        let assembled = Template::new(self.template()?).render(script);
        tracing::debug!(
            runtime = %spec.name,
            bytes = assembled.script.len(),
            line_offset = assembled.line_offset,
            "assembled script"
        );

        let file = ScriptFile::create(self.inner.config.temp_dir(), &assembled.script)?;
        let script_name = file
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let line = shell::command_line(
            &binary.program,
            &binary.args,
            file.path(),
            ShellFamily::current(),
        );

        let captured = shell::run_merged(&line)?;
        file.close()?;
        tracing::debug!(
            runtime = %spec.name,
            success = captured.success,
            code = ?captured.code,
            "interpreter exited"
        );

        let output = spec.encoding.decode(&captured.output)?;
        tracing::trace!(runtime = %spec.name, output = %output, "interpreter output");

        let mut origin = Origin::new(source)
            .with_line_offset(assembled.line_offset)
            .with_script(&script_name);
        if let Some(eval_source) = eval_source {
            origin = origin.with_eval_source(eval_source);
        }

        if !captured.success {
            return Err(normalize::raw_output(spec.family, &output, origin));
        }

        match execjs_proto::decode(&output) {
            Ok(envelope) if envelope.is_ok() => Ok(envelope.value),
            Ok(envelope) => Err(normalize::structured(
                spec.family,
                &envelope.message(),
                envelope.trace.as_ref(),
                origin,
            )),
            Err(err) => {
                tracing::debug!(
                    runtime = %spec.name,
                    code = err.code(),
                    "output is not an envelope"
                );
                Err(normalize::raw_output(spec.family, &output, origin))
            }
        }
    }
}

impl Runtime for ExternalRuntime {
    fn name(&self) -> &str {
        &self.inner.spec.name
    }

    fn is_available(&self) -> bool {
        self.resolved().is_some()
    }

    fn is_deprecated(&self) -> bool {
        self.inner.spec.deprecated
    }

    fn binary(&self) -> Option<&Path> {
        self.resolved().map(|binary| binary.program.as_path())
    }

    fn compile(&self, prelude: &str) -> Result<Box<dyn Context>> {
        if !self.is_available() {
            return Err(Error::unavailable(self.name()));
        }
        if self.inner.spec.deprecated {
            tracing::warn!(runtime = %self.inner.spec.name, "runtime is deprecated");
        }
        Ok(Box::new(ExternalContext {
            runtime: self.clone(),
            prelude: prelude.to_string(),
        }))
    }
}

/// Context over an external interpreter. Every call is a fresh process with
/// the prelude prepended.
#[derive(Debug, Clone)]
pub struct ExternalContext {
    runtime: ExternalRuntime,
    prelude: String,
}

impl ExternalContext {
    fn with_prelude(&self, source: &str) -> String {
        if self.prelude.is_empty() {
            source.to_string()
        } else {
            format!("{}\n{source}", self.prelude)
        }
    }
}

impl Context for ExternalContext {
    fn exec(&mut self, source: &str) -> Result<Value> {
        if is_blank(source) {
            return Ok(Value::Null);
        }
        let script = self.with_prelude(source);
        self.runtime.execute(&script, &script, None)
    }

    fn eval(&mut self, source: &str) -> Result<Value> {
        if is_blank(source) {
            return Ok(Value::Null);
        }
        let expression = execjs_proto::quote(&format!("({source}\n)"));
        let script = self.with_prelude(&format!("return eval({expression})"));
        self.runtime.execute(&script, &self.prelude, Some(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Runner;
    use crate::error::ErrorKind;

    fn missing() -> ExternalRuntime {
        let dir = std::env::temp_dir();
        ExternalRuntime::with_config(
            RuntimeSpec::new("Missing", Runner::Bundled("#{source}"))
                .with_command("execjs-no-such-interpreter"),
            Config::default().with_search_path(dir.as_os_str()),
        )
    }

    #[test]
    fn test_unavailable_runtime() {
        let runtime = missing();
        assert!(!runtime.is_available());
        assert!(runtime.binary().is_none());
        let err = runtime.compile("").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert_eq!(err.to_string(), "Missing is unavailable on this system");
    }

    #[test]
    fn test_blank_source_needs_no_interpreter() {
        let runtime = missing();
        assert_eq!(runtime.eval("   ").unwrap(), Value::Null);
        assert_eq!(runtime.exec("\n").unwrap(), Value::Null);
    }

    #[test]
    fn test_with_prelude_prepends_prelude() {
        let ctx = ExternalContext {
            runtime: missing(),
            prelude: "var a = 1;\nvar b = 2;".to_string(),
        };
        assert_eq!(ctx.with_prelude("a + b"), "var a = 1;\nvar b = 2;\na + b");

        let bare = ExternalContext {
            runtime: missing(),
            prelude: String::new(),
        };
        assert_eq!(bare.with_prelude("a + b"), "a + b");
    }
}
