pub mod eval;
pub mod exec;
pub mod runtimes;

use execjs_core::{Config, Context, Frame, Runtime, Value};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Every runtime this binary knows about, in preference order.
pub fn known_runtimes(config: &Config) -> Vec<Arc<dyn Runtime>> {
    #[allow(unused_mut)]
    let mut list = execjs_core::runtimes::builtins_with(config);
    #[cfg(feature = "native-runtime")]
    list.insert(0, Arc::new(execjs_v8::runtime()));
    list
}

/// Pick a runtime and make it the active one.
pub fn activate(config: &Config) -> Result<()> {
    let runtime = execjs_core::runtimes::select(&known_runtimes(config), config)
        .map_err(|e| report(&e))?;
    tracing::debug!(runtime = runtime.name(), "selected runtime");
    execjs_core::set_runtime(runtime).map_err(|e| report(&e))
}

/// Context on the active runtime, with the prelude file loaded if given.
pub fn context(prelude: Option<&Path>) -> Result<Box<dyn Context>> {
    let prelude = match prelude {
        Some(path) => std::fs::read_to_string(path).into_diagnostic()?,
        None => String::new(),
    };
    execjs_core::compile(&prelude).map_err(|e| report(&e))
}

#[derive(Serialize)]
struct Success<'a> {
    ok: bool,
    value: &'a Value,
}

#[derive(Serialize)]
struct Failure<'a> {
    ok: bool,
    error: ErrorJson<'a>,
}

#[derive(Serialize)]
struct ErrorJson<'a> {
    code: &'static str,
    message: String,
    frames: &'a [Frame],
}

/// Print a result; failures exit with status 1.
pub fn finish(result: execjs_core::Result<Value>, json: bool) -> Result<()> {
    match result {
        Ok(value) => {
            let text = if json {
                serde_json::to_string(&Success {
                    ok: true,
                    value: &value,
                })
            } else {
                serde_json::to_string_pretty(&value)
            }
            .into_diagnostic()?;
            println!("{text}");
            Ok(())
        }
        Err(err) if json => {
            let failure = Failure {
                ok: false,
                error: ErrorJson {
                    code: err.code(),
                    message: err.to_string(),
                    frames: err.frames(),
                },
            };
            println!("{}", serde_json::to_string(&failure).into_diagnostic()?);
            std::process::exit(1);
        }
        Err(err) => Err(report(&err)),
    }
}

/// Render an execjs error as a diagnostic, frames as help text.
pub fn report(err: &execjs_core::Error) -> miette::Report {
    let frames: Vec<String> = err.frames().iter().map(ToString::to_string).collect();
    if frames.is_empty() {
        miette::miette!(code = err.code(), "{err}")
    } else {
        miette::miette!(code = err.code(), help = frames.join("\n"), "{err}")
    }
}
