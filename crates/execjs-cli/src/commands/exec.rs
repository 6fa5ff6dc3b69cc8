use super::{activate, context, finish};
use execjs_core::Config;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

/// Run a script file (or stdin) as a function body.
pub fn run(config: &Config, file: Option<&Path>, prelude: Option<&Path>, json: bool) -> Result<()> {
    let source = match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path).into_diagnostic()?,
        _ => std::io::read_to_string(std::io::stdin()).into_diagnostic()?,
    };

    activate(config)?;
    let result = match prelude {
        Some(_) => context(prelude)?.exec(&source),
        None => execjs_core::exec(&source),
    };
    finish(result, json)
}
