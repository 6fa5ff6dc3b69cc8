use super::{activate, context, finish};
use execjs_core::Config;
use miette::Result;
use std::path::Path;

/// Evaluate `source` as an expression on the selected runtime.
pub fn run(config: &Config, source: &str, prelude: Option<&Path>, json: bool) -> Result<()> {
    activate(config)?;
    let result = match prelude {
        Some(_) => context(prelude)?.eval(source),
        None => execjs_core::eval(source),
    };
    finish(result, json)
}
