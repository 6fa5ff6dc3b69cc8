//! Built-in runtime table and autodetection.

use crate::config::Config;
use crate::descriptor::{Runner, RuntimeSpec};
use crate::error::{Error, Result};
use crate::external::ExternalRuntime;
use crate::family::{JSC, JSCRIPT, NODE, SPIDERMONKEY};
use crate::runtime::Runtime;
use execjs_util::TextEncoding;
use std::sync::{Arc, OnceLock};

pub const NODE_RUNNER: &str = include_str!("../support/node_runner.js");
pub const JSC_RUNNER: &str = include_str!("../support/jsc_runner.js");
pub const SPIDERMONKEY_RUNNER: &str = include_str!("../support/spidermonkey_runner.js");
pub const JSCRIPT_RUNNER: &str = include_str!("../support/jscript_runner.js");

pub const NODE_NAME: &str = "Node.js (V8)";
pub const JSC_NAME: &str = "JavaScriptCore";
pub const SPIDERMONKEY_NAME: &str = "SpiderMonkey";
pub const JSCRIPT_NAME: &str = "JScript";

const JSC_PATH: &str = "/System/Library/Frameworks/JavaScriptCore.framework/Versions/A/Resources/jsc";

/// Descriptors of the built-in external runtimes, in autodetection order.
#[must_use]
pub fn builtin_specs() -> Vec<RuntimeSpec> {
    vec![
        RuntimeSpec::new(NODE_NAME, Runner::Bundled(NODE_RUNNER))
            .with_commands(["nodejs", "node"])
            .with_probe(["--version"], r"^v\d+")
            .with_family(&NODE),
        RuntimeSpec::new(JSC_NAME, Runner::Bundled(JSC_RUNNER))
            .with_command(JSC_PATH)
            .with_family(&JSC),
        RuntimeSpec::new(SPIDERMONKEY_NAME, Runner::Bundled(SPIDERMONKEY_RUNNER))
            .with_command("js")
            .with_family(&SPIDERMONKEY)
            .deprecated(),
        RuntimeSpec::new(JSCRIPT_NAME, Runner::Bundled(JSCRIPT_RUNNER))
            .with_command("cscript //E:jscript //Nologo //U")
            .with_encoding(TextEncoding::Utf16Le)
            .with_family(&JSCRIPT),
    ]
}

/// Built-in runtimes built with `config`.
#[must_use]
pub fn builtins_with(config: &Config) -> Vec<Arc<dyn Runtime>> {
    builtin_specs()
        .into_iter()
        .map(|spec| {
            let runtime: Arc<dyn Runtime> =
                Arc::new(ExternalRuntime::with_config(spec, config.clone()));
            runtime
        })
        .collect()
}

/// Process-wide built-in runtimes. Probing is shared by every caller.
pub fn builtins() -> &'static [Arc<dyn Runtime>] {
    static BUILTINS: OnceLock<Vec<Arc<dyn Runtime>>> = OnceLock::new();
    BUILTINS.get_or_init(|| builtins_with(&Config::default()))
}

/// Look up a runtime by name, case-insensitively.
#[must_use]
pub fn find<'a>(runtimes: &'a [Arc<dyn Runtime>], name: &str) -> Option<&'a Arc<dyn Runtime>> {
    runtimes
        .iter()
        .find(|runtime| runtime.name().eq_ignore_ascii_case(name.trim()))
}

/// Look up a built-in runtime by name.
#[must_use]
pub fn by_name(name: &str) -> Option<Arc<dyn Runtime>> {
    find(builtins(), name).cloned()
}

/// Pick a runtime from `runtimes`.
///
/// A name in `config.runtime` must exist and be available. Otherwise the first
/// available runtime wins, with deprecated ones considered only when nothing
/// else is usable.
pub fn select(runtimes: &[Arc<dyn Runtime>], config: &Config) -> Result<Arc<dyn Runtime>> {
    if let Some(name) = &config.runtime {
        let runtime = find(runtimes, name).ok_or_else(|| Error::unavailable(name))?;
        if !runtime.is_available() {
            return Err(Error::unavailable(runtime.name()));
        }
        tracing::debug!(runtime = runtime.name(), "using configured runtime");
        return Ok(Arc::clone(runtime));
    }

    let current = runtimes
        .iter()
        .filter(|runtime| !runtime.is_deprecated())
        .find(|runtime| runtime.is_available());
    if let Some(runtime) = current {
        tracing::debug!(runtime = runtime.name(), "autodetected runtime");
        return Ok(Arc::clone(runtime));
    }

    match runtimes
        .iter()
        .filter(|runtime| runtime.is_deprecated())
        .find(|runtime| runtime.is_available())
    {
        Some(runtime) => {
            tracing::warn!(runtime = runtime.name(), "only a deprecated runtime is available");
            Ok(Arc::clone(runtime))
        }
        None => Err(Error::unavailable("JavaScript runtime")),
    }
}

/// Choose among the built-ins, honoring `EXECJS_RUNTIME`.
pub fn autodetect() -> Result<Arc<dyn Runtime>> {
    select(builtins(), &Config::from_env())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixed;
    use crate::error::ErrorKind;

    fn table() -> Vec<Arc<dyn Runtime>> {
        vec![
            Arc::new(Fixed::new("Old", true).deprecated()),
            Arc::new(Fixed::new("Gone", false)),
            Arc::new(Fixed::new("Good", true)),
        ]
    }

    #[test]
    fn test_builtin_table() {
        let specs = builtin_specs();
        let names: Vec<_> = specs.iter().map(|spec| spec.name.as_str()).collect();
        assert_eq!(names, [NODE_NAME, JSC_NAME, SPIDERMONKEY_NAME, JSCRIPT_NAME]);
        assert_eq!(specs[0].commands, ["nodejs", "node"]);
        assert!(specs[2].deprecated);
        assert_eq!(specs[3].encoding, TextEncoding::Utf16Le);
    }

    #[test]
    fn test_json_polyfill_in_non_node_runners() {
        use crate::assemble::{Template, JSON2_MARKER};

        for runner in [JSC_RUNNER, SPIDERMONKEY_RUNNER, JSCRIPT_RUNNER] {
            assert!(Template::new(runner).has_marker(JSON2_MARKER));
        }
        assert!(!Template::new(NODE_RUNNER).has_marker(JSON2_MARKER));
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let runtimes = table();
        assert_eq!(find(&runtimes, "good").unwrap().name(), "Good");
        assert!(find(&runtimes, "Chakra").is_none());
    }

    #[test]
    fn test_select_prefers_current_runtimes() {
        let runtime = select(&table(), &Config::default()).unwrap();
        assert_eq!(runtime.name(), "Good");
    }

    #[test]
    fn test_select_falls_back_to_deprecated() {
        let runtimes = table();
        let runtime = select(&runtimes[..2], &Config::default()).unwrap();
        assert_eq!(runtime.name(), "Old");

        let err = select(&runtimes[1..2], &Config::default()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
    }

    #[test]
    fn test_select_configured_name() {
        let runtimes = table();
        let config = Config::default().with_runtime("Old");
        assert_eq!(select(&runtimes, &config).unwrap().name(), "Old");

        let err = select(&runtimes, &Config::default().with_runtime("Gone"))
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Gone is unavailable on this system");

        let err = select(&runtimes, &Config::default().with_runtime("Nope"))
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
    }
}
