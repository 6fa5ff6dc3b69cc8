//! The process-wide active runtime.
//!
//! Selection is explicit: call [`set_runtime`] once during startup. Nothing
//! is picked implicitly on first use. Switching runtimes while other threads
//! are mid-call is not supported; calls already holding the previous runtime
//! finish on it.

use crate::error::{Error, Result};
use crate::runtime::{Context, Runtime};
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};

static ACTIVE: RwLock<Option<Arc<dyn Runtime>>> = RwLock::new(None);

/// Make `runtime` the active runtime.
///
/// Fails with [`Error::Unavailable`] and leaves the current selection
/// untouched when `runtime` is not usable.
pub fn set_runtime(runtime: Arc<dyn Runtime>) -> Result<()> {
    if !runtime.is_available() {
        return Err(Error::unavailable(runtime.name()));
    }
    tracing::debug!(runtime = runtime.name(), "active runtime selected");
    *ACTIVE.write().unwrap_or_else(PoisonError::into_inner) = Some(runtime);
    Ok(())
}

/// The active runtime.
pub fn runtime() -> Result<Arc<dyn Runtime>> {
    ACTIVE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .ok_or(Error::NotSelected)
}

/// [`Runtime::exec`] on the active runtime.
pub fn exec(source: &str) -> Result<Value> {
    runtime()?.exec(source)
}

/// [`Runtime::eval`] on the active runtime.
pub fn eval(source: &str) -> Result<Value> {
    runtime()?.eval(source)
}

/// [`Runtime::compile`] on the active runtime.
pub fn compile(prelude: &str) -> Result<Box<dyn Context>> {
    runtime()?.compile(prelude)
}

#[cfg(test)]
pub(crate) fn clear() {
    *ACTIVE.write().unwrap_or_else(PoisonError::into_inner) = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::Fixed;
    use serde_json::json;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_nothing_selected() {
        clear();
        assert!(matches!(runtime(), Err(Error::NotSelected)));
        assert_eq!(eval("1").unwrap_err().kind(), ErrorKind::Unavailable);
    }

    #[test]
    #[serial]
    fn test_select_and_use() {
        clear();
        set_runtime(Arc::new(Fixed::new("Good", true))).unwrap();
        assert_eq!(runtime().unwrap().name(), "Good");
        assert_eq!(eval("1 + 1").unwrap(), json!("1 + 1"));

        let mut ctx = compile("var a;").unwrap();
        assert_eq!(ctx.exec("a").unwrap(), json!("var a;a"));
    }

    #[test]
    #[serial]
    fn test_unavailable_selection_keeps_previous() {
        clear();
        set_runtime(Arc::new(Fixed::new("Good", true))).unwrap();

        let err = set_runtime(Arc::new(Fixed::new("Gone", false))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert_eq!(runtime().unwrap().name(), "Good");
    }
}
