//! The two abstractions every backend implements.

use crate::error::Result;
use serde_json::Value;
use std::path::Path;

/// A configured JavaScript engine.
///
/// Runtimes are cheap handles. Availability is computed on first use and
/// memoized for the life of the process.
pub trait Runtime: Send + Sync {
    /// Display name, also the key used for lookup by name.
    fn name(&self) -> &str;

    /// Whether a usable engine exists on this host.
    fn is_available(&self) -> bool;

    fn is_deprecated(&self) -> bool {
        false
    }

    /// Resolved interpreter binary, for runtimes that drive one.
    fn binary(&self) -> Option<&Path> {
        None
    }

    /// Create a context with `prelude` loaded.
    ///
    /// Fails with [`crate::Error::Unavailable`] when the runtime is unusable.
    fn compile(&self, prelude: &str) -> Result<Box<dyn Context>>;

    /// Run `source` as a function body in a throwaway context.
    fn exec(&self, source: &str) -> Result<Value> {
        if is_blank(source) {
            return Ok(Value::Null);
        }
        self.compile("")?.exec(source)
    }

    /// Evaluate `source` as an expression in a throwaway context.
    fn eval(&self, source: &str) -> Result<Value> {
        if is_blank(source) {
            return Ok(Value::Null);
        }
        self.compile("")?.eval(source)
    }
}

/// A session bound to one runtime and prelude.
///
/// Owned by a single caller; share it across threads only with external
/// synchronization.
pub trait Context {
    /// Run `source` as a function body; `return` sets the result.
    fn exec(&mut self, source: &str) -> Result<Value>;

    /// Evaluate `source` as a single expression.
    fn eval(&mut self, source: &str) -> Result<Value>;

    /// Call the function at `identifier` (e.g. `"Math.max"`) with `args`.
    fn call(&mut self, identifier: &str, args: &[Value]) -> Result<Value> {
        self.eval(&format!(
            "{identifier}.apply(this, {})",
            execjs_proto::encode_args(args)
        ))
    }
}

/// Empty or whitespace-only source never reaches an engine.
pub(crate) fn is_blank(source: &str) -> bool {
    source.trim().is_empty()
}
