//! In-process engines.
//!
//! An [`Engine`] is the adapter a native binding implements: it says whether
//! the binding can load on this host and hands out [`EngineBinding`]s, one per
//! context. [`EmbeddedRuntime`] turns any engine into a [`Runtime`], owning the
//! memoized availability check and the optional per-runtime lock.
//!
//! Bindings return plain [`Value`]s. Adapters convert native results with
//! [`unbox::unbox`] so no engine handle ever escapes the binding.

pub mod unbox;

use crate::error::{Error, Result};
use crate::family::EngineFamily;
use crate::normalize::{self, Origin};
use crate::runtime::{is_blank, Context, Runtime};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use thiserror::Error;

/// A native exception raised by an embedded engine.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{message}")]
pub struct EngineError {
    /// Constructor name (`SyntaxError`, `TypeError`, ...), when known.
    pub name: Option<String>,
    pub message: String,
    /// Engine-native stack text.
    pub stack: Option<String>,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl EngineError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

/// One live engine instance. State persists across calls.
pub trait EngineBinding {
    /// Evaluate `source` as a script and return its completion value.
    fn evaluate(&mut self, source: &str) -> Result<Value, EngineError>;

    /// Call the function found at `identifier` with `args`.
    fn call(&mut self, identifier: &str, args: &[Value]) -> Result<Value, EngineError> {
        let source = format!("{identifier}.apply(this, {})", execjs_proto::encode_args(args));
        self.evaluate(&source)
    }
}

/// Adapter contract for an in-process engine.
pub trait Engine: Send + Sync + 'static {
    type Binding: EngineBinding + 'static;

    fn name(&self) -> &str;

    /// Error-reporting quirks of this engine.
    fn family(&self) -> &'static EngineFamily;

    /// Whether the native binding can be loaded on this host.
    fn probe(&self) -> bool;

    fn instantiate(&self) -> Result<Self::Binding, EngineError>;

    /// Serialize every call into this engine through one lock.
    fn requires_lock(&self) -> bool {
        false
    }

    fn is_deprecated(&self) -> bool {
        false
    }
}

/// [`Runtime`] backed by an [`Engine`].
pub struct EmbeddedRuntime<E: Engine> {
    inner: Arc<Inner<E>>,
}

struct Inner<E> {
    engine: E,
    available: OnceLock<bool>,
    lock: Mutex<()>,
}

impl<E: Engine> Clone for EmbeddedRuntime<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Engine> fmt::Debug for EmbeddedRuntime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedRuntime")
            .field("name", &self.inner.engine.name())
            .field("available", &self.inner.available.get())
            .finish()
    }
}

impl<E: Engine> EmbeddedRuntime<E> {
    pub fn new(engine: E) -> Self {
        Self {
            inner: Arc::new(Inner {
                engine,
                available: OnceLock::new(),
                lock: Mutex::new(()),
            }),
        }
    }

    pub fn engine(&self) -> &E {
        &self.inner.engine
    }

    /// Held for the duration of a call when the engine asks for it.
    fn guard(&self) -> Option<MutexGuard<'_, ()>> {
        self.inner
            .engine
            .requires_lock()
            .then(|| self.inner.lock.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn family(&self) -> &'static EngineFamily {
        self.inner.engine.family()
    }
}

impl<E: Engine> Runtime for EmbeddedRuntime<E> {
    fn name(&self) -> &str {
        self.inner.engine.name()
    }

    fn is_available(&self) -> bool {
        *self.inner.available.get_or_init(|| {
            let available = self.inner.engine.probe();
            tracing::debug!(runtime = self.name(), available, "probed embedded engine");
            available
        })
    }

    fn is_deprecated(&self) -> bool {
        self.inner.engine.is_deprecated()
    }

    fn compile(&self, prelude: &str) -> Result<Box<dyn Context>> {
        if !self.is_available() {
            return Err(Error::unavailable(self.name()));
        }

        let _guard = self.guard();
        let mut binding = self
            .inner
            .engine
            .instantiate()
            .map_err(|err| Error::other(format!("{}: {err}", self.name())))?;

        if !is_blank(prelude) {
            binding.evaluate(prelude).map_err(|err| {
                normalize::engine_error(self.family(), &err, Origin::new(prelude))
            })?;
        }

        Ok(Box::new(EmbeddedContext {
            runtime: self.clone(),
            binding,
            prelude: prelude.to_string(),
        }))
    }
}

/// A context holding one engine instance.
pub struct EmbeddedContext<E: Engine> {
    runtime: EmbeddedRuntime<E>,
    binding: E::Binding,
    /// Functions reached through `call` are defined here.
    prelude: String,
}

impl<E: Engine> EmbeddedContext<E> {
    fn evaluate(&mut self, script: &str, source: &str) -> Result<Value> {
        let _guard = self.runtime.guard();
        let family = self.runtime.family();
        self.binding
            .evaluate(script)
            .map_err(|err| normalize::engine_error(family, &err, Origin::new(source)))
    }
}

impl<E: Engine> Context for EmbeddedContext<E> {
    fn exec(&mut self, source: &str) -> Result<Value> {
        if is_blank(source) {
            return Ok(Value::Null);
        }
        self.evaluate(&format!("(function(){{{source}\n}})()"), source)
    }

    fn eval(&mut self, source: &str) -> Result<Value> {
        if is_blank(source) {
            return Ok(Value::Null);
        }
        self.evaluate(&format!("({source}\n)"), source)
    }

    fn call(&mut self, identifier: &str, args: &[Value]) -> Result<Value> {
        let _guard = self.runtime.guard();
        let family = self.runtime.family();
        self.binding
            .call(identifier, args)
            .map_err(|err| normalize::engine_error(family, &err, Origin::new(&self.prelude)))
    }
}
