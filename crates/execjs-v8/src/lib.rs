//! Embedded V8 engine for execjs.
//!
//! Runs JavaScript in-process through `deno_core` instead of spawning an
//! interpreter. Each context owns one isolate, so state persists between
//! calls on the same context.
//!
//! ## Usage
//!
//! ```ignore
//! use execjs_core::Runtime;
//!
//! let runtime = execjs_v8::runtime();
//! let mut ctx = runtime.compile("var base = 40;")?;
//! assert_eq!(ctx.eval("base + 2")?, serde_json::json!(42));
//! ```

use deno_core::error::{AnyError, JsError};
use deno_core::{v8, JsRuntime, RuntimeOptions};
use execjs_core::embedded::unbox::{number_value, unbox, Unboxer};
use execjs_core::embedded::{EmbeddedRuntime, Engine, EngineBinding, EngineError};
use execjs_core::family::{self, EngineFamily};
use serde_json::Value;

/// Script name reported in V8 stack frames.
const SCRIPT_NAME: &str = "<execjs>";

/// Display name of the embedded runtime.
pub const NAME: &str = "V8 (embedded)";

/// The V8 engine adapter.
#[derive(Debug, Default, Clone, Copy)]
pub struct V8Engine;

/// The embedded V8 runtime.
#[must_use]
pub fn runtime() -> EmbeddedRuntime<V8Engine> {
    EmbeddedRuntime::new(V8Engine)
}

impl Engine for V8Engine {
    type Binding = V8Binding;

    fn name(&self) -> &str {
        NAME
    }

    fn family(&self) -> &'static EngineFamily {
        &family::V8
    }

    fn probe(&self) -> bool {
        // Linked in at build time.
        true
    }

    fn instantiate(&self) -> Result<V8Binding, EngineError> {
        tracing::debug!("creating V8 isolate");
        Ok(V8Binding {
            js_runtime: JsRuntime::new(RuntimeOptions::default()),
        })
    }
}

/// One isolate with its own global object.
pub struct V8Binding {
    js_runtime: JsRuntime,
}

impl EngineBinding for V8Binding {
    fn evaluate(&mut self, source: &str) -> Result<Value, EngineError> {
        let global = self
            .js_runtime
            .execute_script(SCRIPT_NAME, source.to_string())
            .map_err(engine_error)?;

        let scope = &mut self.js_runtime.handle_scope();
        let local = v8::Local::new(scope, global);
        Ok(unbox(&mut V8Unboxer { scope }, local))
    }
}

fn engine_error(err: AnyError) -> EngineError {
    let Some(js) = err.downcast_ref::<JsError>() else {
        return EngineError::new(err.to_string());
    };

    let mut out = EngineError::new(js.exception_message.clone());
    if let Some(name) = &js.name {
        out = out.with_name(name.clone());
    }
    if let Some(stack) = &js.stack {
        out = out.with_stack(stack.clone());
    }
    // Syntax errors carry their location as a single synthetic frame.
    if let Some(frame) = js.frames.first() {
        if let (Some(line), Some(column)) = (frame.line_number, frame.column_number) {
            out = out.with_position(
                usize::try_from(line).unwrap_or(0),
                usize::try_from(column).unwrap_or(0),
            );
        }
    }
    out
}

/// Reads V8 handles within one handle scope.
struct V8Unboxer<'a, 's> {
    scope: &'a mut v8::HandleScope<'s>,
}

impl<'a, 's> V8Unboxer<'a, 's> {
    fn string(&mut self, value: v8::Local<'s, v8::Value>) -> Option<String> {
        let string = value.to_string(self.scope)?;
        Some(string.to_rust_string_lossy(self.scope))
    }
}

impl<'a, 's> Unboxer for V8Unboxer<'a, 's> {
    type Native = v8::Local<'s, v8::Value>;

    fn is_callable(&mut self, value: Self::Native) -> bool {
        value.is_function()
    }

    fn is_array(&mut self, value: Self::Native) -> bool {
        value.is_array()
    }

    fn is_plain_object(&mut self, value: Self::Native) -> bool {
        value.is_object() && !value.is_date() && !value.is_big_int_object()
    }

    fn as_scalar(&mut self, value: Self::Native) -> Option<Value> {
        if value.is_null_or_undefined() {
            Some(Value::Null)
        } else if value.is_boolean() {
            Some(Value::Bool(value.boolean_value(self.scope)))
        } else if value.is_number() {
            value.number_value(self.scope).map(number_value)
        } else if value.is_big_int() {
            let bigint = v8::Local::<v8::BigInt>::try_from(value).ok()?;
            match bigint.i64_value() {
                (n, true) => Some(Value::from(n)),
                _ => self.string(value).map(Value::String),
            }
        } else if value.is_string() || value.is_date() {
            self.string(value).map(Value::String)
        } else {
            None
        }
    }

    fn elements(&mut self, array: Self::Native) -> Vec<Self::Native> {
        let Ok(array) = v8::Local::<v8::Array>::try_from(array) else {
            return Vec::new();
        };
        (0..array.length())
            .filter_map(|i| array.get_index(self.scope, i))
            .collect()
    }

    fn entries(&mut self, object: Self::Native) -> Vec<(String, Self::Native)> {
        let Ok(object) = v8::Local::<v8::Object>::try_from(object) else {
            return Vec::new();
        };
        let Some(names) =
            object.get_own_property_names(self.scope, v8::GetPropertyNamesArgs::default())
        else {
            return Vec::new();
        };

        let mut entries = Vec::with_capacity(names.length() as usize);
        for i in 0..names.length() {
            let Some(key) = names.get_index(self.scope, i) else {
                continue;
            };
            let Some(name) = self.string(key) else {
                continue;
            };
            if let Some(member) = object.get(self.scope, key) {
                entries.push((name, member));
            }
        }
        entries
    }
}
