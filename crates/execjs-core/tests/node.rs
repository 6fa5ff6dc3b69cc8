//! Round trips through a real Node.js. Skipped when Node is not installed.

use execjs_core::{runtimes, Context, ErrorKind, Runtime};
use serde_json::json;
use std::sync::Arc;

fn node() -> Option<Arc<dyn Runtime>> {
    let runtime = runtimes::by_name(runtimes::NODE_NAME)?;
    if runtime.is_available() {
        Some(runtime)
    } else {
        eprintln!("node not found, skipping");
        None
    }
}

#[test]
fn test_node_eval_and_exec() {
    let Some(node) = node() else { return };

    assert_eq!(node.eval("1 + 1").unwrap(), json!(2));
    assert_eq!(node.eval("'caf\u{e9} \u{2603}'").unwrap(), json!("café ☃"));
    assert_eq!(
        node.exec("return [1, {a: function() {}, b: 'x'}, null]").unwrap(),
        json!([1, {"b": "x"}, null])
    );
    assert_eq!(node.exec("var x = 1;").unwrap(), serde_json::Value::Null);
}

#[test]
fn test_node_context_prelude_and_call() {
    let Some(node) = node() else { return };

    let mut ctx = node
        .compile("function add(a, b) { return a + b; }\nvar base = 10;")
        .unwrap();
    assert_eq!(ctx.call("add", &[json!(1), json!(2)]).unwrap(), json!(3));
    assert_eq!(ctx.eval("add(base, 1)").unwrap(), json!(11));
}

#[test]
fn test_node_errors() {
    let Some(node) = node() else { return };

    let err = node.eval("1 +\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(err.to_string().starts_with("SyntaxError"));

    let err = node.exec("var a = 1;\nthrow new Error('boom');").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Program);
    assert_eq!(err.to_string(), "Error: boom");
    assert_eq!(err.frames()[0].code, "throw new Error('boom');");
    assert_eq!(err.frames()[0].line, 2);
}

#[test]
fn test_node_errors_from_prelude_code() {
    let Some(node) = node() else { return };

    let mut ctx = node
        .compile("var a = 1;\nfunction f() {\n  throw new Error('x');\n}")
        .unwrap();
    let err = ctx.call("f", &[]).unwrap_err();
    assert_eq!(err.to_string(), "Error: x");
    assert_eq!(err.frames()[0].code, "throw new Error('x');");
    assert_eq!(err.frames()[0].line, 3);
}

#[test]
fn test_node_multiline_eval_frames() {
    let Some(node) = node() else { return };

    let err = node.eval("1\n+\nundefinedVar").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Program);
    assert_eq!(err.frames().len(), 1);
    assert_eq!(err.frames()[0].code, "undefinedVar");
    assert_eq!(err.frames()[0].line, 3);
}

#[test]
fn test_node_runner_frames_are_not_reported() {
    let Some(node) = node() else { return };

    let mut ctx = node.compile("var a = 1;\nvar b = 2;").unwrap();
    let err = ctx.exec("var c = 3;\nthrow new Error('y');").unwrap_err();
    assert_eq!(err.frames().len(), 1);
    assert_eq!(err.frames()[0].code, "throw new Error('y');");
    assert_eq!(err.frames()[0].line, 4);
}
