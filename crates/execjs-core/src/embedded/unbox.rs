//! Converting native engine values into plain data.
//!
//! Each adapter implements [`Unboxer`] for its own handle type; [`unbox`] is
//! the one recursive conversion. Callables become `null` (and are dropped
//! from objects), arrays keep their order, strings come back as Rust
//! `String`s.

use serde_json::{Map, Number, Value};

/// Nesting beyond this depth converts to `null`, which also ends cycles.
pub const MAX_DEPTH: usize = 128;

/// Capability interface over one engine's value handles.
pub trait Unboxer {
    type Native: Copy;

    fn is_callable(&mut self, value: Self::Native) -> bool;
    fn is_array(&mut self, value: Self::Native) -> bool;
    fn is_plain_object(&mut self, value: Self::Native) -> bool;

    /// `null`, boolean, number or string; `None` for anything else.
    fn as_scalar(&mut self, value: Self::Native) -> Option<Value>;

    fn elements(&mut self, array: Self::Native) -> Vec<Self::Native>;

    /// Own enumerable members of an object, keys already stringified.
    fn entries(&mut self, object: Self::Native) -> Vec<(String, Self::Native)>;
}

/// Recursively convert `value` to plain data.
pub fn unbox<U: Unboxer>(unboxer: &mut U, value: U::Native) -> Value {
    unbox_at(unboxer, value, 0)
}

fn unbox_at<U: Unboxer>(unboxer: &mut U, value: U::Native, depth: usize) -> Value {
    if depth > MAX_DEPTH || unboxer.is_callable(value) {
        return Value::Null;
    }

    if unboxer.is_array(value) {
        let elements = unboxer.elements(value);
        return Value::Array(
            elements
                .into_iter()
                .map(|element| unbox_at(unboxer, element, depth + 1))
                .collect(),
        );
    }

    if unboxer.is_plain_object(value) {
        let mut map = Map::new();
        for (key, member) in unboxer.entries(value) {
            if unboxer.is_callable(member) {
                continue;
            }
            map.insert(key, unbox_at(unboxer, member, depth + 1));
        }
        return Value::Object(map);
    }

    unboxer.as_scalar(value).unwrap_or(Value::Null)
}

/// JSON number for an engine double: integral values become integers,
/// non-finite ones `null` (as `JSON.stringify` does).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn number_value(n: f64) -> Value {
    if !n.is_finite() {
        return Value::Null;
    }
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return Value::from(n as i64);
    }
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Arena-backed stand-in for an engine heap.
    enum Node {
        Scalar(Value),
        Function,
        Array(Vec<usize>),
        Object(Vec<(&'static str, usize)>),
    }

    struct Heap(Vec<Node>);

    impl Heap {
        fn push(&mut self, node: Node) -> usize {
            self.0.push(node);
            self.0.len() - 1
        }
    }

    impl Unboxer for Heap {
        type Native = usize;

        fn is_callable(&mut self, value: usize) -> bool {
            matches!(self.0[value], Node::Function)
        }

        fn is_array(&mut self, value: usize) -> bool {
            matches!(self.0[value], Node::Array(_))
        }

        fn is_plain_object(&mut self, value: usize) -> bool {
            matches!(self.0[value], Node::Object(_))
        }

        fn as_scalar(&mut self, value: usize) -> Option<Value> {
            match &self.0[value] {
                Node::Scalar(v) => Some(v.clone()),
                _ => None,
            }
        }

        fn elements(&mut self, array: usize) -> Vec<usize> {
            match &self.0[array] {
                Node::Array(items) => items.clone(),
                _ => Vec::new(),
            }
        }

        fn entries(&mut self, object: usize) -> Vec<(String, usize)> {
            match &self.0[object] {
                Node::Object(members) => members
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), *v))
                    .collect(),
                _ => Vec::new(),
            }
        }
    }

    #[test]
    fn test_unbox_nested_drops_callables() {
        let mut heap = Heap(Vec::new());
        let one = heap.push(Node::Scalar(json!(1)));
        let text = heap.push(Node::Scalar(json!("é")));
        let func = heap.push(Node::Function);
        let list = heap.push(Node::Array(vec![one, func, text]));
        let root = heap.push(Node::Object(vec![("list", list), ("method", func), ("n", one)]));

        assert_eq!(
            unbox(&mut heap, root),
            json!({"list": [1, null, "é"], "n": 1})
        );
        assert_eq!(unbox(&mut heap, func), Value::Null);
    }

    #[test]
    fn test_unbox_cycle_terminates() {
        let mut heap = Heap(Vec::new());
        heap.push(Node::Array(vec![0]));
        let value = unbox(&mut heap, 0);

        let mut depth = 0;
        let mut cursor = &value;
        while let Value::Array(items) = cursor {
            depth += 1;
            cursor = &items[0];
        }
        assert_eq!(depth, MAX_DEPTH + 1);
        assert_eq!(*cursor, Value::Null);
    }

    #[test]
    fn test_number_value() {
        assert_eq!(number_value(2.0), json!(2));
        assert_eq!(number_value(-0.5), json!(-0.5));
        assert_eq!(number_value(f64::NAN), Value::Null);
        assert_eq!(number_value(f64::INFINITY), Value::Null);
        assert_eq!(number_value(1e300), json!(1e300));
    }
}
