// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Diagnostic rendering of host values.

use serde_json::{Map, Number, Value};

use crate::value::{format_number, HostObject, HostValue};

/// Render any host value as a human-readable string.
///
/// Primitives print as literals, strings are quoted, functions print with
/// their name, arrays render their elements, errors render as
/// `name: message` followed by the stack, plain objects render as JSON and
/// anything else by its class name.
#[must_use]
pub fn debug_string(value: &HostValue) -> String {
    render(value, &mut Vec::new())
}

fn render(value: &HostValue, seen: &mut Vec<usize>) -> String {
    match value {
        HostValue::Undefined => "undefined".to_string(),
        HostValue::Null => "null".to_string(),
        HostValue::Bool(b) => b.to_string(),
        HostValue::Number(n) => format_number(*n),
        HostValue::String(s) => format!("\"{s}\""),
        HostValue::Function(f) => match f.name() {
            Some(name) => format!("Function({name})"),
            None => "Function".to_string(),
        },
        HostValue::Object(object) => render_object(object, seen),
    }
}

fn render_object(object: &HostObject, seen: &mut Vec<usize>) -> String {
    if object.is_array() {
        if seen.contains(&object.id()) {
            return "[...]".to_string();
        }
        seen.push(object.id());
        let elements: Vec<String> =
            object.elements().iter().map(|element| render(element, seen)).collect();
        seen.pop();
        return format!("[{}]", elements.join(", "));
    }

    let class = object.class_name();
    if object.is_instance_of("Error") {
        let name = object.get("name").map_or(class, |n| n.to_display_string());
        let message = object.get("message").map(|m| m.to_display_string()).unwrap_or_default();
        let stack = object.get("stack").map(|s| s.to_display_string()).unwrap_or_default();
        return format!("{name}: {message}\n{stack}");
    }

    if class == "Object" {
        if let Some(json) = to_json(&HostValue::Object(object.clone()), &mut Vec::new()) {
            return format!("Object({json})");
        }
        return "Object".to_string();
    }

    class
}

/// JSON form of a value, or `None` where stringification would throw
/// (cycles) or omit the value (functions, `undefined`)
fn to_json(value: &HostValue, seen: &mut Vec<usize>) -> Option<Value> {
    match value {
        HostValue::Undefined | HostValue::Function(_) => None,
        HostValue::Null => Some(Value::Null),
        HostValue::Bool(b) => Some(Value::Bool(*b)),
        HostValue::Number(n) => Some(json_number(*n)),
        HostValue::String(s) => Some(Value::String(s.to_string())),
        HostValue::Object(object) => {
            let id = object.id();
            if seen.contains(&id) {
                return None;
            }
            seen.push(id);
            let json = if object.is_array() {
                let mut items = Vec::with_capacity(object.len());
                for element in object.elements() {
                    match element {
                        HostValue::Object(_) => items.push(to_json(&element, seen)?),
                        other => items.push(to_json(&other, seen).unwrap_or(Value::Null)),
                    }
                }
                Value::Array(items)
            } else {
                let mut map = Map::new();
                for key in object.keys() {
                    let Some(property) = object.get(&key) else { continue };
                    match property {
                        HostValue::Object(_) => {
                            map.insert(key, to_json(&property, seen)?);
                        }
                        other => {
                            if let Some(v) = to_json(&other, seen) {
                                map.insert(key, v);
                            }
                        }
                    }
                }
                Value::Object(map)
            };
            seen.pop();
            Some(json)
        }
    }
}

fn json_number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::HostFunction;

    #[test]
    fn test_primitives() {
        assert_eq!(debug_string(&HostValue::Undefined), "undefined");
        assert_eq!(debug_string(&HostValue::Null), "null");
        assert_eq!(debug_string(&HostValue::Bool(false)), "false");
        assert_eq!(debug_string(&HostValue::Number(42.0)), "42");
        assert_eq!(debug_string(&HostValue::Number(0.5)), "0.5");
        assert_eq!(debug_string(&HostValue::from("hi")), "\"hi\"");
    }

    #[test]
    fn test_functions() {
        let named = HostFunction::native("onClick", |_, _, _| Ok(HostValue::Undefined));
        assert_eq!(debug_string(&HostValue::Function(named)), "Function(onClick)");
        let anonymous = HostFunction::native("", |_, _, _| Ok(HostValue::Undefined));
        assert_eq!(debug_string(&HostValue::Function(anonymous)), "Function");
    }

    #[test]
    fn test_arrays() {
        let array = HostObject::array_from(vec![1.0.into(), "a".into(), HostValue::Null]);
        assert_eq!(debug_string(&HostValue::Object(array)), "[1, \"a\", null]");
    }

    #[test]
    fn test_errors() {
        let error = HostValue::error("TypeError", "x is not a function");
        let rendered = debug_string(&error);
        assert!(rendered.starts_with("TypeError: x is not a function\n"));
    }

    #[test]
    fn test_plain_objects_as_json() {
        let object = HostObject::plain();
        object.set("a", 1.0.into());
        object.set("skip", HostValue::Undefined);
        object.set("f", HostValue::Function(HostFunction::native("f", |_, _, _| {
            Ok(HostValue::Undefined)
        })));
        let nested = HostObject::plain();
        nested.set("b", HostValue::Bool(true));
        object.set("nested", nested.into());
        assert_eq!(debug_string(&object.into()), r#"Object({"a":1,"nested":{"b":true}})"#);
    }

    #[test]
    fn test_cyclic_object() {
        let object = HostObject::plain();
        object.set("me", object.clone().into());
        assert_eq!(debug_string(&object.clone().into()), "Object");
        object.remove("me");
    }

    #[test]
    fn test_self_containing_array() {
        let array = HostObject::array(0);
        array.set_element(0, 1.0.into());
        array.set_element(1, array.clone().into());
        assert_eq!(debug_string(&array.clone().into()), "[1, [...]]");
        array.set_element(1, HostValue::Undefined);
    }

    #[test]
    fn test_other_classes() {
        let element = HostObject::with_classes(&["HTMLCanvasElement", "HTMLElement"]);
        assert_eq!(debug_string(&element.into()), "HTMLCanvasElement");
    }
}
