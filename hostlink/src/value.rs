// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Host-native values.
//!
//! These are the values module code can only reach through handles: strings,
//! objects with identity, and callables. Everything is single-threaded and
//! shared through `Rc`; cloning an object or function aliases it.

use std::{cell::RefCell, collections::BTreeMap, fmt, rc::Rc};

use hostlink_error::Error;

use crate::{bridge::Bridge, closure::Trampoline};

/// Outcome of a host operation that may throw
#[derive(Debug, Clone)]
pub enum Fault {
    /// A host exception. Recoverable: adapters route it to the exception slot.
    Thrown(HostValue),
    /// A fatal bridge error that unwinds the current call path
    Trap(Error),
}

impl From<Error> for Fault {
    fn from(error: Error) -> Self {
        Self::Trap(error)
    }
}

/// Result of a host operation that may throw
pub type Completion<T = HostValue> = Result<T, Fault>;

/// A host-native value
#[derive(Clone, Default)]
pub enum HostValue {
    /// Absence of a value
    #[default]
    Undefined,
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// Double-precision number
    Number(f64),
    /// Immutable string
    String(Rc<str>),
    /// Object with identity
    Object(HostObject),
    /// Callable
    Function(HostFunction),
}

impl HostValue {
    /// Create a string value
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Self::String(s.into())
    }

    /// Create an error object as the host would throw it
    #[must_use]
    pub fn error(name: &str, message: &str) -> Self {
        let object = if name == "Error" {
            HostObject::new("Error")
        } else {
            HostObject::with_classes(&[name, "Error"])
        };
        object.set("name", Self::string(name));
        object.set("message", Self::string(message));
        object.set("stack", Self::string(format!("{name}: {message}\n    at <host>")));
        Self::Object(object)
    }

    /// Shorthand for a thrown `TypeError`
    #[must_use]
    pub fn type_error(message: &str) -> Fault {
        Fault::Thrown(Self::error("TypeError", message))
    }

    /// `true` for `undefined`
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// `true` for `null`
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// `true` for `undefined` or `null`
    #[must_use]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Borrow the string contents
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric value, if this is a number
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean value, if this is a boolean
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Object reference, if this is an object
    #[must_use]
    pub fn as_object(&self) -> Option<&HostObject> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Function reference, if this is a function
    #[must_use]
    pub fn as_function(&self) -> Option<&HostFunction> {
        match self {
            Self::Function(f) => Some(f),
            _ => None,
        }
    }

    /// The `typeof` name of the value
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null | Self::Object(_) => "object",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Function(_) => "function",
        }
    }

    /// String conversion as used for property keys and storage values
    #[must_use]
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Undefined => "undefined".to_string(),
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::String(s) => s.to_string(),
            Self::Object(o) if o.is_array() => o
                .elements()
                .iter()
                .map(|v| if v.is_nullish() { String::new() } else { v.to_display_string() })
                .collect::<Vec<_>>()
                .join(","),
            Self::Object(o) if o.is_instance_of("Error") => {
                let name = o.get("name").map(|v| v.to_display_string()).unwrap_or_default();
                let message = o.get("message").map(|v| v.to_display_string()).unwrap_or_default();
                format!("{name}: {message}")
            }
            Self::Object(_) => "[object Object]".to_string(),
            Self::Function(f) => format!("function {}() {{ [native code] }}", f.name().unwrap_or("")),
        }
    }

    /// Strict equality: primitives by value, objects and functions by identity
    #[must_use]
    pub fn strict_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            #[allow(clippy::float_cmp)]
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl PartialEq for HostValue {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Object(o) => write!(f, "{o:?}"),
            Self::Function(func) => write!(f, "{func:?}"),
        }
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        Self::string(s)
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<HostObject> for HostValue {
    fn from(o: HostObject) -> Self {
        Self::Object(o)
    }
}

impl From<HostFunction> for HostValue {
    fn from(f: HostFunction) -> Self {
        Self::Function(f)
    }
}

/// Render a number the way the host prints it
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{n}")
    }
}

#[derive(Default)]
struct ObjectData {
    /// Most-derived class first
    classes: Vec<String>,
    properties: BTreeMap<String, HostValue>,
    elements: Vec<HostValue>,
}

/// A host object with identity
#[derive(Clone)]
pub struct HostObject(Rc<RefCell<ObjectData>>);

impl HostObject {
    /// Create an object of a single class
    #[must_use]
    pub fn new(class: &str) -> Self {
        Self::with_classes(&[class])
    }

    /// Create a plain `Object`
    #[must_use]
    pub fn plain() -> Self {
        Self::new("Object")
    }

    /// Create an object with a class chain, most-derived first
    #[must_use]
    pub fn with_classes(classes: &[&str]) -> Self {
        Self(Rc::new(RefCell::new(ObjectData {
            classes: classes.iter().map(|c| (*c).to_string()).collect(),
            ..ObjectData::default()
        })))
    }

    /// Create an array of `len` undefined elements
    #[must_use]
    pub fn array(len: usize) -> Self {
        let array = Self::new("Array");
        array.0.borrow_mut().elements = vec![HostValue::Undefined; len];
        array
    }

    /// Create an array from values
    #[must_use]
    pub fn array_from(values: Vec<HostValue>) -> Self {
        let array = Self::new("Array");
        array.0.borrow_mut().elements = values;
        array
    }

    /// Most-derived class name
    #[must_use]
    pub fn class_name(&self) -> String {
        self.0.borrow().classes.first().cloned().unwrap_or_else(|| "Object".to_string())
    }

    /// Whether `class` appears in the class chain
    #[must_use]
    pub fn is_instance_of(&self, class: &str) -> bool {
        self.0.borrow().classes.iter().any(|c| c == class)
    }

    /// Whether this object is an array
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.is_instance_of("Array")
    }

    /// Read a property
    #[must_use]
    pub fn get(&self, key: &str) -> Option<HostValue> {
        self.0.borrow().properties.get(key).cloned()
    }

    /// Write a property
    pub fn set(&self, key: &str, value: HostValue) {
        self.0.borrow_mut().properties.insert(key.to_string(), value);
    }

    /// Remove a property, returning the previous value
    pub fn remove(&self, key: &str) -> Option<HostValue> {
        self.0.borrow_mut().properties.remove(key)
    }

    /// Property names in order
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().properties.keys().cloned().collect()
    }

    /// Number of indexed elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().elements.len()
    }

    /// Whether there are no indexed elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read an indexed element
    #[must_use]
    pub fn element(&self, index: usize) -> Option<HostValue> {
        self.0.borrow().elements.get(index).cloned()
    }

    /// Write an indexed element, extending with `undefined` as needed
    pub fn set_element(&self, index: usize, value: HostValue) {
        let mut data = self.0.borrow_mut();
        if data.elements.len() <= index {
            data.elements.resize(index + 1, HostValue::Undefined);
        }
        data.elements[index] = value;
    }

    /// Snapshot of the indexed elements
    #[must_use]
    pub fn elements(&self) -> Vec<HostValue> {
        self.0.borrow().elements.clone()
    }

    /// Install a native method
    pub fn define_method<F>(&self, name: &str, f: F)
    where
        F: Fn(&Bridge, &HostValue, &[HostValue]) -> Completion + 'static,
    {
        self.set(name, HostValue::Function(HostFunction::native(name, f)));
    }

    /// Identity comparison
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Stable identity for cycle detection while the object is alive
    #[must_use]
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("HostObject")
            .field("class", &data.classes.first())
            .field("properties", &data.properties.len())
            .field("elements", &data.elements.len())
            .finish()
    }
}

/// Signature of a native host callable: `(bridge, this, args)`
pub type NativeCallback = dyn Fn(&Bridge, &HostValue, &[HostValue]) -> Completion;

/// A host callable
#[derive(Clone)]
pub enum HostFunction {
    /// Implemented by the host
    Native {
        /// Function name
        name: Rc<str>,
        /// Implementation
        callback: Rc<NativeCallback>,
    },
    /// A module closure behind a trampoline
    Closure(Rc<Trampoline>),
}

impl HostFunction {
    /// Wrap a native callback
    pub fn native<F>(name: &str, f: F) -> Self
    where
        F: Fn(&Bridge, &HostValue, &[HostValue]) -> Completion + 'static,
    {
        Self::Native { name: Rc::from(name), callback: Rc::new(f) }
    }

    /// Function name; closures are anonymous
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Native { name, .. } if !name.is_empty() => Some(name),
            _ => None,
        }
    }

    /// The trampoline behind a closure
    #[must_use]
    pub fn as_closure(&self) -> Option<&Rc<Trampoline>> {
        match self {
            Self::Closure(trampoline) => Some(trampoline),
            Self::Native { .. } => None,
        }
    }

    /// Invoke with an explicit receiver
    ///
    /// # Errors
    ///
    /// Returns `Fault::Thrown` for host exceptions and `Fault::Trap` for
    /// fatal errors raised by module code or the bridge
    pub fn call(&self, bridge: &Bridge, this: &HostValue, args: &[HostValue]) -> Completion {
        match self {
            Self::Native { callback, .. } => callback(bridge, this, args),
            Self::Closure(trampoline) => trampoline.invoke(bridge, args),
        }
    }

    /// Identity comparison
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Native { callback: a, .. }, Self::Native { callback: b, .. }) => {
                Rc::ptr_eq(a, b)
            }
            (Self::Closure(a), Self::Closure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native { name, .. } => write!(f, "Function({name})"),
            Self::Closure(trampoline) => write!(f, "Closure({:?})", trampoline.context()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objects_alias_on_clone() {
        let a = HostObject::plain();
        let b = a.clone();
        b.set("width", HostValue::Number(10.0));
        assert_eq!(a.get("width"), Some(HostValue::Number(10.0)));
        assert!(HostValue::Object(a).strict_equals(&HostValue::Object(b)));
        assert_ne!(HostValue::Object(HostObject::plain()), HostValue::Object(HostObject::plain()));
    }

    #[test]
    fn test_array_elements() {
        let array = HostObject::array(2);
        assert!(array.is_array());
        assert_eq!(array.len(), 2);
        array.set_element(4, HostValue::from("x"));
        assert_eq!(array.len(), 5);
        assert_eq!(array.element(3), Some(HostValue::Undefined));
        assert_eq!(array.element(4), Some(HostValue::from("x")));
    }

    #[test]
    fn test_error_objects() {
        let error = HostValue::error("SyntaxError", "bad selector");
        let object = error.as_object().unwrap();
        assert!(object.is_instance_of("SyntaxError"));
        assert!(object.is_instance_of("Error"));
        assert_eq!(error.to_display_string(), "SyntaxError: bad selector");
    }

    #[test]
    fn test_display_strings() {
        assert_eq!(HostValue::Number(1.0).to_display_string(), "1");
        assert_eq!(HostValue::Number(1.5).to_display_string(), "1.5");
        assert_eq!(HostValue::Number(-0.0).to_display_string(), "0");
        assert_eq!(HostValue::Number(f64::NAN).to_display_string(), "NaN");
        assert_eq!(HostValue::Number(f64::NEG_INFINITY).to_display_string(), "-Infinity");
        assert_eq!(HostValue::Null.to_display_string(), "null");
        let array = HostObject::array_from(vec![1.0.into(), HostValue::Null, "a".into()]);
        assert_eq!(HostValue::Object(array).to_display_string(), "1,,a");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(HostValue::Null.type_name(), "object");
        assert_eq!(HostValue::Undefined.type_name(), "undefined");
        let f = HostFunction::native("f", |_, _, _| Ok(HostValue::Undefined));
        assert_eq!(HostValue::Function(f).type_name(), "function");
    }
}
