// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Generic object adapters: construction, properties and calls.

use hostlink_error::{Error, Result};
use log::trace;

use crate::{
    heap::Handle,
    value::{Completion, HostObject, HostValue},
    Bridge,
};

fn array_index(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    key.parse().ok()
}

/// Property read with host semantics
pub(crate) fn get_property(target: &HostValue, key: &str) -> Completion {
    match target {
        HostValue::Undefined | HostValue::Null => Err(HostValue::type_error(&format!(
            "Cannot read properties of {} (reading '{key}')",
            target.to_display_string()
        ))),
        HostValue::Object(object) if object.is_array() => {
            if key == "length" {
                return Ok(HostValue::Number(object.len() as f64));
            }
            match array_index(key) {
                Some(index) => Ok(object.element(index).unwrap_or_default()),
                None => Ok(object.get(key).unwrap_or_default()),
            }
        }
        HostValue::Object(object) => Ok(object.get(key).unwrap_or_default()),
        HostValue::String(s) if key == "length" => {
            Ok(HostValue::Number(s.encode_utf16().count() as f64))
        }
        HostValue::Function(f) if key == "name" => {
            Ok(HostValue::string(f.name().unwrap_or_default()))
        }
        _ => Ok(HostValue::Undefined),
    }
}

/// Property write with host semantics; writes to primitives are dropped
pub(crate) fn set_property(target: &HostValue, key: &str, value: HostValue) -> Completion<()> {
    match target {
        HostValue::Undefined | HostValue::Null => Err(HostValue::type_error(&format!(
            "Cannot set properties of {} (setting '{key}')",
            target.to_display_string()
        ))),
        HostValue::Object(object) => {
            match array_index(key).filter(|_| object.is_array()) {
                Some(index) => object.set_element(index, value),
                None => object.set(key, value),
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

impl Bridge {
    /// Call `target[name](...args)`
    ///
    /// # Errors
    ///
    /// Throws a `TypeError` when the property is not callable
    pub fn invoke_method(&self, target: &HostValue, name: &str, args: &[HostValue]) -> Completion {
        let method = get_property(target, name)?;
        let Some(function) = method.as_function() else {
            return Err(HostValue::type_error(&format!("{name} is not a function")));
        };
        trace!("invoking {name} on {}", target.type_name());
        function.call(self, target, args)
    }

    /// Handle to the global object
    ///
    /// # Errors
    ///
    /// Fails when the table is full
    pub fn global(&self) -> Result<u32> {
        Ok(self.allocate(HostValue::Object(self.global_object().clone()))?.index())
    }

    /// Handle to a new plain object
    ///
    /// # Errors
    ///
    /// Fails when the table is full
    pub fn object_new(&self) -> Result<u32> {
        Ok(self.allocate(HostValue::Object(HostObject::plain()))?.index())
    }

    /// Handle to a new array of `len` undefined elements
    ///
    /// # Errors
    ///
    /// Fails when the table is full
    pub fn array_new(&self, len: u32) -> Result<u32> {
        Ok(self.allocate(HostValue::Object(HostObject::array(len as usize)))?.index())
    }

    /// `array[index] = value`, consuming the `value` handle
    ///
    /// # Errors
    ///
    /// Fails for dead handles or when `array` is not an object
    pub fn array_set(&self, array: u32, index: u32, value: u32) -> Result<()> {
        let target = self.arg(array)?;
        let Some(object) = target.as_object() else {
            return Err(Error::type_mismatch("array_set target is not an object"));
        };
        let value = self.take_object(Handle::new(value))?;
        object.set_element(index as usize, value);
        Ok(())
    }

    /// `obj[name]`, or 0 when the result is `undefined` or `null`. Guarded.
    ///
    /// # Errors
    ///
    /// Fails for dead handles, bad strings or a full table
    pub fn get_property(&self, obj: u32, name_ptr: u32, name_len: u32) -> Result<u32> {
        let target = self.arg(obj)?;
        let name = self.str_arg(name_ptr, name_len)?;
        self.guard("get_property", || Ok(self.allocate_optional(get_property(&target, &name)?)?))
    }

    /// `obj[name] = value`, borrowing `value`. Guarded.
    ///
    /// # Errors
    ///
    /// Fails for dead handles or bad strings
    pub fn set_property(&self, obj: u32, name_ptr: u32, name_len: u32, value: u32) -> Result<()> {
        let target = self.arg(obj)?;
        let name = self.str_arg(name_ptr, name_len)?;
        let value = self.arg(value)?;
        self.guard("set_property", || set_property(&target, &name, value))
    }

    /// `Reflect.set(target, key, value)`. Guarded; `false` on throw.
    ///
    /// # Errors
    ///
    /// Fails for dead handles
    pub fn reflect_set(&self, target: u32, key: u32, value: u32) -> Result<bool> {
        let target = self.arg(target)?;
        let key = self.arg(key)?.to_display_string();
        let value = self.arg(value)?;
        self.guard("reflect_set", || {
            if target.as_object().is_none() {
                return Err(HostValue::type_error("Reflect.set called on non-object"));
            }
            set_property(&target, &key, value)?;
            Ok(true)
        })
    }

    /// Whether the value is an instance of `class`
    ///
    /// # Errors
    ///
    /// Fails for dead handles or bad strings
    pub fn instance_of(&self, handle: u32, class_ptr: u32, class_len: u32) -> Result<bool> {
        let value = self.arg(handle)?;
        let class = self.str_arg(class_ptr, class_len)?;
        Ok(match &value {
            HostValue::Object(object) => class == "Object" || object.is_instance_of(&class),
            HostValue::Function(_) => class == "Function" || class == "Object",
            _ => false,
        })
    }

    /// `func.call(this)`. Guarded; 0 on throw.
    ///
    /// # Errors
    ///
    /// Fails for dead handles, traps or a full table
    pub fn call(&self, func: u32, this: u32) -> Result<u32> {
        let function = self.arg(func)?;
        let this = self.arg(this)?;
        self.guard("call", || {
            let Some(function) = function.as_function() else {
                return Err(HostValue::type_error(&format!(
                    "{} is not a function",
                    function.type_name()
                )));
            };
            let result = function.call(self, &this, &[])?;
            Ok(self.allocate(result)?.index())
        })
    }

    /// `obj[name](...args)` where `args` is an array handle, or `undefined`
    /// for no arguments. Returns 0 for an `undefined` or `null` result.
    /// Guarded.
    ///
    /// # Errors
    ///
    /// Fails for dead handles, bad strings, traps or a full table
    pub fn call_method(&self, obj: u32, name_ptr: u32, name_len: u32, args: u32) -> Result<u32> {
        let target = self.arg(obj)?;
        let name = self.str_arg(name_ptr, name_len)?;
        let args = match self.arg(args)? {
            HostValue::Undefined => Vec::new(),
            HostValue::Object(array) if array.is_array() => array.elements(),
            _ => return Err(Error::type_mismatch("call_method arguments are not an array")),
        };
        self.guard("call_method", || {
            let result = self.invoke_method(&target, &name, &args)?;
            Ok(self.allocate_optional(result)?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_properties() {
        let array = HostValue::Object(HostObject::array(2));
        assert_eq!(get_property(&array, "length").unwrap(), HostValue::Number(2.0));
        set_property(&array, "3", HostValue::from("x")).unwrap();
        assert_eq!(get_property(&array, "length").unwrap(), HostValue::Number(4.0));
        assert_eq!(get_property(&array, "3").unwrap(), HostValue::from("x"));
        assert_eq!(get_property(&array, "03").unwrap(), HostValue::Undefined);
    }

    #[test]
    fn test_nullish_targets_throw() {
        assert!(get_property(&HostValue::Undefined, "x").is_err());
        assert!(set_property(&HostValue::Null, "x", HostValue::Null).is_err());
        assert!(set_property(&HostValue::from(1.0), "x", HostValue::Null).is_ok());
    }

    #[test]
    fn test_string_length_in_utf16_units() {
        assert_eq!(get_property(&HostValue::from("a😀"), "length").unwrap(), HostValue::Number(3.0));
    }
}
