// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Callback registry for import functions.
//!
//! This module provides a registry for the functions a module imports from
//! the host, plus typed slots for auxiliary callbacks such as logging.

use core::{any::Any, fmt};
use std::collections::HashMap;

use hostlink_error::{Error, Result};

use crate::{function::HostFunctionHandler, value::Val};

/// Types of callbacks that can be registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CallbackType {
    /// Handler for module log messages
    Logging,
}

/// A callback registry for handling module imports
#[derive(Default)]
pub struct CallbackRegistry {
    /// Generic callback storage for different types of callbacks
    callbacks: HashMap<CallbackType, Box<dyn Any + Send + Sync>>,

    /// Import registry (module name -> function name -> handler)
    host_functions: HashMap<String, HashMap<String, HostFunctionHandler>>,
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("registered_callbacks", &self.callbacks.keys())
            .field("registered_modules", &self.host_functions.keys())
            .finish()
    }
}

impl CallbackRegistry {
    /// Create a new callback registry
    #[must_use]
    pub fn new() -> Self {
        Self { callbacks: HashMap::new(), host_functions: HashMap::new() }
    }

    /// Register a callback
    pub fn register_callback<T: 'static + Send + Sync>(
        &mut self,
        callback_type: CallbackType,
        callback: T,
    ) {
        self.callbacks.insert(callback_type, Box::new(callback));
    }

    /// Get a callback
    #[must_use]
    pub fn get_callback<T: 'static + Send + Sync>(
        &self,
        callback_type: &CallbackType,
    ) -> Option<&T> {
        self.callbacks.get(callback_type).and_then(|cb| cb.downcast_ref())
    }

    /// Register an import function
    pub fn register_host_function(
        &mut self,
        module_name: &str,
        function_name: &str,
        handler: HostFunctionHandler,
    ) {
        let module_functions = self.host_functions.entry(module_name.to_string()).or_default();
        module_functions.insert(function_name.to_string(), handler);
    }

    /// Check if an import function is registered
    #[must_use]
    pub fn has_host_function(&self, module_name: &str, function_name: &str) -> bool {
        self.host_functions.get(module_name).and_then(|funcs| funcs.get(function_name)).is_some()
    }

    /// Look up an import function handler
    #[must_use]
    pub fn get_host_function(
        &self,
        module_name: &str,
        function_name: &str,
    ) -> Option<&HostFunctionHandler> {
        self.host_functions.get(module_name).and_then(|funcs| funcs.get(function_name))
    }

    /// Call an import function
    ///
    /// # Errors
    ///
    /// Returns an error if the function is not found or fails during
    /// execution
    pub fn call_host_function(
        &self,
        target: &dyn Any,
        module_name: &str,
        function_name: &str,
        args: Vec<Val>,
    ) -> Result<Vec<Val>> {
        if let Some(handler) = self.get_host_function(module_name, function_name) {
            log::trace!("import {}", function_key(module_name, function_name));
            return handler.call(target, args);
        }

        log::debug!("import {} is not registered", function_key(module_name, function_name));
        Err(Error::import_not_found("Import function not found"))
    }

    /// Get all registered function names for a module
    #[must_use]
    pub fn get_registered_functions(&self, module_name: &str) -> Vec<&String> {
        if let Some(module_functions) = self.host_functions.get(module_name) {
            module_functions.keys().collect()
        } else {
            Vec::new()
        }
    }
}

impl Clone for CallbackRegistry {
    fn clone(&self) -> Self {
        let mut new_registry = Self::new();

        for (module_name, function_map) in &self.host_functions {
            for (function_name, handler) in function_map {
                new_registry.register_host_function(module_name, function_name, handler.clone());
            }
        }

        // Typed callbacks are `Any` and cannot be cloned; they are not carried over

        new_registry
    }
}

/// Generate a unique function key from module and function names
///
/// # Returns
///
/// A string in the format `module_name::function_name`
#[must_use]
pub fn function_key(module_name: &str, function_name: &str) -> String {
    format!("{module_name}::{function_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_registry() {
        let mut registry = CallbackRegistry::new();

        let handler = HostFunctionHandler::new(|_, _| Ok(vec![Val::I32(42)]));
        registry.register_host_function("test_module", "test_function", handler);

        assert!(registry.has_host_function("test_module", "test_function"));
        assert!(!registry.has_host_function("nonexistent", "function"));

        let target = ();
        let result = registry.call_host_function(&target, "test_module", "test_function", vec![]);
        match result {
            Ok(values) => {
                assert_eq!(values.len(), 1);
                assert!(matches!(values[0], Val::I32(42)));
            }
            Err(_) => panic!("Expected successful function call"),
        }

        let err = registry.call_host_function(&target, "nonexistent", "function", vec![]);
        assert_eq!(err.unwrap_err().code, hostlink_error::codes::IMPORT_NOT_FOUND);
    }

    #[test]
    fn test_callback_registry_callback() {
        let mut registry = CallbackRegistry::new();

        registry.register_callback(CallbackType::Logging, 42);

        let callback = registry.get_callback::<i32>(&CallbackType::Logging);
        assert_eq!(callback.copied(), Some(42));

        registry.register_callback(CallbackType::Logging, 24);
        assert_eq!(registry.get_callback::<i32>(&CallbackType::Logging).copied(), Some(24));
        assert!(registry.get_callback::<u8>(&CallbackType::Logging).is_none());
    }

    #[test]
    fn test_clone_keeps_functions() {
        let mut registry = CallbackRegistry::new();
        registry.register_host_function("m", "f", HostFunctionHandler::new(|_, _| Ok(vec![])));
        registry.register_callback(CallbackType::Logging, 1_u8);

        let cloned = registry.clone();
        assert!(cloned.has_host_function("m", "f"));
        assert!(cloned.get_callback::<u8>(&CallbackType::Logging).is_none());
        assert_eq!(cloned.get_registered_functions("m"), vec![&"f".to_string()]);
    }

    #[test]
    fn test_function_key() {
        assert_eq!(function_key("hostlink", "string_new"), "hostlink::string_new");
    }
}
