// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Builder for import registries.

use hostlink_error::{Error, Result};

use crate::{callback::CallbackRegistry, function::HostFunctionHandler};

/// Builder for a [`CallbackRegistry`]
#[derive(Default)]
pub struct HostBuilder {
    functions: Vec<(String, String, HostFunctionHandler)>,
    module_name: Option<String>,
}

impl HostBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an import function
    #[must_use]
    pub fn with_host_function(
        mut self,
        module_name: &str,
        function_name: &str,
        handler: HostFunctionHandler,
    ) -> Self {
        self.functions.push((module_name.to_string(), function_name.to_string(), handler));
        self
    }

    /// Name the module being hosted (informational)
    #[must_use]
    pub fn with_module_name(mut self, name: &str) -> Self {
        self.module_name = Some(name.to_string());
        self
    }

    /// Build the registry
    ///
    /// # Errors
    ///
    /// Returns an error if the same import is registered twice
    pub fn build(self) -> Result<CallbackRegistry> {
        let mut registry = CallbackRegistry::new();
        for (module_name, function_name, handler) in self.functions {
            if registry.has_host_function(&module_name, &function_name) {
                return Err(Error::invalid_state("Import function registered twice"));
            }
            registry.register_host_function(&module_name, &function_name, handler);
        }
        log::debug!("built import registry for module {:?}", self.module_name);
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Val;

    #[test]
    fn test_builder() {
        let registry = HostBuilder::new()
            .with_host_function(
                "env",
                "answer",
                HostFunctionHandler::new(|_, _| Ok(vec![Val::I32(42)])),
            )
            .with_module_name("editor")
            .build()
            .unwrap();

        let target = ();
        assert_eq!(
            registry.call_host_function(&target, "env", "answer", vec![]).unwrap(),
            vec![Val::I32(42)]
        );
    }

    #[test]
    fn test_builder_rejects_duplicates() {
        let handler = HostFunctionHandler::new(|_, _| Ok(vec![]));
        let result = HostBuilder::new()
            .with_host_function("env", "f", handler.clone())
            .with_host_function("env", "f", handler)
            .build();
        assert!(result.is_err());
    }
}
