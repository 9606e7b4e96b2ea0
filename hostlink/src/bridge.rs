// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The bridge between one module instance and the host.
//!
//! A [`Bridge`] owns the handle table, the memory views and the exception
//! slot for a single module instance. All entry points take `&self`: module
//! code calls back into the bridge while the bridge is calling into it, so
//! interior state is only ever borrowed for the duration of one step and
//! never across a call into host or module code.

use std::{
    cell::{Cell, Ref, RefCell},
    rc::Rc,
};

use hostlink_error::{Error, Result};
use hostlink_host::{CallbackRegistry, Val};
use hostlink_logging::{LogLevel, LogOperation, LoggingExt};
use log::{debug, info, trace, warn};

use crate::{
    config::BridgeConfig,
    exception::ExceptionSlot,
    heap::{Handle, HeapTable},
    imports,
    memory::{LinearMemory, ViewCache},
    module::ModuleExports,
    transcode::{self, Encoded, Realloc},
    value::{Completion, Fault, HostObject, HostValue},
};

/// Glue state for one module instance
pub struct Bridge {
    config: BridgeConfig,
    heap: RefCell<HeapTable>,
    views: ViewCache,
    exception: ExceptionSlot,
    module: Rc<dyn ModuleExports>,
    global: HostObject,
    imports: CallbackRegistry,
    min_log_level: LogLevel,
    last_throw: RefCell<Option<String>>,
    initialized: Cell<bool>,
}

impl core::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Bridge")
            .field("config", &self.config)
            .field("heap", &*self.heap.borrow())
            .field("views", &self.views)
            .field("exception", &self.exception)
            .field("initialized", &self.initialized.get())
            .finish_non_exhaustive()
    }
}

impl Bridge {
    /// Create a bridge for a module instance.
    ///
    /// The import functions are registered under `config.import_module`.
    /// `global` is what the module sees as the global object.
    pub fn new(
        memory: Rc<dyn LinearMemory>,
        module: Rc<dyn ModuleExports>,
        global: HostObject,
        config: BridgeConfig,
    ) -> Self {
        let mut registry = CallbackRegistry::new();
        imports::register(&mut registry, &config.import_module);
        debug!(
            "bridge created with {} imports under '{}'",
            registry.get_registered_functions(&config.import_module).len(),
            config.import_module
        );
        let min_log_level = config.log_level_threshold().unwrap_or_else(|_| {
            warn!("unknown minimum log level '{}', keeping all module messages", config.min_log_level);
            LogLevel::Trace
        });
        Self {
            heap: RefCell::new(HeapTable::with_max_handles(config.max_handles)),
            views: ViewCache::new(memory),
            exception: ExceptionSlot::new(),
            module,
            global,
            imports: registry,
            min_log_level,
            last_throw: RefCell::new(None),
            initialized: Cell::new(false),
            config,
        }
    }

    /// Bridge settings
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Memory views
    #[must_use]
    pub fn views(&self) -> &ViewCache {
        &self.views
    }

    /// The module's exports
    #[must_use]
    pub fn module(&self) -> &Rc<dyn ModuleExports> {
        &self.module
    }

    /// The object the module sees as global
    #[must_use]
    pub fn global_object(&self) -> &HostObject {
        &self.global
    }

    /// Import registry
    #[must_use]
    pub fn imports(&self) -> &CallbackRegistry {
        &self.imports
    }

    /// Import registry, for installing a log handler or extra imports
    pub fn imports_mut(&mut self) -> &mut CallbackRegistry {
        &mut self.imports
    }

    /// Inspect the handle table. Do not hold the guard across bridge calls.
    #[must_use]
    pub fn heap(&self) -> Ref<'_, HeapTable> {
        self.heap.borrow()
    }

    /// Whether `set_up` has run
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    /// Run the module's initializer. Allowed exactly once.
    ///
    /// # Errors
    ///
    /// Returns an invalid-state error on a second call and propagates traps
    /// from the initializer
    pub fn set_up(&self) -> Result<()> {
        if self.initialized.replace(true) {
            return Err(Error::invalid_state("Module is already initialized"));
        }
        self.module.set_up(self)?;
        info!("module initialized");
        Ok(())
    }

    /// Drop every host value and any pending exception
    pub fn reset(&self) {
        self.heap.borrow_mut().reset();
        self.exception.take();
        self.last_throw.replace(None);
        debug!("bridge reset");
    }

    /// Call an export from the module's table
    ///
    /// # Errors
    ///
    /// Propagates lookup failures and traps
    pub fn call_export(&self, index: u32, args: &[Val]) -> Result<Vec<Val>> {
        self.module.call(self, index, args)
    }

    /// Dispatch an import call by name, as module code would
    ///
    /// # Errors
    ///
    /// Returns a runtime error for unknown imports and propagates the
    /// import's own failures
    pub fn call_import(&self, name: &str, args: Vec<Val>) -> Result<Vec<Val>> {
        self.imports.call_host_function(self, &self.config.import_module, name, args)
    }

    // Handle table

    /// Store a value in a fresh handle
    ///
    /// # Errors
    ///
    /// Fails when the handle table is full
    pub fn allocate(&self, value: HostValue) -> Result<Handle> {
        self.heap.borrow_mut().allocate(value)
    }

    /// Store a value, mapping `undefined` and `null` to handle 0
    ///
    /// # Errors
    ///
    /// Fails when the handle table is full
    pub fn allocate_optional(&self, value: HostValue) -> Result<u32> {
        if value.is_nullish() {
            return Ok(Handle::UNDEFINED.index());
        }
        Ok(self.allocate(value)?.index())
    }

    /// Clone the value behind a handle
    ///
    /// # Errors
    ///
    /// Returns a contract violation for dead handles
    pub fn object(&self, handle: Handle) -> Result<HostValue> {
        self.heap.borrow().get(handle).cloned()
    }

    /// Read and release a handle
    ///
    /// # Errors
    ///
    /// Returns a contract violation for dead handles
    pub fn take_object(&self, handle: Handle) -> Result<HostValue> {
        self.heap.borrow_mut().take(handle)
    }

    /// Release a handle
    ///
    /// # Errors
    ///
    /// Returns a contract violation for dead handles
    pub fn release(&self, handle: Handle) -> Result<()> {
        self.heap.borrow_mut().release(handle)
    }

    /// Allocate a second handle for the same value
    ///
    /// # Errors
    ///
    /// Fails for dead handles or a full table
    pub fn duplicate(&self, handle: Handle) -> Result<Handle> {
        self.heap.borrow_mut().duplicate(handle)
    }

    /// Number of live handles, sentinels excluded
    #[must_use]
    pub fn live_handles(&self) -> usize {
        self.heap.borrow().live_count()
    }

    // Strings

    /// Decode a module string
    ///
    /// # Errors
    ///
    /// Fails on malformed UTF-8 or out-of-bounds ranges
    pub fn decode_string(&self, ptr: u32, len: u32) -> Result<String> {
        transcode::decode(&self.views, ptr, len)
    }

    /// Copy a string into module memory allocated by the module
    ///
    /// # Errors
    ///
    /// Propagates allocator and memory failures
    pub fn encode_string(&self, s: &str) -> Result<Encoded> {
        let module = &self.module;
        let mut malloc = |size| module.malloc(self, size);
        let mut grow = |ptr, old, new| module.realloc(self, ptr, old, new);
        let realloc: Option<Realloc<'_>> = if module.has_realloc() { Some(&mut grow) } else { None };
        let encoded =
            transcode::encode(&self.views, s, &mut malloc, realloc, self.config.ascii_fast_path)?;
        trace!("encoded {} byte string at {}", encoded.len, encoded.ptr);
        Ok(encoded)
    }

    /// Write an optional string as a `(ptr, len)` pair at `retptr`;
    /// `None` is written as `(0, 0)`
    ///
    /// # Errors
    ///
    /// Propagates encoding failures and misaligned or out-of-bounds slots
    pub fn write_string_result(&self, retptr: u32, s: Option<&str>) -> Result<()> {
        let Encoded { ptr, len } = match s {
            Some(s) => self.encode_string(s)?,
            None => Encoded { ptr: 0, len: 0 },
        };
        self.views.write_pair(retptr, ptr, len)
    }

    // Exceptions

    /// Park a host exception for the module to collect
    ///
    /// # Errors
    ///
    /// Fails when the handle table is full
    pub fn store_exception(&self, value: HostValue) -> Result<()> {
        let handle = self.allocate(value)?;
        if let Some(previous) = self.exception.store(handle) {
            warn!("exception {previous} was never taken; discarding it");
            self.release(previous)?;
        }
        Ok(())
    }

    /// Take the pending exception
    pub fn take_exception(&self) -> Option<Handle> {
        self.exception.take()
    }

    /// Whether an exception is waiting to be taken
    #[must_use]
    pub fn has_pending_exception(&self) -> bool {
        self.exception.is_set()
    }

    /// Message of the most recent fatal `throw` raised by the module
    #[must_use]
    pub fn last_throw(&self) -> Option<String> {
        self.last_throw.borrow().clone()
    }

    pub(crate) fn record_throw(&self, message: String) {
        self.last_throw.replace(Some(message));
    }

    /// Run an adapter body. A host exception is parked in the exception slot
    /// and the neutral value returned; a trap propagates.
    ///
    /// # Errors
    ///
    /// Propagates traps
    pub fn guard<T: Default>(
        &self,
        operation: &'static str,
        body: impl FnOnce() -> Completion<T>,
    ) -> Result<T> {
        match body() {
            Ok(value) => Ok(value),
            Err(Fault::Thrown(exception)) => {
                debug!("{operation}: host threw {}", exception.to_display_string());
                self.store_exception(exception)?;
                Ok(T::default())
            }
            Err(Fault::Trap(error)) => Err(error),
        }
    }

    // Logging

    /// Route a module message to the registered handler or the `log` facade
    pub fn log_module(&self, level: LogLevel, message: String) {
        if level < self.min_log_level {
            trace!("dropped module {} message below threshold", level.as_str());
            return;
        }
        let operation = match &self.config.component_id {
            Some(component) => LogOperation::with_component(level, message, component.as_str()),
            None => LogOperation::new(level, message),
        };
        self.imports.handle_log_or_forward(operation, &self.config.log_target);
    }
}
