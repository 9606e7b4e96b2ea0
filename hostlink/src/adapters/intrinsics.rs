// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Value construction, inspection, lifetime and diagnostics adapters.

use core::convert::Infallible;
use std::rc::Rc;

use hostlink_error::{Error, Result};
use hostlink_logging::LogLevel;
use log::{debug, error};

use crate::{
    closure::{ClosureExports, Trampoline},
    debug::debug_string,
    heap::Handle,
    value::{HostFunction, HostValue},
    Bridge,
};

impl Bridge {
    /// New string handle from module memory
    ///
    /// # Errors
    ///
    /// Fails on malformed UTF-8, bad ranges or a full table
    pub fn string_new(&self, ptr: u32, len: u32) -> Result<u32> {
        let s = self.str_arg(ptr, len)?;
        Ok(self.allocate(HostValue::string(s))?.index())
    }

    /// New number handle
    ///
    /// # Errors
    ///
    /// Fails when the table is full
    pub fn number_new(&self, value: f64) -> Result<u32> {
        Ok(self.allocate(HostValue::Number(value))?.index())
    }

    /// The number behind `handle`, or NaN for anything else
    ///
    /// # Errors
    ///
    /// Fails for dead handles
    pub fn number_get(&self, handle: u32) -> Result<f64> {
        Ok(self.arg(handle)?.as_number().unwrap_or(f64::NAN))
    }

    /// 1 for true, 0 for false, 2 when the value is not a boolean
    ///
    /// # Errors
    ///
    /// Fails for dead handles
    pub fn bool_get(&self, handle: u32) -> Result<u32> {
        Ok(match self.arg(handle)?.as_bool() {
            Some(true) => 1,
            Some(false) => 0,
            None => 2,
        })
    }

    /// Copy the string behind `handle` into module memory and write
    /// `(ptr, len)` at `retptr`; `(0, 0)` when it is not a string
    ///
    /// # Errors
    ///
    /// Fails for dead handles, allocator failures or a bad return slot
    pub fn string_get(&self, retptr: u32, handle: u32) -> Result<()> {
        let value = self.arg(handle)?;
        self.write_string_result(retptr, value.as_str())
    }

    /// New handle for the same value
    ///
    /// # Errors
    ///
    /// Fails for dead handles or a full table
    pub fn object_clone_ref(&self, handle: u32) -> Result<u32> {
        Ok(self.duplicate(Handle::new(handle))?.index())
    }

    /// Release a handle
    ///
    /// # Errors
    ///
    /// Returns a contract violation for dead handles
    pub fn object_drop_ref(&self, handle: u32) -> Result<()> {
        self.release(Handle::new(handle))
    }

    /// Whether the value is `undefined`
    ///
    /// # Errors
    ///
    /// Fails for dead handles
    pub fn is_undefined(&self, handle: u32) -> Result<bool> {
        Ok(self.arg(handle)?.is_undefined())
    }

    /// Whether the value is `null`
    ///
    /// # Errors
    ///
    /// Fails for dead handles
    pub fn is_null(&self, handle: u32) -> Result<bool> {
        Ok(self.arg(handle)?.is_null())
    }

    /// Whether the value is a non-null object. Functions are not objects
    /// here.
    ///
    /// # Errors
    ///
    /// Fails for dead handles
    pub fn is_object(&self, handle: u32) -> Result<bool> {
        Ok(self.arg(handle)?.as_object().is_some())
    }

    /// Whether the value is callable
    ///
    /// # Errors
    ///
    /// Fails for dead handles
    pub fn is_function(&self, handle: u32) -> Result<bool> {
        Ok(self.arg(handle)?.as_function().is_some())
    }

    /// Write the debug rendering of `handle` as `(ptr, len)` at `retptr`
    ///
    /// # Errors
    ///
    /// Fails for dead handles, allocator failures or a bad return slot
    pub fn debug_string(&self, retptr: u32, handle: u32) -> Result<()> {
        let rendered = debug_string(&self.arg(handle)?);
        self.write_string_result(retptr, Some(&rendered))
    }

    /// Raise a fatal error for a module message. Never returns normally.
    /// The message stays readable through [`Bridge::last_throw`].
    ///
    /// # Errors
    ///
    /// Always
    pub fn throw(&self, ptr: u32, len: u32) -> Result<Infallible> {
        let message = self.str_arg(ptr, len)?;
        error!(target: self.config().log_target.as_str(), "module threw: {message}");
        self.record_throw(message);
        Err(Error::module_throw("Module raised a fatal error"))
    }

    /// Forward a module message at info level
    ///
    /// # Errors
    ///
    /// Fails on malformed UTF-8 or bad ranges
    pub fn log(&self, ptr: u32, len: u32) -> Result<()> {
        let message = self.str_arg(ptr, len)?;
        self.log_module(LogLevel::Info, message);
        Ok(())
    }

    /// Forward a module message at error level, then return the string's
    /// memory to the module. The memory is freed even when decoding fails.
    ///
    /// # Errors
    ///
    /// Reports the decoding failure first, then any failure to free
    pub fn error(&self, ptr: u32, len: u32) -> Result<()> {
        let logged = self.str_arg(ptr, len).map(|message| self.log_module(LogLevel::Error, message));
        let freed = self.module().free(self, ptr, len);
        logged.and(freed)
    }

    /// Wrap a module closure `(a, b)` as a host function
    ///
    /// # Errors
    ///
    /// Fails when the table is full
    pub fn closure_wrapper(&self, a: u32, b: u32, invoke: u32, destructor: u32) -> Result<u32> {
        let trampoline = Trampoline::new(a, b, ClosureExports { invoke, destructor });
        let handle = self.allocate(HostValue::Function(HostFunction::Closure(Rc::new(trampoline))))?;
        debug!("closure ({a}, {b}) wrapped as {handle}");
        Ok(handle.index())
    }

    /// Release a closure handle and drop the host's reference to the closure.
    /// Returns `true` when the destructor ran now.
    ///
    /// # Errors
    ///
    /// Returns a contract violation when the handle is not a live closure or
    /// the closure was already dropped
    pub fn cb_drop(&self, handle: u32) -> Result<bool> {
        let value = self.arg(handle)?;
        let Some(trampoline) = value.as_function().and_then(HostFunction::as_closure) else {
            return Err(Error::type_mismatch("Handle does not refer to a closure"));
        };
        self.release(Handle::new(handle))?;
        trampoline.release(self)
    }

    /// Take the pending exception handle, or 0 when there is none
    pub fn exn_take(&self) -> u32 {
        self.take_exception().map_or(0, Handle::index)
    }
}
