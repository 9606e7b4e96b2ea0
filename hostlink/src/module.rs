// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The module side of the boundary.
//!
//! [`ModuleExports`] is what the bridge needs from a compiled module: its
//! allocator, its function table and its start hook. Every entry point
//! receives the bridge so module code can call imports reentrantly.

use hostlink_error::Result;
use hostlink_host::Val;

use crate::bridge::Bridge;

/// Exports of an instantiated module
pub trait ModuleExports {
    /// Allocate `size` bytes, returning the address
    ///
    /// # Errors
    ///
    /// Fails when memory cannot be grown to fit the allocation
    fn malloc(&self, bridge: &Bridge, size: u32) -> Result<u32>;

    /// Resize an allocation, possibly moving it
    ///
    /// # Errors
    ///
    /// Fails when memory cannot be grown to fit the allocation
    fn realloc(&self, bridge: &Bridge, ptr: u32, old_size: u32, new_size: u32) -> Result<u32>;

    /// Whether [`ModuleExports::realloc`] is exported
    fn has_realloc(&self) -> bool {
        true
    }

    /// Return an allocation to the module
    ///
    /// # Errors
    ///
    /// Implementation defined
    fn free(&self, bridge: &Bridge, ptr: u32, size: u32) -> Result<()>;

    /// Call the function at `index` in the module's table
    ///
    /// # Errors
    ///
    /// Fails when the index is not in the table or the function traps
    fn call(&self, bridge: &Bridge, index: u32, args: &[Val]) -> Result<Vec<Val>>;

    /// Run the module's one-time initialization
    ///
    /// # Errors
    ///
    /// Propagates traps raised by the initializer
    fn set_up(&self, bridge: &Bridge) -> Result<()>;
}
