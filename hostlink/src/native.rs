// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! A module implemented with Rust closures over a [`VecMemory`].
//!
//! Useful for embedding and for driving the bridge in tests. Allocation is a
//! bump allocator that grows memory on demand; `free` only keeps count.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use hostlink_error::{Error, Result};
use hostlink_host::Val;
use log::trace;

use crate::{
    bridge::Bridge,
    memory::{LinearMemory, VecMemory, PAGE_SIZE},
    module::ModuleExports,
};

/// Signature of a table entry
pub type ModuleFn = dyn Fn(&Bridge, &[Val]) -> Result<Vec<Val>>;

const ALIGN: u32 = 8;

/// Counters kept by [`NativeModule`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocStats {
    /// Calls to `malloc`
    pub mallocs: u32,
    /// Calls to `realloc`
    pub reallocs: u32,
    /// Calls to `free`
    pub frees: u32,
}

/// Closure-backed module
pub struct NativeModule {
    memory: Rc<VecMemory>,
    top: Cell<u32>,
    /// Start of the most recent allocation, which may be resized in place
    last: Cell<Option<u32>>,
    table: RefCell<Vec<Rc<ModuleFn>>>,
    start: Option<Rc<ModuleFn>>,
    realloc: bool,
    stats: Cell<AllocStats>,
}

impl fmt::Debug for NativeModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeModule")
            .field("top", &self.top.get())
            .field("functions", &self.table.borrow().len())
            .field("stats", &self.stats.get())
            .finish()
    }
}

fn align_up(value: u32) -> Result<u32> {
    value
        .checked_add(ALIGN - 1)
        .map(|v| v & !(ALIGN - 1))
        .ok_or(Error::allocation_failed("Address space exhausted"))
}

impl NativeModule {
    /// Create a module over `memory`. Address 0 is never handed out.
    #[must_use]
    pub fn new(memory: Rc<VecMemory>) -> Self {
        Self {
            memory,
            top: Cell::new(ALIGN),
            last: Cell::new(None),
            table: RefCell::new(Vec::new()),
            start: None,
            realloc: true,
            stats: Cell::new(AllocStats::default()),
        }
    }

    /// Do not export `realloc`
    #[must_use]
    pub fn without_realloc(mut self) -> Self {
        self.realloc = false;
        self
    }

    /// Install the initializer run by `set_up`
    #[must_use]
    pub fn with_start<F>(mut self, start: F) -> Self
    where
        F: Fn(&Bridge, &[Val]) -> Result<Vec<Val>> + 'static,
    {
        self.start = Some(Rc::new(start));
        self
    }

    /// Append a function to the table, returning its index
    pub fn register<F>(&self, f: F) -> u32
    where
        F: Fn(&Bridge, &[Val]) -> Result<Vec<Val>> + 'static,
    {
        let mut table = self.table.borrow_mut();
        table.push(Rc::new(f));
        (table.len() - 1) as u32
    }

    /// The module's memory
    #[must_use]
    pub fn memory(&self) -> &Rc<VecMemory> {
        &self.memory
    }

    /// Allocation counters
    #[must_use]
    pub fn stats(&self) -> AllocStats {
        self.stats.get()
    }

    /// Allocate and fill a region without going through the bridge
    ///
    /// # Errors
    ///
    /// Fails when memory cannot be grown
    pub fn alloc_bytes(&self, data: &[u8]) -> Result<(u32, u32)> {
        let len = u32::try_from(data.len())
            .map_err(|_| Error::allocation_failed("Allocation too large"))?;
        let ptr = self.bump(len)?;
        self.memory.write(ptr, data)?;
        Ok((ptr, len))
    }

    fn bump(&self, size: u32) -> Result<u32> {
        let ptr = align_up(self.top.get())?;
        let end = ptr.checked_add(size).ok_or(Error::allocation_failed("Address space exhausted"))?;
        self.ensure(end)?;
        self.top.set(end);
        self.last.set(Some(ptr));
        Ok(ptr)
    }

    fn ensure(&self, end: u32) -> Result<()> {
        let size = self.memory.size_in_bytes();
        if end as usize > size {
            let missing = end as usize - size;
            let pages = missing.div_ceil(PAGE_SIZE) as u32;
            self.memory.grow(pages).map_err(|_| Error::allocation_failed("Out of memory"))?;
        }
        Ok(())
    }

    fn count(&self, f: impl FnOnce(&mut AllocStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}

impl ModuleExports for NativeModule {
    fn malloc(&self, _bridge: &Bridge, size: u32) -> Result<u32> {
        self.count(|s| s.mallocs += 1);
        let ptr = self.bump(size)?;
        trace!("native module: malloc({size}) = {ptr}");
        Ok(ptr)
    }

    fn realloc(&self, _bridge: &Bridge, ptr: u32, old_size: u32, new_size: u32) -> Result<u32> {
        if !self.realloc {
            return Err(Error::export_not_found("Module does not export realloc"));
        }
        self.count(|s| s.reallocs += 1);
        if self.last.get() == Some(ptr) {
            let end = ptr
                .checked_add(new_size)
                .ok_or(Error::allocation_failed("Address space exhausted"))?;
            self.ensure(end)?;
            self.top.set(end);
            return Ok(ptr);
        }
        let moved = self.bump(new_size)?;
        self.memory.buffer().copy_within(ptr, moved, old_size.min(new_size))?;
        trace!("native module: realloc moved {ptr} -> {moved}");
        Ok(moved)
    }

    fn has_realloc(&self) -> bool {
        self.realloc
    }

    fn free(&self, _bridge: &Bridge, ptr: u32, size: u32) -> Result<()> {
        self.count(|s| s.frees += 1);
        trace!("native module: free({ptr}, {size})");
        Ok(())
    }

    fn call(&self, bridge: &Bridge, index: u32, args: &[Val]) -> Result<Vec<Val>> {
        let f = self
            .table
            .borrow()
            .get(index as usize)
            .cloned()
            .ok_or(Error::export_not_found("No function at table index"))?;
        f(bridge, args)
    }

    fn set_up(&self, bridge: &Bridge) -> Result<()> {
        match &self.start {
            Some(start) => start(bridge, &[]).map(drop),
            None => Ok(()),
        }
    }
}
