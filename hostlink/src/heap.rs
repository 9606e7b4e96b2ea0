// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Handle table for host values.
//!
//! Module code refers to host values through small integer handles. Slots are
//! either occupied or on an intrusive free list threaded through the vacant
//! slots, so allocation and release are O(1) and released indices are reused
//! most-recent-first.

use core::fmt;
use std::mem;

use hostlink_error::{Error, Result};
use log::trace;

use crate::value::HostValue;

/// Index into the handle table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u32);

impl Handle {
    /// `undefined`
    pub const UNDEFINED: Self = Self(0);
    /// `null`
    pub const NULL: Self = Self(1);
    /// `true`
    pub const TRUE: Self = Self(2);
    /// `false`
    pub const FALSE: Self = Self(3);
    /// Number of reserved sentinel slots at the bottom of the table
    pub const RESERVED: u32 = 4;

    /// Wrap a raw index
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw index as passed across the module boundary
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Whether this handle is one of the permanent sentinels
    #[must_use]
    pub const fn is_reserved(self) -> bool {
        self.0 < Self::RESERVED
    }

    /// Sentinel for a boolean
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::TRUE } else { Self::FALSE }
    }
}

impl From<Handle> for u32 {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

enum Slot {
    Occupied(HostValue),
    Free { next: u32 },
}

/// Table of host values addressed by [`Handle`]
pub struct HeapTable {
    slots: Vec<Slot>,
    /// Head of the free list; `slots.len()` when the list is empty
    next_free: u32,
    live: usize,
    max_handles: Option<u32>,
}

impl fmt::Debug for HeapTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapTable")
            .field("len", &self.slots.len())
            .field("live", &self.live)
            .field("next_free", &self.next_free)
            .finish()
    }
}

impl Default for HeapTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HeapTable {
    /// Create a table holding only the sentinels
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Self::sentinels(),
            next_free: Handle::RESERVED,
            live: 0,
            max_handles: None,
        }
    }

    /// Create a table that refuses to grow beyond `max_handles` slots,
    /// sentinels included
    #[must_use]
    pub fn with_max_handles(max_handles: Option<u32>) -> Self {
        Self { max_handles, ..Self::new() }
    }

    fn sentinels() -> Vec<Slot> {
        vec![
            Slot::Occupied(HostValue::Undefined),
            Slot::Occupied(HostValue::Null),
            Slot::Occupied(HostValue::Bool(true)),
            Slot::Occupied(HostValue::Bool(false)),
        ]
    }

    /// Store a value and return its handle
    ///
    /// # Errors
    ///
    /// Returns a resource error when the table is at its configured limit
    pub fn allocate(&mut self, value: HostValue) -> Result<Handle> {
        let index = self.next_free;
        if index as usize == self.slots.len() {
            if self.max_handles.is_some_and(|max| index >= max) {
                return Err(Error::handle_limit_exceeded("Handle table is full"));
            }
            self.slots.push(Slot::Occupied(value));
            self.next_free = index + 1;
        } else {
            let slot = &mut self.slots[index as usize];
            let Slot::Free { next } = *slot else {
                return Err(Error::invalid_handle("Free list points at an occupied slot"));
            };
            *slot = Slot::Occupied(value);
            self.next_free = next;
        }
        self.live += 1;
        trace!("heap: allocated {}", Handle(index));
        Ok(Handle(index))
    }

    /// Borrow the value behind a handle
    ///
    /// # Errors
    ///
    /// Returns a contract violation for out-of-range or released handles
    pub fn get(&self, handle: Handle) -> Result<&HostValue> {
        match self.slots.get(handle.0 as usize) {
            Some(Slot::Occupied(value)) => Ok(value),
            Some(Slot::Free { .. }) => Err(Error::invalid_handle("Handle has been released")),
            None => Err(Error::invalid_handle("Handle is out of range")),
        }
    }

    /// Whether the handle currently refers to a value
    #[must_use]
    pub fn is_live(&self, handle: Handle) -> bool {
        self.get(handle).is_ok()
    }

    /// Release a handle. Sentinels are never released.
    ///
    /// # Errors
    ///
    /// Returns a contract violation for out-of-range handles and for handles
    /// that are already free
    pub fn release(&mut self, handle: Handle) -> Result<()> {
        self.take(handle).map(drop)
    }

    /// Read and release a handle in one step
    ///
    /// # Errors
    ///
    /// Same conditions as [`HeapTable::release`]
    pub fn take(&mut self, handle: Handle) -> Result<HostValue> {
        if handle.is_reserved() {
            return self.get(handle).cloned();
        }
        let free = Slot::Free { next: self.next_free };
        let slot = match self.slots.get_mut(handle.0 as usize) {
            Some(slot) => slot,
            None => return Err(Error::invalid_handle("Handle is out of range")),
        };
        if matches!(slot, Slot::Free { .. }) {
            return Err(Error::double_release("Handle released twice"));
        }
        let Slot::Occupied(value) = mem::replace(slot, free) else {
            return Err(Error::double_release("Handle released twice"));
        };
        self.next_free = handle.0;
        self.live -= 1;
        trace!("heap: released {handle}");
        Ok(value)
    }

    /// Allocate a second handle aliasing the same value
    ///
    /// # Errors
    ///
    /// Fails if `handle` is not live or the table is full
    pub fn duplicate(&mut self, handle: Handle) -> Result<Handle> {
        let value = self.get(handle)?.clone();
        self.allocate(value)
    }

    /// Number of live handles, sentinels excluded
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Number of slots, sentinels included
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false; the sentinels are permanent
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Free handles in the order they will be handed out
    #[must_use]
    pub fn free_handles(&self) -> Vec<Handle> {
        let mut free = Vec::new();
        let mut next = self.next_free;
        while let Some(Slot::Free { next: after }) = self.slots.get(next as usize) {
            free.push(Handle(next));
            next = *after;
        }
        free
    }

    /// Drop every value and return to the initial state
    pub fn reset(&mut self) {
        self.slots = Self::sentinels();
        self.next_free = Handle::RESERVED;
        self.live = 0;
    }
}
