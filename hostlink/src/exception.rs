// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Single-entry slot for the most recent host exception.

use std::cell::Cell;

use crate::heap::Handle;

/// Holds the handle of the last exception until the module takes it
#[derive(Debug, Default)]
pub struct ExceptionSlot {
    current: Cell<Option<Handle>>,
}

impl ExceptionSlot {
    /// Create an empty slot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `handle`, returning any exception that was never taken
    pub fn store(&self, handle: Handle) -> Option<Handle> {
        self.current.replace(Some(handle))
    }

    /// Take the stored exception, leaving the slot empty
    pub fn take(&self) -> Option<Handle> {
        self.current.take()
    }

    /// Look at the stored exception without taking it
    #[must_use]
    pub fn peek(&self) -> Option<Handle> {
        self.current.get()
    }

    /// Whether an exception is waiting
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.peek().is_some()
    }
}
